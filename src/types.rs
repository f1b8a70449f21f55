use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// The five text actions offered on a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Eli5,
    Summarize,
    Define,
    Example,
    Explain,
}

impl Operation {
    /// Menu order.
    pub const ALL: [Operation; 5] = [
        Operation::Eli5,
        Operation::Summarize,
        Operation::Define,
        Operation::Example,
        Operation::Explain,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Operation::Eli5 => "eli5",
            Operation::Summarize => "summarize",
            Operation::Define => "define",
            Operation::Example => "example",
            Operation::Explain => "explain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Eli5 => "📚 ELI5",
            Operation::Summarize => "📝 Summarize",
            Operation::Define => "📖 Define",
            Operation::Example => "🌟 Example",
            Operation::Explain => "💡 Explain",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Operation::Eli5 => "Explain like I'm 5",
            Operation::Summarize => "Get key points",
            Operation::Define => "Define terms",
            Operation::Example => "Give examples",
            Operation::Explain => "Plain explanation",
        }
    }

    /// API path relative to `/api`.
    pub fn endpoint(self) -> &'static str {
        match self {
            Operation::Eli5 => "/eli5",
            Operation::Summarize => "/summarize",
            Operation::Define => "/define",
            Operation::Example => "/example",
            Operation::Explain => "/explain",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown action '{s}' (expected one of eli5, summarize, define, example, explain)"))
    }
}

/// Uniform `{success, data | error}` wrapper used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
                details: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Attached to every completion-backed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionMetadata {
    /// Wall-clock milliseconds spent in the completion call, retries included.
    pub processing_time: u64,
    pub tokens_used: u64,
    pub model: String,
}

// Request bodies. `text` has already been checked by the validation extractors
// by the time these are deserialized.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eli5Request {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefineRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// Response payloads (the `data` part of the envelope).

/// ELI5 and explain results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentData {
    pub content: String,
    pub metadata: CompletionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub content: String,
    pub key_points: Vec<String>,
    pub metadata: CompletionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsData {
    pub definitions: Vec<Definition>,
    pub metadata: CompletionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamplesData {
    pub examples: Vec<String>,
    pub metadata: CompletionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub tldr: String,
    pub topics: Vec<String>,
    pub importance: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisData {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub metadata: CompletionMetadata,
}
