//! Prompt construction for every operation the assistant supports.

use crate::types::Operation;

/// Persona used when a caller does not supply its own system prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Clippy, a friendly AI reading assistant. Your job is to help users understand articles quickly and simply.

Your responses should be:
- Friendly, helpful, and concise
- Explained in the simplest, most approachable way possible
- Free of jargon unless specifically requested
- Focused on making reading easier, faster, and more fun

Always maintain a warm, supportive tone that makes learning enjoyable.";

const BASE_SYSTEM_PROMPT: &str = "You are Clippy, a friendly AI reading assistant. Your job is to help users understand articles quickly and simply.";

/// Article content beyond this many characters is cut before prompting.
pub const ARTICLE_PROMPT_CHARS: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Bullets,
    Paragraph,
}

impl SummaryFormat {
    /// `None` means bullets; any other value than `bullets` is a paragraph.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("bullets") => Self::Bullets,
            Some(_) => Self::Paragraph,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplanationLevel {
    #[default]
    Simple,
    Normal,
    Detailed,
}

impl ExplanationLevel {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("normal") => Self::Normal,
            Some("detailed") => Self::Detailed,
            _ => Self::Simple,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::Simple => "Use plain, everyday language that anyone can understand. Avoid technical terms.",
            Self::Normal => "Provide a clear explanation with moderate detail. Use accessible language.",
            Self::Detailed => "Provide a comprehensive explanation with full context and relevant details.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExampleKind {
    #[default]
    RealWorld,
    Analogy,
}

impl ExampleKind {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("analogy") => Self::Analogy,
            _ => Self::RealWorld,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::RealWorld => "Provide 2-3 concrete, real-world examples that illustrate this concept. Use everyday situations people can relate to.",
            Self::Analogy => "Provide 2-3 helpful analogies or metaphors that make this concept easier to understand. Compare it to familiar things.",
        }
    }
}

pub fn eli5_prompt(text: &str, context: Option<&str>) -> String {
    let context_section = match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("\n\nArticle context: {context}"),
        None => String::new(),
    };

    format!(
        "Please explain the following text in a way that a 5-year-old child could understand. Use very simple words, short sentences, and friendly language. Avoid all technical terms and jargon.{context_section}

Text to explain:
{text}

Provide a clear, simple explanation that a young child would understand:"
    )
}

pub fn summary_prompt(text: &str, format: SummaryFormat) -> String {
    let format_instruction = match format {
        SummaryFormat::Bullets => "Present the summary as bullet points (use • or - for bullets).",
        SummaryFormat::Paragraph => "Present the summary as a concise paragraph.",
    };

    format!(
        "Please summarize the following text. Extract the 3-5 most important key points. {format_instruction} Keep it brief and scannable.

Text to summarize:
{text}

Summary:"
    )
}

pub fn definition_prompt(text: &str, terms: &[String]) -> String {
    if !terms.is_empty() {
        return format!(
            "Please provide clear, concise definitions for the following terms from the text:

Terms: {}

Context:
{text}

Provide a definition for each term in simple language:",
            terms.join(", ")
        );
    }

    format!(
        "Please identify and define all important or technical terms in the following text. Provide clear, concise definitions in simple language.

Text:
{text}

Definitions:"
    )
}

pub fn explanation_prompt(text: &str, level: ExplanationLevel) -> String {
    format!(
        "Please explain what the following text means. {}

Text to explain:
{text}

Explanation:",
        level.instruction()
    )
}

pub fn example_prompt(text: &str, kind: ExampleKind) -> String {
    format!(
        "{}

Concept to illustrate:
{text}

Examples:",
        kind.instruction()
    )
}

pub fn article_analysis_prompt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(ARTICLE_PROMPT_CHARS).collect();
    if content.chars().count() > ARTICLE_PROMPT_CHARS {
        excerpt.push_str("...");
    }

    format!(
        "Please analyze the following article and provide:

1. A TL;DR (Too Long; Didn't Read) summary in 1-2 sentences
2. 3-5 main topic categories that describe this article
3. An importance score from 0-100 (how significant/impactful is this content?)

Article content:
{excerpt}

Provide your analysis in this format:
TL;DR: [summary]
Topics: [topic1, topic2, topic3]
Importance: [score]"
    )
}

/// Clippy persona plus operation-specific guidance.
pub fn system_prompt(operation: Operation) -> String {
    let guidance = match operation {
        Operation::Eli5 => {
            "When providing ELI5 explanations:
- Use vocabulary a 5-year-old would know
- Keep sentences very short and simple
- Use friendly, encouraging language
- Avoid all technical terms and jargon
- Make it fun and easy to understand"
        }
        Operation::Summarize => {
            "When providing summaries:
- Extract only the most important points
- Be concise and scannable
- Use clear, direct language
- Focus on key takeaways"
        }
        Operation::Define => {
            "When providing definitions:
- Explain terms clearly and simply
- Avoid circular definitions
- Use examples when helpful
- Keep definitions concise"
        }
        Operation::Explain => {
            "When providing explanations:
- Break down complex ideas into simple parts
- Use plain language
- Be clear and direct
- Help the reader truly understand"
        }
        Operation::Example => {
            "When providing examples:
- Use relatable, everyday situations
- Make connections to familiar concepts
- Be concrete and specific
- Help make abstract ideas tangible"
        }
    };

    format!("{BASE_SYSTEM_PROMPT}\n\n{guidance}")
}
