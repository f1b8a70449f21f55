use crate::html::escape;
use crate::types::{ContentData, DefinitionsData, ExamplesData, Operation, SummaryData};

pub const ERROR_HEADLINE: &str = "Oops!";
pub const LOADING_TEXT: &str = "Thinking...";

/// A successful action result, tagged by the action that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    Eli5(ContentData),
    Summary(SummaryData),
    Definitions(DefinitionsData),
    Examples(ExamplesData),
    Explanation(ContentData),
}

impl ActionResponse {
    pub fn operation(&self) -> Operation {
        match self {
            ActionResponse::Eli5(_) => Operation::Eli5,
            ActionResponse::Summary(_) => Operation::Summarize,
            ActionResponse::Definitions(_) => Operation::Define,
            ActionResponse::Examples(_) => Operation::Example,
            ActionResponse::Explanation(_) => Operation::Explain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Prose(String),
    Bullets(Vec<String>),
    Pairs(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub headline: String,
    pub body: Body,
}

pub fn headline(operation: Operation) -> &'static str {
    match operation {
        Operation::Eli5 => "📚 Simple Explanation",
        Operation::Summarize => "📝 Summary",
        Operation::Define => "📖 Definitions",
        Operation::Example => "🌟 Examples",
        Operation::Explain => "💡 Explanation",
    }
}

pub fn render_response(response: &ActionResponse) -> Rendered {
    let body = match response {
        ActionResponse::Eli5(data) | ActionResponse::Explanation(data) => Body::Prose(data.content.clone()),
        ActionResponse::Summary(data) if data.key_points.is_empty() => Body::Prose(data.content.clone()),
        ActionResponse::Summary(data) => Body::Bullets(data.key_points.clone()),
        ActionResponse::Definitions(data) => Body::Pairs(
            data.definitions
                .iter()
                .map(|d| (d.term.clone(), d.definition.clone()))
                .collect(),
        ),
        ActionResponse::Examples(data) => Body::Bullets(data.examples.clone()),
    };
    Rendered {
        headline: headline(response.operation()).to_string(),
        body,
    }
}

pub fn render_error(message: &str) -> Rendered {
    Rendered {
        headline: ERROR_HEADLINE.to_string(),
        body: Body::Prose(message.to_string()),
    }
}

pub fn render_loading(operation: Operation) -> Rendered {
    Rendered {
        headline: headline(operation).to_string(),
        body: Body::Prose(LOADING_TEXT.to_string()),
    }
}

impl Rendered {
    /// Markup for the widget panel. Every piece of dynamic text is escaped.
    pub fn to_html(&self) -> String {
        let mut out = format!("<h3>{}</h3>", escape(&self.headline));
        match &self.body {
            Body::Prose(text) => out.push_str(&format!("<p>{}</p>", escape(text))),
            Body::Bullets(items) => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str(&format!("<li>{}</li>", escape(item)));
                }
                out.push_str("</ul>");
            }
            Body::Pairs(pairs) => {
                for (term, definition) in pairs {
                    out.push_str(&format!(
                        "<p><strong>{}:</strong> {}</p>",
                        escape(term),
                        escape(definition)
                    ));
                }
            }
        }
        out
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.headline);
        match &self.body {
            Body::Prose(text) => out.push_str(text),
            Body::Bullets(items) => {
                let lines: Vec<String> = items.iter().map(|item| format!("  • {item}")).collect();
                out.push_str(&lines.join("\n"));
            }
            Body::Pairs(pairs) => {
                let lines: Vec<String> = pairs.iter().map(|(t, d)| format!("  {t}: {d}")).collect();
                out.push_str(&lines.join("\n"));
            }
        }
        out
    }
}
