use super::render::{self, ActionResponse, Rendered};
use crate::types::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// Only the bubble is showing.
    Minimized,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Empty,
    Loading(Operation),
    Response(ActionResponse),
    Error(String),
}

/// The floating assistant: a bubble that expands into a response panel.
#[derive(Debug, Clone)]
pub struct Widget {
    visibility: Visibility,
    panel: Panel,
}

impl Default for Widget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget {
    /// Starts minimized with an empty panel.
    pub fn new() -> Self {
        Self {
            visibility: Visibility::Minimized,
            panel: Panel::Empty,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.panel, Panel::Loading(_))
    }

    pub fn request(&mut self, operation: Operation) {
        self.panel = Panel::Loading(operation);
        self.expand();
    }

    pub fn respond(&mut self, response: ActionResponse) {
        self.panel = Panel::Response(response);
        self.expand();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.panel = Panel::Error(message.into());
        self.expand();
    }

    /// Bubble click or close button.
    pub fn toggle(&mut self) {
        self.visibility = match self.visibility {
            Visibility::Minimized => Visibility::Expanded,
            Visibility::Expanded => Visibility::Minimized,
            Visibility::Hidden => Visibility::Hidden,
        };
    }

    fn expand(&mut self) {
        if self.visibility == Visibility::Minimized {
            self.visibility = Visibility::Expanded;
        }
    }

    pub fn destroy(&mut self) {
        self.visibility = Visibility::Hidden;
        self.panel = Panel::Empty;
    }

    /// What the panel shows, if anything.
    pub fn render(&self) -> Option<Rendered> {
        match &self.panel {
            Panel::Empty => None,
            Panel::Loading(operation) => Some(render::render_loading(*operation)),
            Panel::Response(response) => Some(render::render_response(response)),
            Panel::Error(message) => Some(render::render_error(message)),
        }
    }
}
