use std::time::Instant;

use tracing::{debug, warn};

use super::menu::{ContextMenu, Placement, Press, Viewport};
use super::render::{ActionResponse, Rendered};
use super::selection::{InputEvent, RawSelection, Selection, SelectionDetector};
use super::state::Widget;
use crate::client::{ApiClient, ClientError};
use crate::types::Operation;

/// Wires the detector, menu and widget to the API client. Adapters feed it
/// host events and draw whatever it reports.
pub struct ClippyApp {
    client: ApiClient,
    detector: SelectionDetector,
    menu: ContextMenu,
    widget: Widget,
    viewport: Viewport,
    current: Option<Selection>,
}

impl ClippyApp {
    pub fn new(client: ApiClient, viewport: Viewport) -> Self {
        Self {
            client,
            detector: SelectionDetector::new(),
            menu: ContextMenu::new(),
            widget: Widget::new(),
            viewport,
            current: None,
        }
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn current_selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn input(&mut self, event: &InputEvent, at: Instant) {
        self.detector.input(event, at);
    }

    /// Runs a due selection check and the menu's pending dismissal.
    pub fn tick(&mut self, now: Instant, snapshot: &RawSelection) -> Option<Placement> {
        self.menu.tick(now);
        let found = self.detector.settle(now, snapshot);
        self.show_menu(found)
    }

    /// Handles a selection immediately, bypassing the debounce.
    pub fn select(&mut self, raw: &RawSelection) -> Option<Placement> {
        let found = self.detector.handle(raw);
        self.show_menu(found)
    }

    /// Shows the menu for an accepted selection. Without one, forgets the
    /// current selection once the detector has dropped it.
    fn show_menu(&mut self, found: Option<Selection>) -> Option<Placement> {
        let Some(selection) = found else {
            if !self.detector.has_selection() {
                self.current = None;
            }
            return None;
        };
        let placement = self.menu.show(&selection.position, self.viewport);
        self.current = Some(selection);
        Some(placement)
    }

    pub fn press(&mut self, press: Press, at: Instant) {
        self.menu.press(press, at);
    }

    /// Menu click: hides the menu and runs the action on the current selection.
    pub async fn choose(&mut self, operation: Operation) -> Option<Rendered> {
        let operation = self.menu.choose(operation)?;
        self.perform(operation).await
    }

    /// Runs `operation` on the current selection and returns what the widget
    /// now shows. Does nothing without a selection.
    pub async fn perform(&mut self, operation: Operation) -> Option<Rendered> {
        let Some(text) = self.current.as_ref().map(|s| s.text.clone()) else {
            warn!(%operation, "no selection available");
            return None;
        };
        debug!(%operation, chars = text.chars().count(), "processing selection");

        self.widget.request(operation);
        match self.dispatch(operation, &text).await {
            Ok(response) => self.widget.respond(response),
            Err(err) => {
                warn!(%operation, error = %err, "action failed");
                self.widget.fail(err.to_string());
            }
        }
        self.widget.render()
    }

    async fn dispatch(&self, operation: Operation, text: &str) -> Result<ActionResponse, ClientError> {
        let client = &self.client;
        Ok(match operation {
            Operation::Eli5 => ActionResponse::Eli5(client.eli5(text, None).await?),
            Operation::Summarize => ActionResponse::Summary(client.summarize(text, None).await?),
            Operation::Define => ActionResponse::Definitions(client.define(text, &[]).await?),
            Operation::Example => ActionResponse::Examples(client.give_example(text, None).await?),
            Operation::Explain => ActionResponse::Explanation(client.explain(text, None).await?),
        })
    }

    /// Hides the menu and widget and drops every observer.
    pub fn destroy(&mut self) {
        self.detector.remove_all();
        self.detector.clear();
        self.menu.hide();
        self.widget.destroy();
        self.current = None;
    }
}
