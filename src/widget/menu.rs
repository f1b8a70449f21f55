use std::time::{Duration, Instant};

use super::selection::Position;
use crate::types::Operation;

pub const MENU_WIDTH: f64 = 500.0;
pub const MENU_HEIGHT: f64 = 50.0;
pub const EDGE_MARGIN: f64 = 10.0;
pub const DISMISS_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

/// Centers the menu under the selection, keeps it inside the viewport
/// horizontally, and flips it above when there is no room below.
pub fn place(pos: &Position, viewport: Viewport) -> Placement {
    let mut x = pos.x - MENU_WIDTH / 2.0;
    let mut y = pos.y + EDGE_MARGIN;

    if x < EDGE_MARGIN {
        x = EDGE_MARGIN;
    }
    if x + MENU_WIDTH > viewport.width - EDGE_MARGIN {
        x = viewport.width - MENU_WIDTH - EDGE_MARGIN;
    }
    if y + MENU_HEIGHT > viewport.height - EDGE_MARGIN {
        y = pos.top - MENU_HEIGHT - EDGE_MARGIN;
    }

    Placement { x, y }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Inside,
    Outside,
}

#[derive(Debug, Default)]
pub struct ContextMenu {
    placement: Option<Placement>,
    hide_at: Option<Instant>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &'static [Operation] {
        &Operation::ALL
    }

    pub fn show(&mut self, pos: &Position, viewport: Viewport) -> Placement {
        let placement = place(pos, viewport);
        self.placement = Some(placement);
        self.hide_at = None;
        placement
    }

    pub fn hide(&mut self) {
        self.placement = None;
        self.hide_at = None;
    }

    pub fn is_visible(&self) -> bool {
        self.placement.is_some()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Presses inside are ignored; a press outside hides after the grace delay.
    pub fn press(&mut self, press: Press, at: Instant) {
        if press == Press::Outside && self.is_visible() {
            self.hide_at = Some(at + DISMISS_GRACE);
        }
    }

    /// Applies a pending dismissal. Returns true if the menu was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    /// Hides immediately and yields the chosen action.
    pub fn choose(&mut self, operation: Operation) -> Option<Operation> {
        if !self.is_visible() {
            return None;
        }
        self.hide();
        Some(operation)
    }
}
