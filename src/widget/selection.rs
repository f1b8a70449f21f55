use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MIN_SELECTION_CHARS: usize = 3;
pub const SELECTION_DEBOUNCE: Duration = Duration::from_millis(50);

/// Bounding box of a selection in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scroll {
    pub x: f64,
    pub y: f64,
}

/// Where a selection sits. `x` is the viewport-relative horizontal center;
/// the vertical edges are document-relative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    pub fn from_rect(rect: Rect, scroll: Scroll) -> Self {
        let bottom = rect.top + rect.height;
        Self {
            x: rect.left + rect.width / 2.0,
            y: bottom + scroll.y,
            top: rect.top + scroll.y,
            left: rect.left + scroll.x,
            right: rect.left + rect.width + scroll.x,
            bottom: bottom + scroll.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// What the host environment reports when asked for the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSelection {
    pub text: String,
    pub rect: Rect,
    pub scroll: Scroll,
}

impl RawSelection {
    pub fn new(text: impl Into<String>, rect: Rect, scroll: Scroll) -> Self {
        Self {
            text: text.into(),
            rect,
            scroll,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PointerUp,
    /// Key name as reported by the host (`"ArrowLeft"`, `"Shift"`, ...).
    KeyUp(String),
}

impl InputEvent {
    fn schedules_check(&self) -> bool {
        match self {
            InputEvent::PointerUp => true,
            InputEvent::KeyUp(key) => key.contains("Arrow") || key == "Shift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Selection) -> anyhow::Result<()> + Send>;

/// Turns pointer and key events into debounced selection notifications.
pub struct SelectionDetector {
    observers: Vec<(ObserverId, Observer)>,
    next_id: u64,
    last: Option<Selection>,
    check_due: Option<Instant>,
}

impl Default for SelectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionDetector {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
            last: None,
            check_due: None,
        }
    }

    /// Schedules a check `SELECTION_DEBOUNCE` after `at` for pointer-up and
    /// selection keys. Returns whether a check is now pending.
    pub fn input(&mut self, event: &InputEvent, at: Instant) -> bool {
        if event.schedules_check() {
            self.check_due = Some(at + SELECTION_DEBOUNCE);
        }
        self.check_due.is_some()
    }

    pub fn check_due(&self) -> Option<Instant> {
        self.check_due
    }

    /// Runs the pending check once its debounce has elapsed.
    pub fn settle(&mut self, now: Instant, snapshot: &RawSelection) -> Option<Selection> {
        match self.check_due {
            Some(due) if now >= due => {
                self.check_due = None;
                self.handle(snapshot)
            }
            _ => None,
        }
    }

    /// Accepts selections of at least three trimmed characters and notifies
    /// observers. An empty selection forgets the last one.
    pub fn handle(&mut self, raw: &RawSelection) -> Option<Selection> {
        let text = raw.text.trim();
        if text.chars().count() >= MIN_SELECTION_CHARS {
            let selection = Selection {
                text: text.to_string(),
                position: Position::from_rect(raw.rect, raw.scroll),
            };
            self.last = Some(selection.clone());
            self.notify(&selection);
            Some(selection)
        } else {
            if text.is_empty() {
                self.last = None;
            }
            None
        }
    }

    fn notify(&mut self, selection: &Selection) {
        for (id, observer) in &mut self.observers {
            if let Err(err) = observer(selection) {
                warn!(observer = id.0, error = %err, "selection observer failed");
            }
        }
    }

    pub fn on_selected<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Selection) -> anyhow::Result<()> + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn remove_all(&mut self) {
        self.observers.clear();
    }

    pub fn last(&self) -> Option<&Selection> {
        self.last.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.last.is_some()
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.check_due = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn raw(text: &str) -> RawSelection {
        RawSelection::new(
            text,
            Rect {
                left: 100.0,
                top: 200.0,
                width: 80.0,
                height: 20.0,
            },
            Scroll { x: 5.0, y: 300.0 },
        )
    }

    #[test]
    fn position_mixes_viewport_and_document_coordinates() {
        let pos = Position::from_rect(raw("x").rect, raw("x").scroll);
        assert_eq!(pos.x, 140.0);
        assert_eq!(pos.y, 520.0);
        assert_eq!(pos.top, 500.0);
        assert_eq!(pos.bottom, 520.0);
        assert_eq!(pos.left, 105.0);
        assert_eq!(pos.right, 185.0);
    }

    #[test]
    fn only_selection_keys_schedule_a_check() {
        let mut detector = SelectionDetector::new();
        let now = Instant::now();
        assert!(!detector.input(&InputEvent::KeyUp("a".into()), now));
        assert!(detector.input(&InputEvent::KeyUp("ArrowRight".into()), now));
        assert_eq!(detector.check_due(), Some(now + SELECTION_DEBOUNCE));
    }

    #[test]
    fn check_waits_for_debounce() {
        let mut detector = SelectionDetector::new();
        let start = Instant::now();
        detector.input(&InputEvent::PointerUp, start);

        assert!(detector.settle(start + Duration::from_millis(10), &raw("hello")).is_none());
        // A second event restarts the window.
        detector.input(&InputEvent::KeyUp("Shift".into()), start + Duration::from_millis(40));
        assert!(detector.settle(start + Duration::from_millis(60), &raw("hello")).is_none());

        let selection = detector.settle(start + Duration::from_millis(90), &raw("hello")).unwrap();
        assert_eq!(selection.text, "hello");
        assert!(detector.check_due().is_none());
    }

    #[test]
    fn short_selection_is_ignored_and_empty_clears() {
        let mut detector = SelectionDetector::new();
        detector.handle(&raw("  quantum  "));
        assert_eq!(detector.last().unwrap().text, "quantum");

        assert!(detector.handle(&raw("ab")).is_none());
        assert!(detector.has_selection());

        assert!(detector.handle(&RawSelection::empty()).is_none());
        assert!(!detector.has_selection());
    }

    #[test]
    fn failing_observer_does_not_stop_the_rest() {
        let mut detector = SelectionDetector::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        detector.on_selected(|_| anyhow::bail!("boom"));
        let sink = seen.clone();
        let second = detector.on_selected(move |s| {
            sink.lock().unwrap().push(s.text.clone());
            Ok(())
        });

        detector.handle(&raw("first"));
        assert!(detector.remove(second));
        detector.handle(&raw("second"));

        assert_eq!(*seen.lock().unwrap(), vec!["first"]);
    }
}
