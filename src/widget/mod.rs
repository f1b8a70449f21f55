//! Front-end state machines: selection detection, the contextual menu, the
//! floating widget and its rendering. Nothing here touches a DOM; adapters
//! translate host events in and draw the results.

mod app;
mod menu;
mod render;
mod selection;
mod state;

pub use app::ClippyApp;
pub use menu::{ContextMenu, DISMISS_GRACE, MENU_HEIGHT, MENU_WIDTH, Placement, Press, Viewport, place};
pub use render::{ActionResponse, Body, Rendered, headline, render_error, render_loading, render_response};
pub use selection::{
    InputEvent, MIN_SELECTION_CHARS, ObserverId, Position, RawSelection, Rect, SELECTION_DEBOUNCE, Scroll, Selection,
    SelectionDetector,
};
pub use state::{Panel, Visibility, Widget};
