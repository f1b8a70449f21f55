//! Clippy Reader: a reading assistant backend and its front-end state machines.
//!
//! The backend side (`face`, `services`, `completion`, `feed`) turns selected
//! text into simplified explanations, summaries, definitions and examples via
//! an OpenAI-compatible completion API. The front-end side (`widget`, `client`,
//! `tips`) models the selection detector, contextual menu and floating widget
//! without any DOM, so adapters (the injectable script, the `clippy` CLI) stay thin.

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod face;
pub mod feed;
pub mod html;
pub mod prompts;
pub mod services;
pub mod tips;
pub mod types;
pub mod validation;
pub mod widget;

pub use error::{AppError, ErrorCode};
pub use types::{ApiResponse, CompletionMetadata, Operation};
