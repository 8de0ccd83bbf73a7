//! Shared depwatch data models consumed by the core library and manifest crates.

pub mod analysis;
pub mod change;
pub mod event;
pub mod webhook;

pub use analysis::*;
pub use change::*;
pub use event::*;
pub use webhook::WebhookError;
