//! Dynamic capability registries (C7-C10).
//!
//! Each registry is a concurrent, name- or URI-keyed map the server core
//! consults when dispatching `tools/*`, `prompts/*`, `resources/*`, and
//! `logging/*` requests. They hold no notion of sessions or transport —
//! `integration::server` is responsible for turning registry mutations into
//! `notifications/*_changed` fan-out and for filtering subscriber lists
//! against live sessions.

pub mod logging;
pub mod prompt;
pub mod resource;
pub mod tool;

pub use logging::LoggingRegistry;
pub use prompt::{PromptContext, PromptRegistry};
pub use resource::{ResourceContext, ResourceHandler, ResourceRegistry};
pub use tool::{ToolContext, ToolHandler, ToolRegistry};
