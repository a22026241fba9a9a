//! # hc-av
//!
//! External tool management and clip encoding for the hlsclip pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honoring a configured override.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Workspace management** ([`Workspace`]) -- request-scoped temporary
//!   directory that is removed on every exit path.
//! - **Concat descriptors** ([`ConcatList`]) -- ffmpeg concat demuxer input
//!   listing segment files in playback order.
//! - **Actions** ([`actions`]) -- trim and re-encode a concatenated segment
//!   sequence.

pub mod actions;
pub mod command;
pub mod concat;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use actions::{trim_concat, TrimRequest};
pub use command::{ToolCommand, ToolOutput};
pub use concat::ConcatList;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workspace::Workspace;
