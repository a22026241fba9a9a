//! hc-core: shared types, IDs, errors, notices, and configuration.
//!
//! This crate is the foundational dependency for all other hc-* crates,
//! providing the segment/timeline domain model, a unified error type, the
//! non-fatal [`Notice`] channel, request identifiers, and the configuration
//! sections consumed by the pipeline.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;
pub mod notice;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::RequestId;
pub use media::*;
pub use notice::{Notice, Outcome};
