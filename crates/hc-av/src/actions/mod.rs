//! Media processing actions: trim-and-encode of concatenated segments.

mod trim;

pub use trim::{trim_concat, TrimRequest};
