//! # hc-playlist
//!
//! Reconstructs the absolute timeline of a live HLS media playlist and maps
//! wall-clock windows onto the segments that cover them.
//!
//! - **[`parse`]** -- turn playlist text into a [`Timeline`](hc_core::Timeline)
//!   using `#EXT-X-PROGRAM-DATE-TIME` and `#EXTINF` tags, recovering from
//!   malformed input with [`Notice`](hc_core::Notice)s.
//! - **[`select_before`] / [`select_after`]** -- pick the few segments closest
//!   to a reference instant, falling back to the timeline edge when nothing
//!   overlaps.
//! - **[`resolve_locator`]** -- accept either a URL or a filesystem path as
//!   the playlist location.

pub mod locator;
pub mod parser;
pub mod select;

pub use locator::resolve_locator;
pub use parser::{normalize_offset, parse, parse_duration, parse_timestamp};
pub use select::{select, select_after, select_before, SelectionPolicy};
