//! # hc-pipeline
//!
//! Turns a segment [`Selection`](hc_core::Selection) into a finished clip.
//!
//! This crate provides:
//!
//! - **[`Fetcher`]** trait -- retrieval seam for playlists and segments, with
//!   [`HttpFetcher`] handling `http(s)://` and `file://` locators.
//! - **[`plan_trim`]** -- compute where in the concatenated selection the
//!   clip starts and how long it runs.
//! - **[`ClipAssembler`]** -- download the selection concurrently into a
//!   request-scoped workspace, restore playback order, and delegate trimming
//!   to ffmpeg.

pub mod assemble;
pub mod fetch;
pub mod plan;

pub use assemble::{ClipAssembler, ClipOutput, ClipRequest};
pub use fetch::{Fetcher, HttpFetcher};
pub use plan::{plan_trim, TrimPlan};
