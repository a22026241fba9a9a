//! hlsclip - cut clips around an instant from a live HLS playlist
//!
//! This library crate exposes the orchestration layer for integration testing.

pub mod clipper;
pub mod config;
