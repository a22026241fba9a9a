//! Segment timeline domain types.
//!
//! A [`Timeline`] is the ordered list of [`Segment`]s reconstructed from one
//! playlist parse. A [`Window`] is the wall-clock interval a clip should
//! cover, and a [`Selection`] is the subset of the timeline chosen for it.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A timezone-aware instant as found in playlist timestamp tags.
pub type Instant = DateTime<FixedOffset>;

/// Convert fractional seconds into a [`TimeDelta`] with microsecond precision.
pub fn seconds(secs: f64) -> TimeDelta {
    TimeDelta::microseconds((secs * 1_000_000.0).round() as i64)
}

/// Signed number of seconds from `from` to `to`.
pub fn seconds_between(from: Instant, to: Instant) -> f64 {
    let delta = to - from;
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| delta.num_seconds() as f64)
}

// ---------------------------------------------------------------------------
// Segment / Timeline
// ---------------------------------------------------------------------------

/// One addressable media chunk with its absolute time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Absolute reference to the segment bytes.
    pub locator: Url,
    /// Instant of the first sample.
    pub start: Instant,
    /// Length in seconds; always finite and non-negative.
    pub duration: f64,
}

impl Segment {
    pub fn new(locator: Url, start: Instant, duration: f64) -> Self {
        Self {
            locator,
            start,
            duration,
        }
    }

    /// Instant just after the last sample.
    ///
    /// # Panics
    ///
    /// Panics if the end lies outside the representable date range. Segments
    /// produced by the playlist parser always have a representable end.
    pub fn end(&self) -> Instant {
        self.start + seconds(self.duration)
    }

    /// Like [`Segment::end`], but `None` when the end is out of range.
    pub fn checked_end(&self) -> Option<Instant> {
        self.start.checked_add_signed(seconds(self.duration))
    }

    /// Last path component of the locator, used for local file names.
    pub fn file_name(&self) -> &str {
        self.locator
            .path_segments()
            .and_then(|mut parts| parts.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("segment")
    }
}

/// Ordered segments from one playlist parse. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Sum of all segment durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Start of the first segment and end of the last one.
    pub fn span(&self) -> Option<(Instant, Instant)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.start, last.end()))
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ---------------------------------------------------------------------------
// ClipKind / Window
// ---------------------------------------------------------------------------

/// Which side of the reference instant a clip covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// The clip ends at the reference instant.
    Before,
    /// The clip starts at the reference instant.
    After,
}

impl ClipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipKind::Before => "before",
            ClipKind::After => "after",
        }
    }
}

impl fmt::Display for ClipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target interval for a clip.
///
/// A before-window is closed, `[reference - look_back, reference]`; an
/// after-window is half-open, `[reference, reference + look_ahead)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub kind: ClipKind,
    pub reference: Instant,
    pub start: Instant,
    pub end: Instant,
}

fn window_span(kind: ClipKind, secs: f64) -> Result<TimeDelta> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Validation(format!(
            "{kind} window length must be a non-negative number, got {secs}"
        )));
    }
    Ok(seconds(secs))
}

fn out_of_range(kind: ClipKind, reference: Instant, secs: f64) -> Error {
    Error::Validation(format!(
        "{kind} window of {secs}s around {} is outside the representable date range",
        reference.to_rfc3339()
    ))
}

impl Window {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `look_back` is negative or not
    /// finite, or when the window start cannot be represented.
    pub fn before(reference: Instant, look_back: f64) -> Result<Self> {
        let kind = ClipKind::Before;
        let start = reference
            .checked_sub_signed(window_span(kind, look_back)?)
            .ok_or_else(|| out_of_range(kind, reference, look_back))?;
        Ok(Self {
            kind,
            reference,
            start,
            end: reference,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `look_ahead` is negative or not
    /// finite, or when the window end cannot be represented.
    pub fn after(reference: Instant, look_ahead: f64) -> Result<Self> {
        let kind = ClipKind::After;
        let end = reference
            .checked_add_signed(window_span(kind, look_ahead)?)
            .ok_or_else(|| out_of_range(kind, reference, look_ahead))?;
        Ok(Self {
            kind,
            reference,
            start: reference,
            end,
        })
    }

    /// Window length in seconds.
    pub fn length(&self) -> f64 {
        seconds_between(self.start, self.end)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = match self.kind {
            ClipKind::Before => ']',
            ClipKind::After => ')',
        };
        write!(
            f,
            "[{}, {}{close}",
            self.start.to_rfc3339(),
            self.end.to_rfc3339()
        )
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Segments chosen to cover a [`Window`], in ascending start order.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub window: Window,
    pub segments: Vec<Segment>,
    /// `true` when no segment overlapped the window and the edge of the
    /// timeline was used instead.
    pub fallback: bool,
}

impl Selection {
    pub fn kind(&self) -> ClipKind {
        self.window.kind
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Aggregate duration of the selected segments in seconds.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// The segment the concatenated clip starts with.
    pub fn earliest(&self) -> Option<&Segment> {
        self.segments.first()
    }
}
