//! Playlist text to [`Timeline`] reconstruction.
//!
//! Lines are scanned in order. Timestamp and duration tags fill a small
//! [`Pending`] accumulator; the next segment reference consumes it. Only a
//! reference preceded by both a valid timestamp and a valid duration becomes
//! a [`Segment`]. Every anomaly is recovered locally and recorded as a
//! [`Notice`].

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use url::Url;

use hc_core::{Instant, Notice, Outcome, Segment, Timeline};

const TIMESTAMP_TAG: &str = "#EXT-X-PROGRAM-DATE-TIME:";
const DURATION_TAG: &str = "#EXTINF:";

/// Trailing `±HHMM` offset, as emitted by many packagers.
static COMPACT_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-])(\d{2})(\d{2})$").unwrap());

/// Leading decimal number of an `#EXTINF` value, followed by `,` or the end.
static DURATION_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)\s*(?:,|$)").unwrap());

/// Rewrite a trailing compact `±HHMM` offset as `±HH:MM`.
pub fn normalize_offset(value: &str) -> Cow<'_, str> {
    COMPACT_OFFSET.replace(value, "${1}${2}:${3}")
}

/// Parse a program-date-time value into an instant.
///
/// Accepts RFC 3339 (after offset normalization). A value without any offset
/// is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<Instant> {
    let normalized = normalize_offset(value.trim());
    DateTime::parse_from_rfc3339(&normalized).ok().or_else(|| {
        NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// Parse the value of an `#EXTINF` tag (`<seconds>[,<title>]`).
pub fn parse_duration(value: &str) -> Option<f64> {
    let caps = DURATION_VALUE.captures(value.trim())?;
    let secs: f64 = caps[1].parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}

enum Line<'a> {
    Timestamp(&'a str),
    Duration(&'a str),
    Reference(&'a str),
    Ignored,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(value) = line.strip_prefix(TIMESTAMP_TAG) {
        Line::Timestamp(value)
    } else if let Some(value) = line.strip_prefix(DURATION_TAG) {
        Line::Duration(value)
    } else if line.is_empty() || line.starts_with('#') {
        Line::Ignored
    } else {
        Line::Reference(line)
    }
}

/// Metadata seen since the last segment reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Pending {
    start: Option<Instant>,
    duration: Option<f64>,
}

impl Pending {
    fn with_start(self, line: usize, value: &str, notices: &mut Vec<Notice>) -> Self {
        if self.start.is_some() {
            Notice::OverwrittenTag {
                line,
                tag: TIMESTAMP_TAG.trim_end_matches(':').to_string(),
            }
            .raise(notices);
        }
        let start = parse_timestamp(value);
        if start.is_none() {
            Notice::MalformedTimestamp {
                line,
                value: value.trim().to_string(),
            }
            .raise(notices);
        }
        Self { start, ..self }
    }

    fn with_duration(self, line: usize, value: &str, notices: &mut Vec<Notice>) -> Self {
        if self.duration.is_some() {
            Notice::OverwrittenTag {
                line,
                tag: DURATION_TAG.trim_end_matches(':').to_string(),
            }
            .raise(notices);
        }
        let duration = parse_duration(value);
        if duration.is_none() {
            Notice::MalformedDuration {
                line,
                value: value.trim().to_string(),
            }
            .raise(notices);
        }
        Self { duration, ..self }
    }

    /// Consume the accumulator for a segment reference.
    ///
    /// Returns the segment, if one was built, and the state to carry on with.
    /// Emitting a segment or rejecting an unresolvable reference clears both
    /// fields. A reference dropped for missing metadata leaves them in place
    /// for the next reference.
    fn complete(
        self,
        line: usize,
        reference: &str,
        base: &Url,
        notices: &mut Vec<Notice>,
    ) -> (Option<Segment>, Self) {
        let locator = match base.join(reference) {
            Ok(url) => url,
            Err(e) => {
                Notice::UnresolvableReference {
                    line,
                    reference: reference.to_string(),
                    reason: e.to_string(),
                }
                .raise(notices);
                return (None, Self::default());
            }
        };

        match (self.start, self.duration) {
            (Some(start), Some(duration)) => {
                let segment = Segment::new(locator, start, duration);
                if segment.checked_end().is_none() {
                    Notice::MalformedDuration {
                        line,
                        value: duration.to_string(),
                    }
                    .raise(notices);
                    return (None, Self { duration: None, ..self });
                }
                (Some(segment), Self::default())
            }
            (start, duration) => {
                Notice::IncompleteSegment {
                    line,
                    reference: locator.to_string(),
                    has_start: start.is_some(),
                    has_duration: duration.is_some(),
                }
                .raise(notices);
                (None, self)
            }
        }
    }
}

/// Parse playlist text into a timeline, resolving references against `base`.
///
/// Never fails: malformed tags, incomplete segments, unresolvable references
/// and out-of-order segments are dropped and reported as notices. Tags seen
/// before a reference that lacks a timestamp or duration stay pending for the
/// next reference. A segment that starts before its predecessor is dropped
/// rather than kept in playlist order, so the timeline never goes backwards.
/// A duration whose end falls outside the representable date range counts as
/// malformed.
pub fn parse(text: &str, base: &Url) -> Outcome<Timeline> {
    let mut notices = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();
    let mut pending = Pending::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        pending = match classify(raw.trim()) {
            Line::Timestamp(value) => pending.with_start(line, value, &mut notices),
            Line::Duration(value) => pending.with_duration(line, value, &mut notices),
            Line::Reference(reference) => {
                let (segment, rest) = pending.complete(line, reference, base, &mut notices);
                if let Some(segment) = segment {
                    match segments.last() {
                        Some(prev) if segment.start < prev.start => {
                            Notice::OutOfOrderSegment {
                                line,
                                reference: segment.locator.to_string(),
                            }
                            .raise(&mut notices);
                        }
                        _ => {
                            tracing::debug!(
                                "added segment {} start={} duration={}",
                                segment.locator,
                                segment.start.to_rfc3339(),
                                segment.duration
                            );
                            segments.push(segment);
                        }
                    }
                }
                rest
            }
            Line::Ignored => pending,
        };
    }

    if pending != Pending::default() {
        tracing::debug!("playlist ended with unconsumed tags: {pending:?}");
    }

    tracing::info!(
        "parsed {} segments from playlist ({} notices)",
        segments.len(),
        notices.len()
    );

    Outcome::new(Timeline::new(segments), notices)
}
