//! Non-fatal anomalies reported alongside successful results.
//!
//! Parsing and selection recover locally from malformed input. Each recovery
//! is recorded as a [`Notice`] (and logged at the point it is raised) so that
//! callers and tests can inspect what happened without scraping log output.

use std::fmt;

use serde::Serialize;

use crate::media::ClipKind;

/// A recovered anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// A timestamp tag could not be parsed; the pending start time was
    /// cleared.
    MalformedTimestamp { line: usize, value: String },
    /// A duration tag could not be parsed; the pending duration was cleared.
    MalformedDuration { line: usize, value: String },
    /// A tag arrived while a previous value of the same tag was still
    /// pending; the newer value replaced it.
    OverwrittenTag { line: usize, tag: String },
    /// A segment reference appeared without a valid timestamp and duration
    /// and was dropped.
    IncompleteSegment {
        line: usize,
        reference: String,
        has_start: bool,
        has_duration: bool,
    },
    /// A segment reference could not be resolved against the base locator.
    UnresolvableReference {
        line: usize,
        reference: String,
        reason: String,
    },
    /// A segment started before its predecessor and was dropped to keep the
    /// timeline ordered. It is neither reinserted nor kept in playlist order.
    OutOfOrderSegment { line: usize, reference: String },
    /// No segment overlapped the window; the edge of the timeline was used.
    NoCoverage { kind: ClipKind, window: String },
    /// The selected segments are shorter than the requested clip.
    ShortSource {
        kind: ClipKind,
        available: f64,
        requested: f64,
    },
}

impl Notice {
    /// Log this notice and append it to `sink`.
    pub fn raise(self, sink: &mut Vec<Notice>) {
        tracing::warn!("{self}");
        sink.push(self);
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MalformedTimestamp { line, value } => {
                write!(f, "line {line}: invalid timestamp '{value}'")
            }
            Notice::MalformedDuration { line, value } => {
                write!(f, "line {line}: invalid duration '{value}'")
            }
            Notice::OverwrittenTag { line, tag } => {
                write!(f, "line {line}: {tag} replaces a pending value that no segment consumed")
            }
            Notice::IncompleteSegment {
                line,
                reference,
                has_start,
                has_duration,
            } => write!(
                f,
                "line {line}: skipped segment {reference} (timestamp: {}, duration: {})",
                if *has_start { "ok" } else { "missing" },
                if *has_duration { "ok" } else { "missing" },
            ),
            Notice::UnresolvableReference {
                line,
                reference,
                reason,
            } => write!(f, "line {line}: cannot resolve '{reference}': {reason}"),
            Notice::OutOfOrderSegment { line, reference } => {
                write!(f, "line {line}: segment {reference} starts before its predecessor")
            }
            Notice::NoCoverage { kind, window } => write!(
                f,
                "no segments cover the {kind} window {window}; using timeline edge"
            ),
            Notice::ShortSource {
                kind,
                available,
                requested,
            } => write!(
                f,
                "{kind} clip: total duration ({available}s) is too short for {requested}s trim"
            ),
        }
    }
}

/// A successful value together with the notices raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, notices: Vec<Notice>) -> Self {
        Self { value, notices }
    }

    /// An outcome with no notices.
    pub fn clean(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            notices: self.notices,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Notice>) {
        (self.value, self.notices)
    }

    /// Whether any notice matches `pred`.
    pub fn has_notice(&self, pred: impl Fn(&Notice) -> bool) -> bool {
        self.notices.iter().any(pred)
    }
}
