//! Trim offset computation.

use hc_core::{seconds, seconds_between, ClipKind, Error, Instant, Notice, Outcome, Result, Selection};

/// Where to cut the concatenated selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimPlan {
    pub kind: ClipKind,
    /// Instant the clip should start at.
    pub clip_start: Instant,
    /// Seconds from the start of the earliest selected segment; never
    /// negative.
    pub start_offset: f64,
    /// Requested clip length in seconds.
    pub duration: f64,
    /// Seconds of source material in the selection.
    pub available: f64,
}

/// Plan the trim for `selection`.
///
/// A before-clip ends at `reference`, so it starts `duration` seconds
/// earlier; an after-clip starts at `reference`. If the selection holds
/// less material than requested, a [`Notice::ShortSource`] is raised and the
/// plan still asks for the full duration; the encoder emits a shorter clip.
///
/// # Errors
///
/// Returns [`Error::EmptyTimeline`] if the selection has no segments, and
/// [`Error::Validation`] if the clip start cannot be represented.
pub fn plan_trim(selection: &Selection, reference: Instant, duration: f64) -> Result<Outcome<TrimPlan>> {
    let earliest = selection.earliest().ok_or(Error::EmptyTimeline)?;
    let kind = selection.kind();

    let clip_start = match kind {
        ClipKind::Before => reference.checked_sub_signed(seconds(duration)).ok_or_else(|| {
            Error::Validation(format!(
                "clip start {duration}s before {} is out of range",
                reference.to_rfc3339()
            ))
        })?,
        ClipKind::After => reference,
    };
    let start_offset = seconds_between(earliest.start, clip_start).max(0.0);
    let available = selection.total_duration();

    let mut notices = Vec::new();
    if available < duration {
        Notice::ShortSource {
            kind,
            available,
            requested: duration,
        }
        .raise(&mut notices);
    }

    Ok(Outcome::new(
        TrimPlan {
            kind,
            clip_start,
            start_offset,
            duration,
            available,
        },
        notices,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use hc_core::{Segment, Window};
    use url::Url;

    fn t0() -> Instant {
        DateTime::parse_from_rfc3339("2025-06-03T08:03:00+05:30").unwrap()
    }

    fn selection(window: Window, starts: &[f64], duration: f64) -> Selection {
        Selection {
            window,
            segments: starts
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Segment::new(
                        Url::parse(&format!("http://host/seg{i}.ts")).unwrap(),
                        t0() + seconds(*s),
                        duration,
                    )
                })
                .collect(),
            fallback: false,
        }
    }

    #[test]
    fn before_clip_starts_duration_before_reference() {
        let reference = t0() + seconds(18.0);
        let sel = selection(Window::before(reference, 10.0).unwrap(), &[6.0, 10.0, 14.0], 4.0);
        let plan = plan_trim(&sel, reference, 10.0).unwrap();
        assert!(plan.notices.is_empty());
        // Clip starts at T+8; earliest segment at T+6.
        assert_eq!(plan.value.start_offset, 2.0);
        assert_eq!(plan.value.clip_start, t0() + seconds(8.0));
        assert_eq!(plan.value.available, 12.0);
    }

    #[test]
    fn after_clip_starts_at_reference() {
        let reference = t0() + seconds(5.0);
        let sel = selection(Window::after(reference, 10.0).unwrap(), &[4.0, 8.0, 12.0], 4.0);
        let plan = plan_trim(&sel, reference, 10.0).unwrap().value;
        assert_eq!(plan.start_offset, 1.0);
        assert_eq!(plan.clip_start, reference);
    }

    #[test]
    fn offset_is_clamped_at_zero() {
        // Fallback selection entirely after the reference.
        let reference = t0();
        let sel = selection(Window::before(reference, 10.0).unwrap(), &[30.0, 34.0], 4.0);
        let plan = plan_trim(&sel, reference, 10.0).unwrap().value;
        assert_eq!(plan.start_offset, 0.0);

        let sel = selection(Window::after(reference, 10.0).unwrap(), &[30.0], 4.0);
        assert_eq!(plan_trim(&sel, reference, 10.0).unwrap().value.start_offset, 0.0);
    }

    #[test]
    fn short_source_warns_but_keeps_requested_duration() {
        let reference = t0() + seconds(4.0);
        let sel = selection(Window::before(reference, 10.0).unwrap(), &[0.0], 4.0);
        let plan = plan_trim(&sel, reference, 10.0).unwrap();
        assert_eq!(plan.value.duration, 10.0);
        assert_eq!(plan.value.available, 4.0);
        assert_eq!(
            plan.notices,
            vec![Notice::ShortSource {
                kind: ClipKind::Before,
                available: 4.0,
                requested: 10.0,
            }]
        );
    }

    #[test]
    fn empty_selection_is_rejected() {
        let sel = selection(Window::after(t0(), 10.0).unwrap(), &[], 4.0);
        assert!(matches!(plan_trim(&sel, t0(), 10.0), Err(Error::EmptyTimeline)));
    }
}
