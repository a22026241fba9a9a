//! Mapping a wall-clock window onto a small covering subset of a timeline.
//!
//! Boundary convention: a before-window is closed on both ends, so a segment
//! that ends exactly at the window start or starts exactly at the reference
//! instant is a candidate. An after-window is half-open, so a segment ending
//! exactly at the reference instant or starting exactly at the window end is
//! not.

use hc_core::{ClipKind, Error, Instant, Notice, Outcome, Result, Segment, Selection, Timeline, Window};

/// How many segments a selection may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub max_segments: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self { max_segments: 3 }
    }
}

/// Select the segments covering `[reference - look_back, reference]`,
/// keeping the last `max_segments` candidates.
pub fn select_before(
    timeline: &Timeline,
    reference: Instant,
    look_back: f64,
    policy: SelectionPolicy,
) -> Result<Outcome<Selection>> {
    select(timeline, Window::before(reference, look_back)?, policy)
}

/// Select the segments covering `[reference, reference + look_ahead)`,
/// keeping the first `max_segments` candidates.
pub fn select_after(
    timeline: &Timeline,
    reference: Instant,
    look_ahead: f64,
    policy: SelectionPolicy,
) -> Result<Outcome<Selection>> {
    select(timeline, Window::after(reference, look_ahead)?, policy)
}

fn overlaps(window: &Window, segment: &Segment) -> bool {
    match window.kind {
        ClipKind::Before => segment.start <= window.end && segment.end() >= window.start,
        ClipKind::After => segment.end() > window.start && segment.start < window.end,
    }
}

/// Keep the edge of `pool` nearest the reference instant: the tail for a
/// before-window, the head for an after-window.
fn nearest_edge<'p, 'a>(pool: &'p [&'a Segment], kind: ClipKind, max: usize) -> &'p [&'a Segment] {
    match kind {
        ClipKind::Before => &pool[pool.len().saturating_sub(max)..],
        ClipKind::After => &pool[..pool.len().min(max)],
    }
}

/// Select segments for an arbitrary window.
///
/// # Errors
///
/// Returns [`Error::EmptyTimeline`] when the timeline has no segments.
pub fn select(timeline: &Timeline, window: Window, policy: SelectionPolicy) -> Result<Outcome<Selection>> {
    if timeline.is_empty() {
        return Err(Error::EmptyTimeline);
    }

    let mut notices = Vec::new();
    let candidates: Vec<&Segment> = timeline.iter().filter(|s| overlaps(&window, s)).collect();

    let fallback = candidates.is_empty();
    let pool = if fallback {
        Notice::NoCoverage {
            kind: window.kind,
            window: window.to_string(),
        }
        .raise(&mut notices);
        timeline.iter().collect()
    } else {
        candidates
    };

    let segments: Vec<Segment> = nearest_edge(&pool, window.kind, policy.max_segments)
        .iter()
        .map(|s| (*s).clone())
        .collect();

    tracing::info!(
        "{} window {window}: selected {} of {} segments{}",
        window.kind,
        segments.len(),
        timeline.len(),
        if fallback { " (fallback)" } else { "" }
    );

    Ok(Outcome::new(
        Selection {
            window,
            segments,
            fallback,
        },
        notices,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use hc_core::seconds;
    use url::Url;

    fn t0() -> Instant {
        DateTime::parse_from_rfc3339("2025-06-03T08:03:00+05:30").unwrap()
    }

    /// `count` segments of `duration` seconds, starting `step` seconds apart.
    fn timeline(count: usize, duration: f64, step: f64) -> Timeline {
        Timeline::new(
            (0..count)
                .map(|i| {
                    Segment::new(
                        Url::parse(&format!("http://host/live/seg{i}.ts")).unwrap(),
                        t0() + seconds(step * i as f64),
                        duration,
                    )
                })
                .collect(),
        )
    }

    fn names(sel: &Selection) -> Vec<&str> {
        sel.segments.iter().map(|s| s.file_name()).collect()
    }

    #[test]
    fn before_window_includes_covering_segments() {
        // Segments [T,T+6], [T+5,T+11], [T+10,T+16]; window [T+2, T+12].
        let tl = timeline(3, 6.0, 5.0);
        let out = select_before(&tl, t0() + seconds(12.0), 10.0, SelectionPolicy::default()).unwrap();
        assert!(out.notices.is_empty());
        assert!(!out.value.fallback);
        assert_eq!(names(&out.value), ["seg0.ts", "seg1.ts", "seg2.ts"]);
        assert_eq!(out.value.total_duration(), 18.0);
    }

    #[test]
    fn before_window_keeps_last_candidates() {
        let tl = timeline(10, 2.0, 2.0);
        // Window [T+8, T+18] overlaps seg3 (ends T+8) through seg9.
        let out = select_before(&tl, t0() + seconds(18.0), 10.0, SelectionPolicy::default()).unwrap();
        assert_eq!(names(&out.value), ["seg7.ts", "seg8.ts", "seg9.ts"]);
    }

    #[test]
    fn before_window_excludes_segments_after_reference() {
        let tl = timeline(10, 2.0, 2.0);
        let out = select_before(&tl, t0() + seconds(9.0), 10.0, SelectionPolicy::default()).unwrap();
        assert_eq!(names(&out.value), ["seg2.ts", "seg3.ts", "seg4.ts"]);
    }

    #[test]
    fn before_window_boundaries_are_inclusive() {
        let tl = timeline(3, 2.0, 2.0);
        // seg0 ends exactly at the window start, seg2 starts exactly at the
        // reference.
        let out = select_before(
            &tl,
            t0() + seconds(4.0),
            2.0,
            SelectionPolicy { max_segments: 5 },
        )
        .unwrap();
        assert_eq!(names(&out.value), ["seg0.ts", "seg1.ts", "seg2.ts"]);
    }

    #[test]
    fn after_window_keeps_first_candidates() {
        let tl = timeline(10, 2.0, 2.0);
        // Window [T+5, T+15) overlaps seg2 (T+4..T+6) through seg7.
        let out = select_after(&tl, t0() + seconds(5.0), 10.0, SelectionPolicy::default()).unwrap();
        assert_eq!(names(&out.value), ["seg2.ts", "seg3.ts", "seg4.ts"]);
    }

    #[test]
    fn after_window_boundaries_are_half_open() {
        let tl = timeline(4, 2.0, 2.0);
        // Window [T+2, T+4): seg0 ends at T+2 (excluded), seg2 starts at T+4
        // (excluded).
        let out = select_after(
            &tl,
            t0() + seconds(2.0),
            2.0,
            SelectionPolicy { max_segments: 5 },
        )
        .unwrap();
        assert_eq!(names(&out.value), ["seg1.ts"]);
    }

    #[test]
    fn empty_timeline_fails_both_directions() {
        let tl = Timeline::default();
        assert!(matches!(
            select_before(&tl, t0(), 10.0, SelectionPolicy::default()),
            Err(Error::EmptyTimeline)
        ));
        assert!(matches!(
            select_after(&tl, t0(), 10.0, SelectionPolicy::default()),
            Err(Error::EmptyTimeline)
        ));
    }

    #[test]
    fn before_falls_back_to_trailing_segments_across_a_gap() {
        let tl = timeline(5, 2.0, 2.0);
        // Everything ends by T+10; the window starts at T+50.
        let out = select_before(&tl, t0() + seconds(60.0), 10.0, SelectionPolicy::default()).unwrap();
        assert!(out.value.fallback);
        assert_eq!(names(&out.value), ["seg2.ts", "seg3.ts", "seg4.ts"]);
        assert!(out.has_notice(|n| matches!(n, Notice::NoCoverage { kind: ClipKind::Before, .. })));
    }

    #[test]
    fn after_falls_back_to_leading_segments() {
        let tl = timeline(5, 2.0, 2.0);
        let out = select_after(&tl, t0() + seconds(60.0), 10.0, SelectionPolicy::default()).unwrap();
        assert!(out.value.fallback);
        assert_eq!(names(&out.value), ["seg0.ts", "seg1.ts", "seg2.ts"]);
        assert!(out.has_notice(|n| matches!(n, Notice::NoCoverage { kind: ClipKind::After, .. })));
    }

    #[test]
    fn fallback_on_short_timeline_returns_everything() {
        let tl = timeline(2, 2.0, 2.0);
        let before = select_before(&tl, t0() - seconds(100.0), 10.0, SelectionPolicy::default()).unwrap();
        let after = select_after(&tl, t0() + seconds(100.0), 10.0, SelectionPolicy::default()).unwrap();
        assert_eq!(names(&before.value), ["seg0.ts", "seg1.ts"]);
        assert_eq!(names(&after.value), ["seg0.ts", "seg1.ts"]);
    }

    #[test]
    fn policy_limit_is_configurable() {
        let tl = timeline(10, 2.0, 2.0);
        let out = select_after(&tl, t0(), 20.0, SelectionPolicy { max_segments: 5 }).unwrap();
        assert_eq!(out.value.len(), 5);
        let out = select_after(&tl, t0(), 20.0, SelectionPolicy { max_segments: 1 }).unwrap();
        assert_eq!(names(&out.value), ["seg0.ts"]);
    }

    #[test]
    fn shrinking_windows_never_selects_more() {
        let tl = timeline(12, 1.5, 1.5);
        let reference = t0() + seconds(9.0);
        let policy = SelectionPolicy { max_segments: 4 };

        for select_fn in [select_before, select_after] {
            let mut previous = usize::MAX;
            for tenths in (0..=120).rev() {
                let out = select_fn(&tl, reference, tenths as f64 / 10.0, policy).unwrap();
                if out.value.fallback {
                    continue;
                }
                assert!(out.value.len() <= previous);
                previous = out.value.len();
            }
        }
    }

    #[test]
    fn oversized_window_is_a_validation_error() {
        let tl = timeline(3, 4.0, 4.0);
        for select_fn in [select_before, select_after] {
            let err = select_fn(&tl, t0(), 1e13, SelectionPolicy::default()).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{err}");
        }
    }

    #[test]
    fn selection_preserves_timeline_order() {
        let tl = timeline(8, 3.0, 2.0);
        let out = select_before(&tl, t0() + seconds(10.0), 10.0, SelectionPolicy { max_segments: 8 }).unwrap();
        assert!(out
            .value
            .segments
            .windows(2)
            .all(|w| w[0].start <= w[1].start));
    }
}
