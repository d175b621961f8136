use crate::line_splitter::{char_len, fits_block};
use crate::normalize::join_word_texts;
use crate::policy::ReadabilityPolicy;
use crate::segments::Segment;

/// Shortest span handed to a caption that arrives with no duration.
const MIN_SPAN: f64 = 0.001;

/// Single forward walk that removes overlap between consecutive captions.
///
/// Captions sharing one start are first laid out one after another across their shared span.
/// After that, an overlapping caption has its end trimmed to the next start; later starts are
/// never moved backward. A caption with no duration is widened toward the next start, up to
/// `min_segment_duration`. A caption left shorter than `min_overlap_repair_duration` is merged
/// forward only when the merged caption respects the hard limits.
///
/// Expects single-line text; line splitting happens afterwards.
pub(crate) fn repair_overlaps(segments: Vec<Segment>, policy: &ReadabilityPolicy) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut segments = spread_shared_starts(segments, policy).into_iter();
    let Some(mut current) = segments.next() else {
        return out;
    };

    for next in segments {
        if current.end > next.start {
            current.end = next.start.max(current.start);
        }
        if current.duration() <= 0.0 {
            current.end = next.start.min(current.start + fallback_span(policy));
        }

        if current.duration() < policy.min_overlap_repair_duration {
            let merged = merge_pair(current.clone(), &next);
            if within_hard_limits(&merged, policy) {
                current = merged;
                continue;
            }
        }

        out.push(current);
        current = next;
    }
    if current.duration() <= 0.0 {
        current.end = current.start + fallback_span(policy);
    }
    out.push(current);

    out
}

/// Lay out each run of captions sharing one start across the run's span, each caption taking
/// a share proportional to its characters. The span never reaches past the next start or the
/// duration ceiling, so every caption in the run ends up non-empty and within limits.
fn spread_shared_starts(segments: Vec<Segment>, policy: &ReadabilityPolicy) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut run: Vec<Segment> = Vec::new();

    for segment in segments {
        if run.first().is_some_and(|first| segment.start > first.start) {
            spread_run(&mut run, Some(segment.start), policy);
            out.append(&mut run);
        }
        run.push(segment);
    }
    spread_run(&mut run, None, policy);
    out.append(&mut run);

    out
}

fn spread_run(run: &mut [Segment], next_start: Option<f64>, policy: &ReadabilityPolicy) {
    if run.len() < 2 {
        return;
    }

    let start = run[0].start;
    let shared_end = run.iter().map(|s| s.end).fold(start, f64::max);
    let mut span = shared_end - start;
    if span <= 0.0 {
        span = fallback_span(policy) * run.len() as f64;
    }
    if let Some(next_start) = next_start {
        span = span.min(next_start - start);
    }
    let span = span.min(policy.max_segment_duration);

    let weights: Vec<usize> = run.iter().map(|s| char_len(&s.text).max(1)).collect();
    let total: usize = weights.iter().sum();
    let at = |offset: usize| start + span * offset as f64 / total as f64;

    let mut offset = 0usize;
    for (segment, weight) in run.iter_mut().zip(weights) {
        segment.start = at(offset);
        offset += weight;
        segment.end = at(offset);
    }
}

fn fallback_span(policy: &ReadabilityPolicy) -> f64 {
    policy
        .min_segment_duration
        .min(policy.max_segment_duration)
        .max(MIN_SPAN)
}

/// Pad the final caption's end by `display_buffer`, without pushing it past the duration
/// ceiling. Earlier captions are left alone so no overlap is reintroduced.
pub(crate) fn apply_display_buffer(segments: &mut [Segment], policy: &ReadabilityPolicy) {
    let Some(last) = segments.last_mut() else {
        return;
    };

    let ceiling = last.start + policy.max_segment_duration;
    let padded = (last.end + policy.display_buffer).min(ceiling);
    last.end = last.end.max(padded);

    if last.end <= last.start {
        last.end = last.start + fallback_span(policy);
    }
}

fn merge_pair(mut first: Segment, second: &Segment) -> Segment {
    first.end = first.end.max(second.end);
    first.text = join_word_texts([first.text.as_str(), second.text.as_str()]);
    first.words.extend(second.words.iter().cloned());
    first
}

fn within_hard_limits(segment: &Segment, policy: &ReadabilityPolicy) -> bool {
    segment.duration() <= policy.max_segment_duration && fits_block(&segment.text, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> Segment {
        Segment::new(start, end, text)
    }

    #[test]
    fn trims_overlapping_end_to_next_start() {
        let out = repair_overlaps(
            vec![seg(0.0, 2.5, "first caption"), seg(2.0, 3.0, "second caption")],
            &ReadabilityPolicy::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end, 2.0);
        assert_eq!(out[1].start, 2.0);
    }

    #[test]
    fn tiny_remainder_is_merged_forward() {
        let out = repair_overlaps(
            vec![seg(1.0, 2.0, "blip"), seg(1.05, 3.0, "the real caption")],
            &ReadabilityPolicy::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, 1.0);
        assert_eq!(out[0].end, 3.0);
        assert_eq!(out[0].text, "blip the real caption");
    }

    #[test]
    fn tiny_remainder_is_kept_when_merge_breaks_limits() {
        let out = repair_overlaps(
            vec![seg(1.0, 2.0, "blip"), seg(1.05, 5.5, "a much longer caption")],
            &ReadabilityPolicy::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end, 1.05);
    }

    #[test]
    fn instant_caption_is_widened_instead_of_swallowed() {
        let policy = ReadabilityPolicy::default();
        let out = repair_overlaps(
            vec![seg(10.0, 10.0, "Hello."), seg(50.0, 51.0, "Next sentence here.")],
            &policy,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].start, 10.0);
        assert!((out[0].end - (10.0 + policy.min_segment_duration)).abs() < 1e-9);
        assert_eq!(out[1].start, 50.0);
    }

    #[test]
    fn instant_caption_never_reaches_past_the_next_start() {
        let out = repair_overlaps(
            vec![seg(1.0, 1.0, "quick"), seg(1.3, 2.0, "follow up")],
            &ReadabilityPolicy::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end, 1.3);
    }

    #[test]
    fn shared_starts_are_spread_by_characters() {
        let policy = ReadabilityPolicy::default();
        let out = repair_overlaps(
            vec![
                seg(5.0, 8.0, "aaaaaaaaaaaaaaaaaaaa"),
                seg(5.0, 8.0, "bbbbbbbbbbbbbbbbbbbb"),
                seg(5.0, 8.0, "cccccccccccccccccccccccccccccccccccccccc"),
            ],
            &policy,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].start, 5.0);
        assert!((out[0].end - 5.75).abs() < 1e-9);
        assert!((out[1].end - 6.5).abs() < 1e-9);
        assert!((out[2].end - 8.0).abs() < 1e-9);
        for pair in out.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn shared_instant_without_duration_still_gets_room() {
        let policy = ReadabilityPolicy::default();
        let out = repair_overlaps(
            vec![seg(2.0, 2.0, "one caption"), seg(2.0, 2.0, "another one"), seg(2.5, 3.0, "later")],
            &policy,
        );
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|s| s.end > s.start));
        assert!((out[1].end - 2.5).abs() < 1e-9);
    }

    #[test]
    fn display_buffer_pads_only_the_last_caption() {
        let policy = ReadabilityPolicy::default();
        let mut segments = vec![seg(0.0, 1.0, "a"), seg(1.0, 2.0, "b")];
        apply_display_buffer(&mut segments, &policy);
        assert_eq!(segments[0].end, 1.0);
        assert!((segments[1].end - 2.2).abs() < 1e-9);
    }

    #[test]
    fn display_buffer_respects_duration_ceiling() {
        let policy = ReadabilityPolicy::default();
        let mut segments = vec![seg(10.0, 13.9, "nearly at the ceiling")];
        apply_display_buffer(&mut segments, &policy);
        assert!(segments[0].duration() <= policy.max_segment_duration + 1e-9);
    }
}
