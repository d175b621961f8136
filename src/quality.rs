//! Objective scoring of a finished caption set.
//!
//! Every number here is a pure function of the captions and the policy, so two runs over the
//! same input produce identical reports and can be diffed for regressions.

use std::cmp::Ordering;

use serde::Serialize;

use crate::policy::ReadabilityPolicy;
use crate::segments::Segment;

/// Lower bucket edges for caption durations, in seconds. The last bucket is open-ended.
pub const DURATION_BUCKET_EDGES: [f64; 8] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

/// Lower bucket edges for characters per second. The last bucket is open-ended.
pub const CPS_BUCKET_EDGES: [f64; 8] = [0.0, 5.0, 10.0, 12.0, 15.0, 17.0, 20.0, 25.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub segment_count: usize,
    pub duration: RangeCounts,
    pub cps: RangeCounts,
    pub duration_histogram: Histogram,
    pub cps_histogram: Histogram,

    /// Adjacent pairs where a caption ends after the next one starts.
    pub overlap_count: usize,

    /// Captions with at least one line longer than `max_line_chars`.
    pub long_line_count: usize,

    /// Up to `quality_worst_k` offenders per metric, worst first.
    pub worst_offenders: Vec<Offender>,

    /// Weighted average of the four pass ratios, in `[0, 1]`.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeCounts {
    pub too_short: usize,
    pub within_range: usize,
    pub too_long: usize,
}

/// `counts[i]` holds values in `[edges[i], edges[i + 1])`; the last bucket has no upper edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Duration,
    Cps,
    Overlap,
    LineLength,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offender {
    /// Index of the caption in the input slice.
    pub index: usize,
    pub metric: Metric,

    /// Duration in seconds, CPS, overlap in seconds, or longest line in characters.
    pub value: f64,
}

/// Score a caption set against `policy`.
pub fn compute_quality(segments: &[Segment], policy: &ReadabilityPolicy) -> QualityReport {
    let n = segments.len();

    let durations: Vec<f64> = segments.iter().map(Segment::duration).collect();
    let cps: Vec<f64> = segments.iter().map(Segment::cps).collect();
    let longest_lines: Vec<usize> = segments
        .iter()
        .map(|s| s.lines().map(|l| l.chars().count()).max().unwrap_or(0))
        .collect();
    let overlaps: Vec<(usize, f64)> = segments
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].end > pair[1].start)
        .map(|(i, pair)| (i, pair[0].end - pair[1].start))
        .collect();

    let (min_dur, max_dur) = (policy.min_segment_duration, policy.max_segment_duration);
    let (min_cps, max_cps) = (policy.min_cps, policy.max_cps);
    let max_line = policy.max_line_chars;

    let duration = classify(&durations, min_dur, max_dur);
    let cps_counts = classify(&cps, min_cps, max_cps);
    let long_line_count = longest_lines.iter().filter(|&&len| len > max_line).count();

    let k = policy.quality_worst_k;
    let mut worst_offenders = Vec::new();
    worst_offenders.extend(worst(
        Metric::Duration,
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| (i, d, outside(d, min_dur, max_dur))),
        k,
    ));
    worst_offenders.extend(worst(
        Metric::Cps,
        cps.iter()
            .enumerate()
            .map(|(i, &c)| (i, c, outside(c, min_cps, max_cps))),
        k,
    ));
    worst_offenders.extend(worst(
        Metric::Overlap,
        overlaps.iter().map(|&(i, amount)| (i, amount, amount)),
        k,
    ));
    worst_offenders.extend(worst(
        Metric::LineLength,
        longest_lines
            .iter()
            .enumerate()
            .map(|(i, &len)| (i, len as f64, len.saturating_sub(max_line) as f64)),
        k,
    ));

    let ratio = |pass: usize, total: usize| {
        if total == 0 {
            1.0
        } else {
            pass as f64 / total as f64
        }
    };
    let pair_count = n.saturating_sub(1);
    let ratios = [
        ratio(duration.within_range, n),
        ratio(cps_counts.within_range, n),
        ratio(pair_count - overlaps.len(), pair_count),
        ratio(n - long_line_count, n),
    ];

    QualityReport {
        segment_count: n,
        duration,
        cps: cps_counts,
        duration_histogram: histogram(&DURATION_BUCKET_EDGES, &durations),
        cps_histogram: histogram(&CPS_BUCKET_EDGES, &cps),
        overlap_count: overlaps.len(),
        long_line_count,
        worst_offenders,
        score: weighted_score(&ratios, policy),
    }
}

fn classify(values: &[f64], min: f64, max: f64) -> RangeCounts {
    let mut counts = RangeCounts::default();
    for &v in values {
        if v < min {
            counts.too_short += 1;
        } else if v > max {
            counts.too_long += 1;
        } else {
            counts.within_range += 1;
        }
    }
    counts
}

/// How far `v` sits outside `[min, max]`; zero inside.
fn outside(v: f64, min: f64, max: f64) -> f64 {
    if v < min {
        min - v
    } else if v > max {
        v - max
    } else {
        0.0
    }
}

/// The `k` entries with the largest positive severity, ties broken by index.
fn worst(
    metric: Metric,
    entries: impl Iterator<Item = (usize, f64, f64)>,
    k: usize,
) -> Vec<Offender> {
    let mut offenders: Vec<(usize, f64, f64)> =
        entries.filter(|&(_, _, severity)| severity > 0.0).collect();
    offenders.sort_by(|a, b| match b.2.total_cmp(&a.2) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    offenders
        .into_iter()
        .take(k)
        .map(|(index, value, _)| Offender {
            index,
            metric,
            value,
        })
        .collect()
}

fn histogram(edges: &[f64], values: &[f64]) -> Histogram {
    let mut counts = vec![0usize; edges.len()];
    for &v in values {
        let bucket = edges.iter().rposition(|&edge| v >= edge).unwrap_or(0);
        counts[bucket] += 1;
    }
    Histogram {
        edges: edges.to_vec(),
        counts,
    }
}

fn weighted_score(ratios: &[f64; 4], policy: &ReadabilityPolicy) -> f64 {
    let w = &policy.quality_weights;
    let weights = [w.duration, w.cps, w.overlap, w.line_length].map(|w| w.max(0.0));
    let total: f64 = weights.iter().sum();

    let score = if total > 0.0 {
        ratios.iter().zip(weights).map(|(r, w)| r * w).sum::<f64>() / total
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };
    score.clamp(0.0, 1.0)
}
