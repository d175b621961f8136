use std::ops::Range;

use crate::line_splitter::{char_len, fits_block};
use crate::normalize::join_word_texts;
use crate::policy::ReadabilityPolicy;
use crate::segments::Segment;
use crate::word::Word;

/// Measurements over contiguous word ranges.
///
/// Every pass works on `Range<usize>` into one validated word slice, so a group's duration is
/// always taken from the words actually placed in it and never from surrounding boundaries.
pub(super) struct Measure<'a> {
    words: &'a [Word],
    policy: &'a ReadabilityPolicy,
}

impl<'a> Measure<'a> {
    pub(super) fn new(words: &'a [Word], policy: &'a ReadabilityPolicy) -> Self {
        Self { words, policy }
    }

    pub(super) fn words(&self) -> &'a [Word] {
        self.words
    }

    pub(super) fn policy(&self) -> &'a ReadabilityPolicy {
        self.policy
    }

    pub(super) fn text(&self, range: &Range<usize>) -> String {
        join_word_texts(self.words[range.clone()].iter().map(|w| w.text.as_str()))
    }

    pub(super) fn len(&self, range: &Range<usize>) -> usize {
        char_len(&self.text(range))
    }

    /// `last.end - first.start` of the words in `range`.
    pub(super) fn duration(&self, range: &Range<usize>) -> f64 {
        self.words[range.end - 1].end - self.words[range.start].start
    }

    pub(super) fn cps(&self, range: &Range<usize>) -> f64 {
        let duration = self.duration(range);
        if duration <= 0.0 {
            return f64::INFINITY;
        }
        self.len(range) as f64 / duration
    }

    /// Max duration and block layout. A single word always passes: it cannot be split further.
    pub(super) fn within_hard_limits(&self, range: &Range<usize>) -> bool {
        range.len() <= 1
            || (self.duration(range) <= self.policy.max_segment_duration
                && fits_block(&self.text(range), self.policy))
    }

    /// Whether `range` needs further splitting: a hard limit or the reading-speed ceiling.
    pub(super) fn violates_limits(&self, range: &Range<usize>) -> bool {
        !self.within_hard_limits(range) || (range.len() > 1 && self.cps(range) > self.policy.max_cps)
    }

    pub(super) fn is_orphan(&self, range: &Range<usize>) -> bool {
        self.len(range) < self.policy.orphan_min_chars
            || self.duration(range) < self.policy.min_segment_duration
    }

    /// Single-line caption for `range`. A lone word longer than the duration ceiling is cut
    /// short at the ceiling.
    pub(super) fn to_segment(&self, range: Range<usize>) -> Segment {
        let start = self.words[range.start].start;
        let end = self.words[range.end - 1]
            .end
            .min(start + self.policy.max_segment_duration);
        Segment {
            start,
            end,
            text: self.text(&range),
            words: self.words[range].to_vec(),
        }
    }
}
