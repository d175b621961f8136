//! Word-to-caption segmentation.
//!
//! The engine runs a fixed sequence of passes, each total over the previous pass's output:
//! 1. sentence split (terminators and long silences)
//! 2. hard-limit enforcement (clause backtracking, then greedy duration fallback)
//! 3. orphan merge
//! 4. overlap repair
//! 5. trailing display buffer on the final caption
//!
//! Captions are then line-broken for display. The passes never fail: only malformed input is
//! an error.

use tracing::debug;

use crate::error::InputError;
use crate::line_splitter::split_lines;
use crate::policy::ReadabilityPolicy;
use crate::segments::Segment;
use crate::word::{Word, validate_words};
use crate::Result;

mod limits;
mod measure;
mod merge;
mod overlap;
mod sentences;

pub(crate) use overlap::{apply_display_buffer, repair_overlaps};

use limits::enforce_limits;
use measure::Measure;
use merge::merge_orphans;
use sentences::split_sentences;

/// Group a time-ordered word stream into readable captions.
///
/// Fails with [`InputError`] when `words` is empty (or only whitespace), unsorted, inverted, or
/// non-finite. Every returned caption satisfies `start < end`, consecutive captions do not
/// overlap, and each caption stays within `max_segment_duration` and `max_block_chars`
/// (a single token longer than a line is the only exception to the layout limits).
pub fn segment(words: &[Word], policy: &ReadabilityPolicy) -> Result<Vec<Segment>> {
    validate_words(words)?;

    let words: Vec<Word> = words
        .iter()
        .filter(|w| !w.text.trim().is_empty())
        .cloned()
        .collect();
    if words.is_empty() {
        return Err(InputError::Empty.into());
    }

    let m = Measure::new(&words, policy);

    let sentences = split_sentences(&words, policy);
    let sentence_count = sentences.len();

    let limited: Vec<_> = sentences
        .into_iter()
        .flat_map(|group| enforce_limits(&m, group))
        .collect();
    let limited_count = limited.len();

    let drafts: Vec<Segment> = merge_orphans(&m, limited)
        .into_iter()
        .map(|range| m.to_segment(range))
        .collect();

    let mut segments = repair_overlaps(drafts, policy);
    apply_display_buffer(&mut segments, policy);

    for segment in &mut segments {
        segment.text = split_lines(&segment.text, policy);
    }

    debug!(
        words = words.len(),
        sentences = sentence_count,
        after_limits = limited_count,
        segments = segments.len(),
        "segmented words into captions"
    );

    Ok(segments)
}
