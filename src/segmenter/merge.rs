use std::ops::Range;

use crate::line_splitter::fits_block;

use super::measure::Measure;

/// Merge short or brief captions into their successor when the result stays readable.
///
/// A pair is merged when either side is an orphan (below `orphan_min_chars` or
/// `min_segment_duration`) and the merged caption stays within `max_segment_duration`, within
/// `max_block_chars_soft`, and still lays out as one block. Otherwise the short caption is kept
/// standalone; nothing is ever dropped.
pub(super) fn merge_orphans(m: &Measure<'_>, ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut out = Vec::with_capacity(ranges.len());
    let mut ranges = ranges.into_iter();
    let Some(mut current) = ranges.next() else {
        return out;
    };

    for next in ranges {
        let merged = current.start..next.end;
        if (m.is_orphan(&current) || m.is_orphan(&next)) && can_merge(m, &merged) {
            current = merged;
            continue;
        }
        out.push(current);
        current = next;
    }
    out.push(current);

    out
}

fn can_merge(m: &Measure<'_>, merged: &Range<usize>) -> bool {
    let policy = m.policy();
    let text = m.text(merged);
    m.duration(merged) <= policy.max_segment_duration
        && text.chars().count() <= policy.max_block_chars_soft
        && fits_block(&text, policy)
}
