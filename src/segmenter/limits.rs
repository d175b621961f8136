//! Hard-limit enforcement for one sentence group.
//!
//! First we look for clause boundaries (`, ; :`) from the middle outward, backtracking into
//! each half until every piece fits. If no combination of clause cuts works, a greedy
//! left-to-right pass packs words until the next one would break the duration or block limit.
//! The greedy pass always succeeds, so the hard limits hold even when no natural cut exists.

use std::collections::HashMap;
use std::ops::Range;

use super::measure::Measure;

type Memo = HashMap<(usize, usize), Option<Vec<Range<usize>>>>;

pub(super) fn enforce_limits(m: &Measure<'_>, group: Range<usize>) -> Vec<Range<usize>> {
    if !m.violates_limits(&group) {
        return vec![group];
    }

    let mut memo = Memo::new();
    if let Some(parts) = clause_split(m, &group, &mut memo) {
        return parts;
    }

    greedy_split(m, group)
}

/// Resolve `range` into pieces that each satisfy the hard limits, cutting only at clause
/// boundaries. Work is bounded by the clause count of one sentence group.
fn clause_split(m: &Measure<'_>, range: &Range<usize>, memo: &mut Memo) -> Option<Vec<Range<usize>>> {
    let key = (range.start, range.end);
    if let Some(hit) = memo.get(&key) {
        return hit.clone();
    }

    let result = first_resolving_cut(m, range, memo);
    memo.insert(key, result.clone());
    result
}

fn first_resolving_cut(
    m: &Measure<'_>,
    range: &Range<usize>,
    memo: &mut Memo,
) -> Option<Vec<Range<usize>>> {
    let orphan_min = m.policy().orphan_min_chars;

    for cut in clause_cuts(m, range) {
        let left = range.start..cut;
        let right = cut..range.end;

        if m.len(&left).min(m.len(&right)) < orphan_min {
            continue;
        }

        let Some(mut parts) = resolve(m, left, memo) else {
            continue;
        };
        let Some(right_parts) = resolve(m, right, memo) else {
            continue;
        };
        parts.extend(right_parts);
        return Some(parts);
    }

    None
}

fn resolve(m: &Measure<'_>, range: Range<usize>, memo: &mut Memo) -> Option<Vec<Range<usize>>> {
    if m.within_hard_limits(&range) {
        return Some(vec![range]);
    }
    clause_split(m, &range, memo)
}

/// Cut positions right after clause-terminated words, nearest the character midpoint first.
fn clause_cuts(m: &Measure<'_>, range: &Range<usize>) -> Vec<usize> {
    let words = m.words();
    let midpoint = m.len(range) as f64 / 2.0;

    let mut cuts: Vec<(f64, usize)> = (range.start..range.end - 1)
        .filter(|&i| m.policy().is_clause_end(&words[i].text))
        .map(|i| {
            let cut = i + 1;
            let offset = m.len(&(range.start..cut)) as f64;
            ((offset - midpoint).abs(), cut)
        })
        .collect();

    cuts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    cuts.into_iter().map(|(_, cut)| cut).collect()
}

/// Pack words left to right, closing a piece whenever the next word would break a hard limit.
fn greedy_split(m: &Measure<'_>, group: Range<usize>) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut start = group.start;

    for i in group.start + 1..group.end {
        if !m.within_hard_limits(&(start..i + 1)) {
            parts.push(start..i);
            start = i;
        }
    }
    parts.push(start..group.end);

    parts
}
