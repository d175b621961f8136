//! Breaking one caption's text into at most `max_lines_per_block` display lines.
//!
//! Break preference, strongest first:
//! - right after a clause or sentence terminator
//! - right before a soft boundary word (conjunction/preposition)
//! - the whitespace closest to the balanced midpoint
//!
//! Every preferred break must leave both lines at least `max(10, 0.25 × max_line_chars)`
//! characters long and both within `max_line_chars`. When nothing qualifies we relax the
//! minimum, then fall back to a greedy break, and finally leave the text unbroken.

use crate::policy::ReadabilityPolicy;

/// Marker joining the lines of a caption.
pub const LINE_SEPARATOR: &str = "\n";

const MIN_LINE_CHARS: f64 = 10.0;
const MIN_LINE_FRACTION: f64 = 0.25;

/// Split `text` into display lines joined by [`LINE_SEPARATOR`].
pub fn split_lines(text: &str, policy: &ReadabilityPolicy) -> String {
    let text = collapse_whitespace(text);
    wrap(&text, policy.max_lines_per_block.max(1), policy).join(LINE_SEPARATOR)
}

/// Tokens too long to fit on any line; they are emitted unbroken.
pub fn unsplittable_tokens<'a>(text: &'a str, policy: &ReadabilityPolicy) -> Vec<&'a str> {
    text.split_whitespace()
        .filter(|t| char_len(t) > policy.max_line_chars)
        .collect()
}

/// Whether `text` fits in one caption block: within `max_block_chars`, and wrappable into
/// `max_lines_per_block` lines. A lone token always fits; it has nowhere else to go.
pub fn fits_block(text: &str, policy: &ReadabilityPolicy) -> bool {
    if char_len(text) > policy.max_block_chars {
        return false;
    }
    let mut tokens = text.split_whitespace();
    if tokens.next().is_none() || tokens.next().is_none() {
        return true;
    }
    greedy_line_count(text, policy.max_line_chars)
        .is_some_and(|lines| lines <= policy.max_lines_per_block)
}

/// Minimum number of lines a greedy wrap needs, or `None` if a token cannot fit on a line.
fn greedy_line_count(text: &str, max_line_chars: usize) -> Option<usize> {
    let mut lines = 0usize;
    let mut current = 0usize;

    for token in text.split_whitespace() {
        let len = char_len(token);
        if len > max_line_chars {
            return None;
        }
        if current == 0 {
            lines += 1;
            current = len;
        } else if current + 1 + len <= max_line_chars {
            current += 1 + len;
        } else {
            lines += 1;
            current = len;
        }
    }

    Some(lines)
}

fn fits_lines(text: &str, lines: usize, max_line_chars: usize) -> bool {
    greedy_line_count(text, max_line_chars).is_some_and(|n| n <= lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakKind {
    Punctuation,
    SoftWord,
    Plain,
}

#[derive(Debug, Clone, Copy)]
struct Break {
    /// Byte index of the space we break on.
    at: usize,
    left_len: usize,
    right_len: usize,
    kind: BreakKind,
}

fn wrap(text: &str, lines_left: usize, policy: &ReadabilityPolicy) -> Vec<String> {
    let total = char_len(text);
    let max = policy.max_line_chars;
    if total <= max || lines_left <= 1 {
        return vec![text.to_owned()];
    }

    let breaks = break_candidates(text, policy);
    let needed = greedy_line_count(text, max)
        .unwrap_or(lines_left)
        .clamp(2, lines_left);
    let target = total as f64 / needed as f64;
    let min_len = MIN_LINE_CHARS.max(MIN_LINE_FRACTION * max as f64);

    let right_fits =
        |b: &Break| b.left_len <= max && fits_lines(&text[b.at + 1..], lines_left - 1, max);
    let qualifies = |b: &Break| {
        b.left_len as f64 >= min_len && b.right_len as f64 >= min_len && right_fits(b)
    };

    let chosen = [BreakKind::Punctuation, BreakKind::SoftWord]
        .into_iter()
        .find_map(|kind| {
            closest(
                breaks.iter().filter(|&b| b.kind == kind && qualifies(b)),
                target,
            )
        })
        .or_else(|| closest(breaks.iter().filter(|&b| qualifies(b)), target))
        .or_else(|| closest(breaks.iter().filter(|&b| right_fits(b)), target))
        .or_else(|| breaks.iter().rev().find(|b| b.left_len <= max).copied());

    let Some(chosen) = chosen else {
        return vec![text.to_owned()];
    };

    let mut lines = vec![text[..chosen.at].to_owned()];
    lines.extend(wrap(&text[chosen.at + 1..], lines_left - 1, policy));
    lines
}

/// The candidate whose first line is closest to `target` characters; earlier breaks win ties.
fn closest<'a>(candidates: impl Iterator<Item = &'a Break>, target: f64) -> Option<Break> {
    candidates
        .min_by(|a, b| {
            let da = (a.left_len as f64 - target).abs();
            let db = (b.left_len as f64 - target).abs();
            da.total_cmp(&db).then(a.at.cmp(&b.at))
        })
        .copied()
}

/// Every single space in `text` (already whitespace-collapsed) is a candidate break.
fn break_candidates(text: &str, policy: &ReadabilityPolicy) -> Vec<Break> {
    let total = char_len(text);
    let mut breaks = Vec::new();
    let mut chars_before = 0usize;

    for (at, c) in text.char_indices() {
        if c == ' ' {
            let left = &text[..at];
            let right = &text[at + 1..];
            let kind = if policy.is_clause_end(left) || policy.is_sentence_end(left) {
                BreakKind::Punctuation
            } else if right
                .split(' ')
                .next()
                .is_some_and(|w| policy.is_soft_boundary_word(w))
            {
                BreakKind::SoftWord
            } else {
                BreakKind::Plain
            };
            breaks.push(Break {
                at,
                left_len: chars_before,
                right_len: total - chars_before - 1,
                kind,
            });
        }
        chars_before += 1;
    }

    breaks
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
