//! Deciding whether recognizer "words" are really words.
//!
//! Recognizers do not always deliver what they claim. Some emit sentence-level spans labelled as
//! words; some emit word lists where every word carries its chunk's timing. Both are caught here,
//! once, at the boundary, so the segmenter only ever sees usable word timings.

use crate::policy::ReadabilityPolicy;
use crate::word::{Chunk, Word};

/// Timestamps closer than this are treated as identical.
const SAME_INSTANT: f64 = 0.001;

/// Outcome of inspecting the first few word records.
#[derive(Debug, Clone, PartialEq)]
pub enum WordInputVerdict {
    /// Timings look like individual words.
    Usable,

    /// The average record lasts too long to be a single word.
    ChunkLevel { avg_duration: f64 },

    /// Every sampled record shares one `(start, end)` pair.
    Degenerate { start: f64, end: f64, count: usize },
}

/// Inspect the first `detection_sample_size` words.
///
/// Degenerate timing wins over the average-duration check: identical timings usually carry the
/// whole chunk's span and would otherwise also look chunk-level.
pub fn classify_word_input(words: &[Word], policy: &ReadabilityPolicy) -> WordInputVerdict {
    let sample = &words[..policy.detection_sample_size.max(1).min(words.len())];
    let Some(first) = sample.first() else {
        return WordInputVerdict::Usable;
    };

    if sample.len() >= 2 && sample.iter().all(|w| same_timing(w, first)) {
        return WordInputVerdict::Degenerate {
            start: first.start,
            end: first.end,
            count: sample.len(),
        };
    }

    let avg_duration = sample.iter().map(Word::duration).sum::<f64>() / sample.len() as f64;
    if avg_duration >= policy.word_level_max_avg_duration {
        return WordInputVerdict::ChunkLevel { avg_duration };
    }

    WordInputVerdict::Usable
}

/// Rebuild chunks from a flat word list whose timings cannot be trusted.
///
/// Consecutive words sharing one timing become a single chunk spanning that timing; the runs of
/// words in between are kept together as one chunk each.
pub fn coalesce_degenerate_words(words: &[Word]) -> Vec<Chunk> {
    let degenerate: Vec<bool> = (0..words.len())
        .map(|i| {
            (i > 0 && same_timing(&words[i - 1], &words[i]))
                || (i + 1 < words.len() && same_timing(&words[i], &words[i + 1]))
        })
        .collect();

    let mut chunks = Vec::new();
    let mut start = 0usize;
    for i in 1..=words.len() {
        let boundary = i == words.len()
            || degenerate[i] != degenerate[i - 1]
            || (degenerate[i] && !same_timing(&words[i - 1], &words[i]));
        if boundary {
            chunks.push(chunk_from(&words[start..i]));
            start = i;
        }
    }

    chunks
}

fn chunk_from(words: &[Word]) -> Chunk {
    let start = words.first().map_or(0.0, |w| w.start);
    let end = words.iter().map(|w| w.end).fold(start, f64::max);
    let text = crate::normalize::join_word_texts(words.iter().map(|w| w.text.as_str()));
    Chunk::new(text, start, end).with_words(words.to_vec())
}

fn same_timing(a: &Word, b: &Word) -> bool {
    (a.start - b.start).abs() < SAME_INSTANT && (a.end - b.end).abs() < SAME_INSTANT
}
