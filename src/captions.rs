//! High-level API: recognizer records in, rendered captions out.
//!
//! This module wires detection → segmentation (or the chunk-level fallback) → line splitting →
//! encoder, while keeping each of those pieces testable in its own module.
//!
//! Typical usage:
//! - Parse recognizer output with [`crate::input::read_records`].
//! - Call [`build_caption_set`] once.
//! - Render the same [`CaptionSet`] into as many formats as needed.

use std::io::{BufWriter, Write};

use tracing::{debug, warn};

use crate::Result;
use crate::detect::{WordInputVerdict, classify_word_input, coalesce_degenerate_words};
use crate::error::InputError;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::line_splitter::{char_len, fits_block, split_lines, unsplittable_tokens};
use crate::normalize::join_word_texts;
use crate::output_type::OutputType;
use crate::policy::ReadabilityPolicy;
use crate::segment_encoder::SegmentEncoder;
use crate::segmenter::{repair_overlaps, segment};
use crate::segments::Segment;
use crate::srt_encoder::SrtEncoder;
use crate::text_encoder::TextEncoder;
use crate::vtt_encoder::VttEncoder;
use crate::word::{Chunk, Record, Word, validate_chunks};

/// Shortest span given to a chunk that arrives with no duration.
const MIN_CHUNK_SPAN: f64 = 0.001;

/// Where the caption timings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Captions were segmented from individual word timings.
    Word,
    /// Captions follow the recognizer's coarse chunks.
    Chunk,
}

/// Non-fatal findings collected while building captions.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Word timings were identical across the inspected sample, or across one chunk's nested
    /// words; chunk timings were used instead.
    DegenerateTimestamps { start: f64, end: f64, count: usize },

    /// Word records were too long to be words; they were treated as chunks.
    WordLevelRejected { avg_duration: f64 },

    /// A single token is longer than a display line and was emitted unbroken.
    UnsplittableToken { segment_index: usize, token: String },
}

/// A finished, ordered set of captions plus how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSet {
    pub segments: Vec<Segment>,
    pub granularity: Granularity,

    /// Word-level data was present but judged unusable, so a fallback path was taken.
    pub word_level_rejected: bool,

    pub warnings: Vec<Warning>,
}

impl CaptionSet {
    pub fn render(&self, output_type: OutputType) -> Result<String> {
        render(self, output_type)
    }
}

/// Turn recognizer records into captions.
///
/// Word timings are used whenever they are present and pass [`classify_word_input`], both for
/// the stream as a whole and for each chunk's nested words; otherwise the records are captioned
/// at chunk granularity. Fails only on empty or malformed input.
pub fn build_caption_set(records: &[Record], policy: &ReadabilityPolicy) -> Result<CaptionSet> {
    if records.is_empty() {
        return Err(InputError::Empty.into());
    }

    let mut warnings = Vec::new();

    let (segments, granularity, word_level_rejected) = match word_stream(records) {
        None => (chunk_segments(records, policy)?, Granularity::Chunk, false),
        Some(words) => match classify_word_input(&words, policy) {
            WordInputVerdict::Usable => {
                let degenerate = degenerate_chunks(records, policy);
                if degenerate.is_empty() {
                    (segment(&words, policy)?, Granularity::Word, false)
                } else {
                    warnings.extend(degenerate);
                    (chunk_segments(records, policy)?, Granularity::Chunk, true)
                }
            }
            WordInputVerdict::ChunkLevel { avg_duration } => {
                warn!(
                    avg_duration,
                    threshold = policy.word_level_max_avg_duration,
                    "word records look sentence-level; captioning them as chunks"
                );
                warnings.push(Warning::WordLevelRejected { avg_duration });
                (chunk_segments(records, policy)?, Granularity::Chunk, true)
            }
            WordInputVerdict::Degenerate { start, end, count } => {
                warnings.push(degenerate_warning(start, end, count));
                let segments = if records.iter().any(|r| matches!(r, Record::Chunk(_))) {
                    chunk_segments(records, policy)?
                } else {
                    segments_from_chunks(&coalesce_degenerate_words(&words), policy)?
                };
                (segments, Granularity::Chunk, true)
            }
        },
    };

    warnings.extend(unsplittable_warnings(&segments, policy));

    debug!(
        records = records.len(),
        segments = segments.len(),
        ?granularity,
        word_level_rejected,
        "built caption set"
    );

    Ok(CaptionSet {
        segments,
        granularity,
        word_level_rejected,
        warnings,
    })
}

/// Caption coarse chunks directly, one caption per chunk.
///
/// A chunk too long to display (by duration or by block layout) is cut on word boundaries,
/// with timings interpolated by character offset. Chunks with no text are skipped, and chunks
/// with no duration are widened to `min_segment_duration`. Overlap repair and line splitting
/// run afterwards; the display buffer does not, since chunk ends already include trailing
/// silence.
pub fn segments_from_chunks(chunks: &[Chunk], policy: &ReadabilityPolicy) -> Result<Vec<Segment>> {
    validate_chunks(chunks)?;

    let mut drafts = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let text = join_word_texts(chunk.text.split_whitespace());
        if text.is_empty() {
            continue;
        }

        let end = if chunk.end > chunk.start {
            chunk.end
        } else {
            chunk.start
                + policy
                    .min_segment_duration
                    .min(policy.max_segment_duration)
                    .max(MIN_CHUNK_SPAN)
        };
        split_chunk(&text, chunk.start, end, policy, &mut drafts);
    }

    if drafts.is_empty() {
        return Err(InputError::Empty.into());
    }

    let mut segments = repair_overlaps(drafts, policy);
    for segment in &mut segments {
        segment.text = split_lines(&segment.text, policy);
    }

    Ok(segments)
}

/// Render a caption set into one text blob.
pub fn render(set: &CaptionSet, output_type: OutputType) -> Result<String> {
    let mut out = Vec::new();
    write_captions(set, &mut out, output_type)?;
    Ok(String::from_utf8(out)?)
}

/// Stream a caption set into a writer.
pub fn write_captions<W: Write>(set: &CaptionSet, w: W, output_type: OutputType) -> Result<()> {
    // Buffer output for efficiency (especially important for stdout).
    let writer = BufWriter::new(w);

    // Select an encoder based on the requested output type.
    match output_type {
        OutputType::Srt => encode_with(SrtEncoder::new(writer), &set.segments),
        OutputType::Vtt => encode_with(VttEncoder::new(writer), &set.segments),
        OutputType::Txt => encode_with(TextEncoder::new(writer), &set.segments),
        OutputType::Json => encode_with(JsonArrayEncoder::new(writer), &set.segments),
    }
}

/// Parse-free convenience: records in, formatted text out.
pub fn format_records(
    records: &[Record],
    policy: &ReadabilityPolicy,
    output_type: OutputType,
) -> Result<String> {
    render(&build_caption_set(records, policy)?, output_type)
}

fn encode_with<E: SegmentEncoder>(mut encoder: E, segments: &[Segment]) -> Result<()> {
    let run_res = segments
        .iter()
        .try_for_each(|seg| encoder.write_segment(seg));
    merge_run_and_close(run_res, encoder.close())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(crate::Error::msg(format!(
            "{err} (closing the encoder also failed: {close_err})"
        ))),
    }
}

/// All word timings carried by `records`, or `None` when some record has no word data.
fn word_stream(records: &[Record]) -> Option<Vec<Word>> {
    let mut words = Vec::new();
    for record in records {
        match record {
            Record::Word(w) => words.push(w.clone()),
            Record::Chunk(c) if c.words.is_empty() => return None,
            Record::Chunk(c) => words.extend(c.words.iter().cloned()),
        }
    }
    Some(words)
}

/// Chunks whose own nested words all share one timing.
///
/// The stream-wide check only samples the first few words, so a defective chunk further in
/// would otherwise reach the segmenter unnoticed.
fn degenerate_chunks(records: &[Record], policy: &ReadabilityPolicy) -> Vec<Warning> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Chunk(c) => Some(c),
            Record::Word(_) => None,
        })
        .filter_map(|chunk| match classify_word_input(&chunk.words, policy) {
            WordInputVerdict::Degenerate { start, end, count } => {
                Some(degenerate_warning(start, end, count))
            }
            _ => None,
        })
        .collect()
}

fn degenerate_warning(start: f64, end: f64, count: usize) -> Warning {
    warn!(
        start,
        end, count, "degenerate word timestamps; falling back to chunk-level captions"
    );
    Warning::DegenerateTimestamps { start, end, count }
}

fn chunk_segments(records: &[Record], policy: &ReadabilityPolicy) -> Result<Vec<Segment>> {
    let chunks: Vec<Chunk> = records.iter().map(Record::to_chunk).collect();
    segments_from_chunks(&chunks, policy)
}

/// Append `text` as one or more drafts spanning `start..end`.
fn split_chunk(text: &str, start: f64, end: f64, policy: &ReadabilityPolicy, out: &mut Vec<Segment>) {
    let duration = end - start;
    if duration <= policy.max_segment_duration && fits_block(text, policy) {
        out.push(Segment::new(start, end, text));
        return;
    }

    let total = char_len(text);
    let at = |offset: usize| start + duration * offset as f64 / total as f64;

    // Characters that fit in one piece without its interpolated span exceeding the ceiling.
    let budget = ((total as f64 * policy.max_segment_duration / duration).floor() as usize)
        .clamp(1, policy.max_block_chars.max(1));

    let mut piece = String::new();
    let mut piece_start = 0usize;
    let mut offset = 0usize;

    for token in text.split(' ') {
        if !piece.is_empty() {
            let candidate = format!("{piece} {token}");
            if char_len(&candidate) > budget || !fits_block(&candidate, policy) {
                let piece_end = piece_start + char_len(&piece);
                out.push(piece_segment(&piece, at(piece_start), at(piece_end), policy));
                piece.clear();
                piece_start = offset;
            }
        }

        if !piece.is_empty() {
            piece.push(' ');
        }
        piece.push_str(token);
        offset += char_len(token) + 1;
    }

    if !piece.is_empty() {
        out.push(piece_segment(&piece, at(piece_start), end, policy));
    }
}

fn piece_segment(text: &str, start: f64, end: f64, policy: &ReadabilityPolicy) -> Segment {
    Segment::new(start, end.min(start + policy.max_segment_duration), text)
}

fn unsplittable_warnings(segments: &[Segment], policy: &ReadabilityPolicy) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (segment_index, segment) in segments.iter().enumerate() {
        for token in unsplittable_tokens(&segment.text, policy) {
            warn!(
                segment_index,
                token,
                max_line_chars = policy.max_line_chars,
                "token longer than a display line; emitting it unbroken"
            );
            warnings.push(Warning::UnsplittableToken {
                segment_index,
                token: token.to_owned(),
            });
        }
    }
    warnings
}
