//! `subtitler` turns timestamped speech-recognition output into readable subtitles.
//!
//! This crate provides:
//! - Word-to-caption segmentation under a configurable readability policy
//! - Balanced line breaking for caption blocks
//! - Chunk-level fallbacks for coarse or corrupted word timings
//! - Pluggable output encoders (SRT, WebVTT, plain text, JSON)
//! - Quality diagnostics for finished caption sets
//!
//! Every component is a pure function over in-memory values: no global state, no I/O beyond the
//! writer you hand to an encoder. Configuration is an explicit [`ReadabilityPolicy`].

// High-level API (most consumers should start here).
pub mod captions;
pub mod input;
pub mod policy;

// Core value types.
pub mod segments;
pub mod word;

// The engine.
pub mod detect;
pub mod line_splitter;
pub mod normalize;
pub mod segmenter;

// Diagnostics.
pub mod quality;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod segment_encoder;
pub mod time_format;

// Output encoders that serialize captions into various formats.
pub mod json_array_encoder;
pub mod srt_encoder;
pub mod text_encoder;
pub mod vtt_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use captions::{
    CaptionSet, Granularity, Warning, build_caption_set, format_records, render,
    segments_from_chunks, write_captions,
};
pub use detect::{WordInputVerdict, classify_word_input};
pub use error::{Error, InputError, Result};
pub use line_splitter::{LINE_SEPARATOR, split_lines};
pub use output_type::OutputType;
pub use policy::{PolicyOverrides, QualityWeights, ReadabilityPolicy};
pub use quality::{QualityReport, compute_quality};
pub use segmenter::segment;
pub use segments::Segment;
pub use time_format::{format_time_a, format_time_b};
pub use word::{Chunk, Record, Word};
