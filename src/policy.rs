use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable prefix used by [`ReadabilityPolicy::from_env`].
pub const ENV_PREFIX: &str = "SUBTITLER_";

/// Every threshold the caption engine consults.
///
/// This struct represents *library-level configuration*, not CLI flags or environment variables
/// directly. Frontends map their inputs into a policy value (see [`PolicyOverrides`]) and pass it
/// explicitly into every call; nothing in the engine reads ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadabilityPolicy {
    /// Maximum characters on one displayed line.
    pub max_line_chars: usize,

    /// Maximum number of lines in one caption block.
    pub max_lines_per_block: usize,

    /// Hard ceiling on characters in one caption block. Defaults to `2 × max_line_chars`.
    pub max_block_chars: usize,

    /// Looser ceiling consulted only when deciding whether two valid captions may merge.
    pub max_block_chars_soft: usize,

    /// Reading speed bounds, in characters per second.
    pub min_cps: f64,
    pub max_cps: f64,

    /// Display duration bounds, in seconds.
    pub min_segment_duration: f64,
    pub max_segment_duration: f64,

    /// Trailing pad added after the last word of the final caption.
    pub display_buffer: f64,

    /// Inter-word silence above this is treated as a natural break point.
    pub gap_threshold: f64,

    pub sentence_terminators: Vec<char>,
    pub clause_terminators: Vec<char>,

    /// Conjunctions and prepositions preferred as line-break points.
    pub soft_boundary_words: Vec<String>,

    /// Captions shorter than this are candidates for merging with a neighbor.
    pub orphan_min_chars: usize,

    /// Average record duration at or above which input is treated as chunk-level.
    pub word_level_max_avg_duration: f64,

    /// Number of leading records inspected by word-level usability detection.
    pub detection_sample_size: usize,

    /// Captions trimmed below this duration by overlap repair are merged forward instead.
    pub min_overlap_repair_duration: f64,

    pub quality_weights: QualityWeights,

    /// Worst offenders kept per metric in a quality report.
    pub quality_worst_k: usize,
}

/// Relative weights of the four pass ratios folded into a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub duration: f64,
    pub cps: f64,
    pub overlap: f64,
    pub line_length: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            duration: 1.0,
            cps: 1.0,
            overlap: 1.0,
            line_length: 1.0,
        }
    }
}

const DEFAULT_SOFT_BOUNDARY_WORDS: &[&str] = &[
    "and", "but", "or", "nor", "so", "yet", "because", "although", "though", "while", "when",
    "where", "which", "who", "that", "if", "unless", "until", "then", "than", "to", "of", "in",
    "on", "at", "for", "with", "from", "about", "into", "as", "after", "before",
];

impl Default for ReadabilityPolicy {
    fn default() -> Self {
        let max_line_chars = 42;
        Self {
            max_line_chars,
            max_lines_per_block: 2,
            max_block_chars: 2 * max_line_chars,
            max_block_chars_soft: 90,
            min_cps: 12.0,
            max_cps: 17.0,
            min_segment_duration: 1.2,
            max_segment_duration: 4.0,
            display_buffer: 0.2,
            gap_threshold: 0.6,
            sentence_terminators: vec!['.', '!', '?'],
            clause_terminators: vec![',', ';', ':'],
            soft_boundary_words: DEFAULT_SOFT_BOUNDARY_WORDS
                .iter()
                .map(|w| (*w).to_owned())
                .collect(),
            orphan_min_chars: 15,
            word_level_max_avg_duration: 1.5,
            detection_sample_size: 10,
            min_overlap_repair_duration: 0.1,
            quality_weights: QualityWeights::default(),
            quality_worst_k: 5,
        }
    }
}

impl ReadabilityPolicy {
    /// Build a policy from the defaults overlaid with `SUBTITLER_*` environment variables.
    ///
    /// The environment is read once, here; the returned value is then passed explicitly.
    pub fn from_env() -> Result<Self> {
        let overrides = PolicyOverrides::from_env()?;
        let policy = overrides.apply(Self::default());
        policy.validate()?;
        Ok(policy)
    }

    /// Set the line length, keeping `max_block_chars` at twice the line length unless it was
    /// moved away from that relation.
    pub fn with_max_line_chars(mut self, max_line_chars: usize) -> Self {
        if self.max_block_chars == 2 * self.max_line_chars {
            self.max_block_chars = 2 * max_line_chars;
        }
        self.max_line_chars = max_line_chars;
        self
    }

    pub fn with_max_segment_duration(mut self, seconds: f64) -> Self {
        self.max_segment_duration = seconds;
        self
    }

    /// Reject policies no caption could ever satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.max_line_chars == 0 {
            return Err(Error::msg("max_line_chars must be greater than zero"));
        }
        if self.max_lines_per_block == 0 {
            return Err(Error::msg("max_lines_per_block must be greater than zero"));
        }
        if self.max_block_chars < self.max_line_chars {
            return Err(Error::msg(format!(
                "max_block_chars ({}) must be at least max_line_chars ({})",
                self.max_block_chars, self.max_line_chars
            )));
        }
        if !(self.max_segment_duration.is_finite() && self.max_segment_duration > 0.0) {
            return Err(Error::msg("max_segment_duration must be a positive number of seconds"));
        }
        if !(self.min_segment_duration >= 0.0
            && self.min_segment_duration <= self.max_segment_duration)
        {
            return Err(Error::msg(format!(
                "min_segment_duration ({}) must be between 0 and max_segment_duration ({})",
                self.min_segment_duration, self.max_segment_duration
            )));
        }
        if !(self.min_cps >= 0.0 && self.max_cps > 0.0 && self.min_cps <= self.max_cps) {
            return Err(Error::msg(format!(
                "cps bounds are inconsistent: min_cps={} max_cps={}",
                self.min_cps, self.max_cps
            )));
        }
        if !(self.display_buffer >= 0.0 && self.gap_threshold >= 0.0) {
            return Err(Error::msg("display_buffer and gap_threshold must not be negative"));
        }
        if self.detection_sample_size == 0 {
            return Err(Error::msg("detection_sample_size must be greater than zero"));
        }
        Ok(())
    }

    pub(crate) fn is_sentence_end(&self, text: &str) -> bool {
        ends_with_any(text, &self.sentence_terminators)
    }

    pub(crate) fn is_clause_end(&self, text: &str) -> bool {
        ends_with_any(text, &self.clause_terminators)
    }

    pub(crate) fn is_soft_boundary_word(&self, word: &str) -> bool {
        let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
        !bare.is_empty()
            && self
                .soft_boundary_words
                .iter()
                .any(|w| w.eq_ignore_ascii_case(bare))
    }
}

/// Whether `text` ends in one of `terminators`, looking through closing quotes and brackets.
fn ends_with_any(text: &str, terminators: &[char]) -> bool {
    text.trim_end()
        .trim_end_matches(['"', '\'', '\u{201d}', '\u{2019}', ')', ']'])
        .chars()
        .next_back()
        .is_some_and(|c| terminators.contains(&c))
}

/// A partial policy: every field is optional and only the ones present are applied.
///
/// This is the shape frontends deserialize from JSON files or build from the environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    pub max_line_chars: Option<usize>,
    pub max_lines_per_block: Option<usize>,
    pub max_block_chars: Option<usize>,
    pub max_block_chars_soft: Option<usize>,
    pub min_cps: Option<f64>,
    pub max_cps: Option<f64>,
    pub min_segment_duration: Option<f64>,
    pub max_segment_duration: Option<f64>,
    pub display_buffer: Option<f64>,
    pub gap_threshold: Option<f64>,
    pub sentence_terminators: Option<Vec<char>>,
    pub clause_terminators: Option<Vec<char>>,
    pub soft_boundary_words: Option<Vec<String>>,
    pub orphan_min_chars: Option<usize>,
    pub word_level_max_avg_duration: Option<f64>,
    pub detection_sample_size: Option<usize>,
    pub min_overlap_repair_duration: Option<f64>,
    pub quality_weights: Option<QualityWeights>,
    pub quality_worst_k: Option<usize>,
}

impl PolicyOverrides {
    /// Read the numeric `SUBTITLER_*` variables. Unset variables are left as `None`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`PolicyOverrides::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            max_line_chars: parse_var(&lookup, "MAX_LINE_CHARS")?,
            max_lines_per_block: parse_var(&lookup, "MAX_LINES_PER_BLOCK")?,
            max_block_chars: parse_var(&lookup, "MAX_BLOCK_CHARS")?,
            max_block_chars_soft: parse_var(&lookup, "MAX_BLOCK_CHARS_SOFT")?,
            min_cps: parse_var(&lookup, "MIN_CPS")?,
            max_cps: parse_var(&lookup, "MAX_CPS")?,
            min_segment_duration: parse_var(&lookup, "MIN_SEGMENT_DURATION")?,
            max_segment_duration: parse_var(&lookup, "MAX_SEGMENT_DURATION")?,
            display_buffer: parse_var(&lookup, "DISPLAY_BUFFER")?,
            gap_threshold: parse_var(&lookup, "GAP_THRESHOLD")?,
            orphan_min_chars: parse_var(&lookup, "ORPHAN_MIN_CHARS")?,
            ..Self::default()
        })
    }

    /// Overlay these overrides on `policy`.
    pub fn apply(self, mut policy: ReadabilityPolicy) -> ReadabilityPolicy {
        if let Some(v) = self.max_line_chars {
            policy = policy.with_max_line_chars(v);
        }
        if let Some(v) = self.max_lines_per_block {
            policy.max_lines_per_block = v;
        }
        if let Some(v) = self.max_block_chars {
            policy.max_block_chars = v;
        }
        if let Some(v) = self.max_block_chars_soft {
            policy.max_block_chars_soft = v;
        }
        if let Some(v) = self.min_cps {
            policy.min_cps = v;
        }
        if let Some(v) = self.max_cps {
            policy.max_cps = v;
        }
        if let Some(v) = self.min_segment_duration {
            policy.min_segment_duration = v;
        }
        if let Some(v) = self.max_segment_duration {
            policy.max_segment_duration = v;
        }
        if let Some(v) = self.display_buffer {
            policy.display_buffer = v;
        }
        if let Some(v) = self.gap_threshold {
            policy.gap_threshold = v;
        }
        if let Some(v) = self.sentence_terminators {
            policy.sentence_terminators = v;
        }
        if let Some(v) = self.clause_terminators {
            policy.clause_terminators = v;
        }
        if let Some(v) = self.soft_boundary_words {
            policy.soft_boundary_words = v;
        }
        if let Some(v) = self.orphan_min_chars {
            policy.orphan_min_chars = v;
        }
        if let Some(v) = self.word_level_max_avg_duration {
            policy.word_level_max_avg_duration = v;
        }
        if let Some(v) = self.detection_sample_size {
            policy.detection_sample_size = v;
        }
        if let Some(v) = self.min_overlap_repair_duration {
            policy.min_overlap_repair_duration = v;
        }
        if let Some(v) = self.quality_weights {
            policy.quality_weights = v;
        }
        if let Some(v) = self.quality_worst_k {
            policy.quality_worst_k = v;
        }
        policy
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, suffix: &str) -> Result<Option<T>>
where
    T: FromStr,
{
    let name = format!("{ENV_PREFIX}{suffix}");
    let Some(raw) = lookup(&name) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::msg(format!("invalid value for {name}: '{raw}'")))
}
