use serde::Serialize;

use crate::line_splitter::LINE_SEPARATOR;
use crate::word::Word;

/// One displayed caption block.
///
/// `text` is already line-broken; lines are joined by [`LINE_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// The words this caption was built from. Empty for chunk-level captions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Number of characters with line breaks counted as the spaces they replaced.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Characters per second. Zero-length captions are measured over one millisecond.
    pub fn cps(&self) -> f64 {
        self.char_len() as f64 / self.duration().max(MIN_MEASURED_DURATION)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split(LINE_SEPARATOR)
    }

    /// The caption text on a single line.
    pub fn plain_text(&self) -> String {
        self.text.replace(LINE_SEPARATOR, " ")
    }
}

const MIN_MEASURED_DURATION: f64 = 0.001;
