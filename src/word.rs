use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A single recognized word with its timing, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A coarse recognizer chunk (usually a phrase or sentence), optionally carrying its words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }
}

/// One timestamped record handed over by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Word(Word),
    Chunk(Chunk),
}

impl Record {
    pub fn text(&self) -> &str {
        match self {
            Record::Word(w) => &w.text,
            Record::Chunk(c) => &c.text,
        }
    }

    pub fn start(&self) -> f64 {
        match self {
            Record::Word(w) => w.start,
            Record::Chunk(c) => c.start,
        }
    }

    pub fn end(&self) -> f64 {
        match self {
            Record::Word(w) => w.end,
            Record::Chunk(c) => c.end,
        }
    }

    /// View this record as a chunk, for chunk-level rendering.
    pub fn to_chunk(&self) -> Chunk {
        match self {
            Record::Word(w) => Chunk::new(w.text.clone(), w.start, w.end),
            Record::Chunk(c) => c.clone(),
        }
    }
}

/// Check the ordering contract for word input.
///
/// Words must be non-empty, finite, not inverted (`end >= start`), and sorted by start time.
/// Adjacent words may overlap slightly (recognizers do that); overlap is repaired later.
pub fn validate_words(words: &[Word]) -> Result<(), InputError> {
    validate_spans(words.iter().map(|w| (w.start, w.end)))
}

/// Same contract as [`validate_words`], for chunks.
pub fn validate_chunks(chunks: &[Chunk]) -> Result<(), InputError> {
    validate_spans(chunks.iter().map(|c| (c.start, c.end)))
}

fn validate_spans(spans: impl Iterator<Item = (f64, f64)>) -> Result<(), InputError> {
    let mut previous_start: Option<f64> = None;
    let mut seen = 0usize;

    for (index, (start, end)) in spans.enumerate() {
        seen += 1;
        if !start.is_finite() || !end.is_finite() {
            return Err(InputError::NonFinite { index });
        }
        if end < start {
            return Err(InputError::InvertedWord { index, start, end });
        }
        if let Some(previous_start) = previous_start {
            if start < previous_start {
                return Err(InputError::OutOfOrder {
                    index,
                    previous_start,
                    start,
                });
            }
        }
        previous_start = Some(start);
    }

    if seen == 0 {
        return Err(InputError::Empty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sorted_words_with_small_overlap() {
        let words = vec![
            Word::new("one", 0.0, 0.5),
            Word::new("two", 0.45, 0.9),
            Word::new("three", 0.9, 0.9),
        ];
        assert_eq!(validate_words(&words), Ok(()));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(validate_words(&[]), Err(InputError::Empty));
    }

    #[test]
    fn rejects_out_of_order_words() {
        let words = vec![Word::new("late", 2.0, 2.5), Word::new("early", 1.0, 1.5)];
        assert_eq!(
            validate_words(&words),
            Err(InputError::OutOfOrder {
                index: 1,
                previous_start: 2.0,
                start: 1.0
            })
        );
    }

    #[test]
    fn rejects_inverted_and_non_finite_words() {
        let inverted = vec![Word::new("back", 2.0, 1.0)];
        assert!(matches!(
            validate_words(&inverted),
            Err(InputError::InvertedWord { index: 0, .. })
        ));

        let nan = vec![Word::new("ok", 0.0, 1.0), Word::new("nan", f64::NAN, 1.0)];
        assert_eq!(validate_words(&nan), Err(InputError::NonFinite { index: 1 }));
    }

    #[test]
    fn word_records_convert_to_bare_chunks() {
        let record = Record::Word(Word::new("hi", 1.0, 1.4));
        let chunk = record.to_chunk();
        assert_eq!(chunk.text, "hi");
        assert!(chunk.words.is_empty());
        assert_eq!(record.end(), 1.4);
    }
}
