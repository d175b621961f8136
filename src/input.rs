//! Boundary parsing for recognizer output.
//!
//! Recognizers hand us loosely-shaped JSON. Everything is validated and converted into
//! [`Record`] values here so the engine itself only ever sees typed, well-formed data.
//!
//! Accepted shapes:
//! - a top-level array of records
//! - an object with a `chunks`, `segments`, or `words` array
//!
//! Each record carries `text` plus either `start`/`end` fields or a `timestamp: [start, end]`
//! pair. A record with a nested `words` array is a chunk; inside `chunks`/`segments` every
//! record is a chunk.

use std::io::Read;

use serde::Deserialize;

use crate::word::{Chunk, Record, Word};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawRecord>),
    Object(RawContainer),
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    #[serde(default)]
    chunks: Option<Vec<RawRecord>>,
    #[serde(default)]
    segments: Option<Vec<RawRecord>>,
    #[serde(default)]
    words: Option<Vec<RawRecord>>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "word")]
    word_text: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    timestamp: Option<(Option<f64>, Option<f64>)>,
    #[serde(default)]
    words: Option<Vec<RawRecord>>,
}

/// Parse recognizer JSON from any byte stream.
pub fn read_records<R: Read>(r: R) -> Result<Vec<Record>> {
    let doc: RawDocument = serde_json::from_reader(r)?;
    records_from_document(doc)
}

/// Parse recognizer JSON from a string.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let doc: RawDocument = serde_json::from_str(json)?;
    records_from_document(doc)
}

fn records_from_document(doc: RawDocument) -> Result<Vec<Record>> {
    match doc {
        RawDocument::List(raw) => raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                if r.words.is_some() {
                    r.into_chunk(i).map(Record::Chunk)
                } else {
                    r.into_word(i).map(Record::Word)
                }
            })
            .collect(),
        RawDocument::Object(container) => {
            if let Some(chunks) = container.chunks.or(container.segments) {
                chunks
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| r.into_chunk(i).map(Record::Chunk))
                    .collect()
            } else if let Some(words) = container.words {
                words
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| r.into_word(i).map(Record::Word))
                    .collect()
            } else {
                Err(Error::msg(
                    "recognizer output must be an array or contain `chunks`, `segments`, or `words`",
                ))
            }
        }
    }
}

impl RawRecord {
    fn span(&self, index: usize) -> Result<(f64, f64)> {
        let (start, end) = match self.timestamp {
            Some((start, end)) => (start.or(self.start), end.or(self.end)),
            None => (self.start, self.end),
        };

        let start =
            start.ok_or_else(|| Error::msg(format!("record {index} has no start time")))?;
        // Recognizers leave the final end open (`null`) when the audio stops mid-word.
        let end = end.unwrap_or(start);
        Ok((start, end))
    }

    fn take_text(&mut self) -> String {
        self.text
            .take()
            .or_else(|| self.word_text.take())
            .unwrap_or_default()
    }

    fn into_word(mut self, index: usize) -> Result<Word> {
        let (start, end) = self.span(index)?;
        Ok(Word::new(self.take_text(), start, end))
    }

    fn into_chunk(mut self, index: usize) -> Result<Chunk> {
        let (start, end) = self.span(index)?;
        let text = self.take_text();
        let words = self
            .words
            .take()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, w)| w.into_word(i))
            .collect::<Result<Vec<_>>>()?;

        // Some recognizers omit the chunk text and only fill in its words.
        let text = if text.trim().is_empty() {
            words
                .iter()
                .map(|w| w.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text
        };

        Ok(Chunk::new(text, start, end).with_words(words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_word_array() -> anyhow::Result<()> {
        let records = parse_records(
            r#"[{"text":" Hello","start":0.0,"end":0.4},{"text":" world","start":0.5,"end":0.9}]"#,
        )?;
        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], Record::Word(w) if w.text == " Hello"));
        Ok(())
    }

    #[test]
    fn parses_chunks_with_timestamp_pairs_and_open_end() -> anyhow::Result<()> {
        let records = parse_records(
            r#"{"text":"Hi there. Bye.","chunks":[
                {"text":"Hi there.","timestamp":[0.0,1.5]},
                {"text":"Bye.","timestamp":[1.6,null]}
            ]}"#,
        )?;
        assert_eq!(records.len(), 2);
        match &records[1] {
            Record::Chunk(c) => {
                assert_eq!(c.start, 1.6);
                assert_eq!(c.end, 1.6);
            }
            other => anyhow::bail!("expected chunk, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn nested_words_make_a_chunk_and_fill_missing_text() -> anyhow::Result<()> {
        let records = parse_records(
            r#"[{"start":0.0,"end":1.0,"words":[
                {"word":"one","start":0.0,"end":0.4},
                {"word":"two","start":0.5,"end":1.0}
            ]}]"#,
        )?;
        match &records[0] {
            Record::Chunk(c) => {
                assert_eq!(c.text, "one two");
                assert_eq!(c.words.len(), 2);
            }
            other => anyhow::bail!("expected chunk, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn missing_start_is_an_error() {
        let err = parse_records(r#"[{"text":"x","end":1.0}]"#).unwrap_err();
        assert!(err.to_string().contains("no start time"));
    }

    #[test]
    fn unknown_container_is_an_error() {
        assert!(parse_records(r#"{"foo":[]}"#).is_err());
    }
}
