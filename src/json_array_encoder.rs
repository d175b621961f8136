use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::line_splitter::LINE_SEPARATOR;
use crate::normalize::normalize_hyphens;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::word::Word;

/// A `SegmentEncoder` that writes captions as one JSON array, one caption per line.
///
/// Each element carries the same block number an SRT file would use, the display lines
/// already split, and (for word-level captions) the words the caption was built from:
///
/// ```json
/// [
/// {"index":1,"start":0.0,"end":1.2,"text":"hello","lines":["hello"],"words":[...]},
/// {"index":2,"start":1.2,"end":2.5,"text":"two\nlines","lines":["two","lines"]}
/// ]
/// ```
///
/// An empty caption set is written as `[]`.
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Captions written so far; also the index of the last one.
    written: usize,

    closed: bool,
}

/// Borrowed view of one caption as it appears in the array.
#[derive(Serialize)]
struct JsonCaption<'a> {
    index: usize,
    start: f64,
    end: f64,
    text: &'a str,
    lines: Vec<&'a str>,
    #[serde(skip_serializing_if = "<[Word]>::is_empty")]
    words: &'a [Word],
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            written: 0,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for JsonArrayEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        let text = normalize_hyphens(&seg.text);
        let caption = JsonCaption {
            index: self.written + 1,
            start: seg.start,
            end: seg.end,
            text: &text,
            lines: text.split(LINE_SEPARATOR).collect(),
            words: &seg.words,
        };

        // The array opens with the first caption, so an empty set can still close as `[]`.
        self.w
            .write_all(if self.written == 0 { b"[\n" } else { b",\n" })?;
        serde_json::to_writer(&mut self.w, &caption)?;
        self.written += 1;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w
            .write_all(if self.written == 0 { b"[]" } else { b"\n]" })?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
