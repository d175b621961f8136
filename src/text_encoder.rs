use std::io::Write;

use crate::Result;
use crate::normalize::normalize_hyphens;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes a plain transcript.
///
/// Caption texts are joined with a single space and line breaks are dropped; no timing is
/// written.
pub struct TextEncoder<W: Write> {
    w: W,

    /// Whether the next caption is the first one (no separator before it).
    first: bool,

    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            first: true,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for TextEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        let text = normalize_hyphens(&seg.plain_text());
        if text.is_empty() {
            return Ok(());
        }

        if !self.first {
            self.w.write_all(b" ")?;
        }
        self.first = false;
        self.w.write_all(text.as_bytes())?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
