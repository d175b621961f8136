use std::io::Write;

use crate::Result;
use crate::normalize::normalize_hyphens;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::time_format::format_time_a;

/// A `SegmentEncoder` that writes numbered SubRip blocks.
///
/// Blocks are numbered from 1 in write order. An empty caption set produces empty output.
pub struct SrtEncoder<W: Write> {
    w: W,

    /// Number of the next block.
    next_index: usize,

    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        writeln!(&mut self.w, "{}", self.next_index)?;
        writeln!(
            &mut self.w,
            "{} --> {}",
            format_time_a(seg.start),
            format_time_a(seg.end)
        )?;
        writeln!(&mut self.w, "{}", normalize_hyphens(&seg.text))?;
        writeln!(&mut self.w)?;

        self.next_index += 1;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_numbers_blocks_from_one() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);

        enc.write_segment(&Segment::new(0.0, 5.4, "first"))?;
        enc.write_segment(&Segment::new(5.4, 7.25, "second\nblock"))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "1\n00:00:00,000 --> 00:00:05,400\nfirst\n\n\
             2\n00:00:05,400 --> 00:00:07,250\nsecond\nblock\n\n"
        );
        Ok(())
    }

    #[test]
    fn srt_close_without_segments_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;
        enc.close()?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn srt_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(&Segment::new(0.0, 1.0, "late")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
