use crate::Result;
use crate::segments::Segment;

/// Streaming sink for finished captions.
///
/// Encoders may write headers lazily. `close` is idempotent and must be called once the last
/// caption is written; writing after `close` is an error.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
