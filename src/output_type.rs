use std::path::Path;
use std::str::FromStr;

/// The supported output formats for rendered captions.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` allows this enum to be used directly as a CLI flag.
/// - Each variant maps to a concrete `SegmentEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Numbered SubRip blocks with comma-decimal timestamps.
    #[default]
    Srt,

    /// WebVTT with dot-decimal timestamps and a `WEBVTT` header.
    Vtt,

    /// Plain transcript, captions joined by single spaces.
    Txt,

    /// Captions as a JSON array.
    Json,
}

impl OutputType {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Srt => "srt",
            OutputType::Vtt => "vtt",
            OutputType::Txt => "txt",
            OutputType::Json => "json",
        }
    }

    /// Guess the output type from a destination path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(OutputType::Srt),
            "vtt" | "webvtt" => Ok(OutputType::Vtt),
            "txt" | "text" => Ok(OutputType::Txt),
            "json" => Ok(OutputType::Json),
            other => Err(crate::Error::msg(format!("unknown output type '{other}'"))),
        }
    }
}
