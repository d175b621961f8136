//! Subtitle timestamp rendering.
//!
//! Both caption syntaxes share the `HH:MM:SS?mmm` layout and only differ in the separator
//! placed before the milliseconds.

/// Format seconds as a comma-decimal timestamp (`HH:MM:SS,mmm`), as used by SRT.
pub fn format_time_a(seconds: f64) -> String {
    format_with_separator(seconds, ',')
}

/// Format seconds as a dot-decimal timestamp (`HH:MM:SS.mmm`), as used by WebVTT.
pub fn format_time_b(seconds: f64) -> String {
    format_with_separator(seconds, '.')
}

/// Rounding policy:
/// - We round to the nearest millisecond to reduce drift from binary floating point.
/// - Negative and non-finite offsets render as zero.
/// - Hours are not capped; they widen past two digits when needed.
fn format_with_separator(seconds: f64, separator: char) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02}{separator}{ms:03}")
}
