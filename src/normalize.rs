//! Text cleanup applied when assembling caption text and again before emission.

use crate::line_splitter::LINE_SEPARATOR;

/// Characters that recognizers sometimes emit as their own "word" and that belong glued to the
/// word before them.
const TRAILING_PUNCTUATION: &[char] = &[
    ',', '.', '!', '?', ';', ':', ')', ']', '}', '%', '"', '\u{2026}', '\u{201d}', '\u{2019}',
];

/// Join recognizer word texts into one line of caption text.
///
/// Recognizer tokens often carry leading spaces (`" Hello"`); we trim each, drop empty ones,
/// attach standalone trailing punctuation to the previous word, and normalize hyphens.
pub fn join_word_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();

    for text in texts {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let glue = !out.is_empty() && text.chars().all(|c| TRAILING_PUNCTUATION.contains(&c));
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(text);
    }

    normalize_hyphens(&out)
}

/// Remove spurious whitespace around intra-word hyphens, line by line.
///
/// `"well -known"` and `"well- known"` become `"well-known"`. A hyphen with whitespace on both
/// sides is a spoken dash and stays as it is. Runs of whitespace within a line collapse to one
/// space; line separators are preserved.
pub fn normalize_hyphens(text: &str) -> String {
    text.split(LINE_SEPARATOR)
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev: Option<&str> = None;

    for token in line.split_whitespace() {
        let attach = prev.is_some_and(|p| dangling_hyphen_end(p) && starts_with_word_char(token))
            || prev.is_some_and(|p| ends_with_word_char(p) && dangling_hyphen_start(token));

        if prev.is_some() && !attach {
            out.push(' ');
        }
        out.push_str(token);
        prev = Some(token);
    }

    out
}

/// `"well-"`: ends in a single hyphen preceded by a word character.
fn dangling_hyphen_end(token: &str) -> bool {
    let mut rev = token.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(char::is_alphanumeric)
}

/// `"-known"`: starts with a single hyphen followed by a letter (`"-5"` is a number).
fn dangling_hyphen_start(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_alphabetic)
}

fn starts_with_word_char(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphanumeric)
}

fn ends_with_word_char(token: &str) -> bool {
    token.chars().next_back().is_some_and(char::is_alphanumeric)
}
