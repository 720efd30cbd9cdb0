//! @ai:module:intent Locate annotation occurrences in source text
//! @ai:module:layer application
//! @ai:module:public_api scan, replace, find_empty_load, line_of, column_of, Occurrences
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true

use crate::annotation::{Marker, Occurrence};
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

static LOAD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//@Load\(([^)\r\n]+)\)").expect("Invalid regex"));

static EMPTY_LOAD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//@Load\(\)").expect("Invalid regex"));

static NO_CACHE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//@NoCache\(\)\r?\n([^\r\n]*)").expect("Invalid regex"));

fn pattern_for(marker: Marker) -> &'static Regex {
    match marker {
        Marker::Load => &*LOAD_PATTERN,
        Marker::NoCache => &*NO_CACHE_PATTERN,
    }
}

/// @ai:intent Lazy left-to-right iterator over the occurrences of one marker
pub struct Occurrences<'t> {
    marker: Marker,
    text: &'t str,
    matches: CaptureMatches<'static, 't>,
    line: usize,
    line_offset: usize,
}

impl<'t> Iterator for Occurrences<'t> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let captures = self.matches.next()?;
        let whole = captures.get(0)?;
        let payload = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

        // Lines are counted incrementally since matches arrive in order.
        self.line += self.text[self.line_offset..whole.start()]
            .bytes()
            .filter(|b| *b == b'\n')
            .count();
        self.line_offset = whole.start();

        Some(Occurrence {
            marker: self.marker,
            payload: payload.to_string(),
            span: whole.range(),
            line: self.line,
        })
    }
}

/// @ai:intent Find every occurrence of a marker without modifying the text
/// @ai:post occurrences are yielded in increasing span order
/// @ai:effects pure
pub fn scan(text: &str, marker: Marker) -> Occurrences<'_> {
    Occurrences {
        marker,
        text,
        matches: pattern_for(marker).captures_iter(text),
        line: 1,
        line_offset: 0,
    }
}

/// @ai:intent Rewrite every occurrence of a marker through a fallible callback
/// @ai:pre callback returns the full replacement for the occurrence span
/// @ai:post text outside occurrence spans is copied unchanged
/// @ai:effects pure
pub fn replace<F>(text: &str, marker: Marker, mut replacement: F) -> Result<String>
where
    F: FnMut(&Occurrence) -> Result<String>,
{
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for occurrence in scan(text, marker) {
        output.push_str(&text[last..occurrence.span.start]);
        output.push_str(&replacement(&occurrence)?);
        last = occurrence.span.end;
    }

    output.push_str(&text[last..]);
    Ok(output)
}

/// @ai:intent Line of the first zero-argument form `//@Load()`, if any
/// @ai:effects pure
pub fn find_empty_load(text: &str) -> Option<usize> {
    EMPTY_LOAD_PATTERN
        .find(text)
        .map(|m| line_of(text, m.start()))
}

/// @ai:intent 1-based line number of a byte offset
/// @ai:effects pure
pub fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// @ai:intent 1-based column (in characters) of a byte offset
/// @ai:effects pure
pub fn column_of(text: &str, offset: usize) -> usize {
    let line_start = text[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    text[line_start..offset].chars().count() + 1
}
