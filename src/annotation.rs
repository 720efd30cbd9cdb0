//! @ai:module:intent Define data structures for //@Load and //@NoCache annotations
//! @ai:module:layer domain
//! @ai:module:public_api Marker, Location, Occurrence, LoadDirective, LoadOptions
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// @ai:intent Represents a source code location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: Option<usize>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            line: 0,
            column: None,
        }
    }
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: PathBuf, line: usize) -> Self {
        Self {
            file,
            line,
            column: None,
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

/// @ai:intent The two annotation kinds recognized in source text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Load,
    NoCache,
}

impl Marker {
    /// @ai:intent Name as written after `//@`
    pub fn name(&self) -> &'static str {
        match self {
            Marker::Load => "Load",
            Marker::NoCache => "NoCache",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//@{}", self.name())
    }
}

/// @ai:intent One located annotation with its raw payload
/// @ai:invariant span covers the whole occurrence, marker included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub marker: Marker,
    /// Text between the parentheses (Load) or the line after the marker (NoCache).
    pub payload: String,
    /// Byte range of the full occurrence in the scanned text.
    pub span: Range<usize>,
    /// 1-based line of the marker.
    pub line: usize,
}

/// @ai:intent Recognized keys of a //@Load options object
/// @ai:post unknown keys are dropped during deserialization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadOptions {
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default)]
    pub posix: bool,
}

/// @ai:intent Parsed and validated arguments of one //@Load annotation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadDirective {
    pub label: String,
    pub globs: Vec<String>,
    pub options: LoadOptions,
}

impl LoadDirective {
    pub fn new(label: impl Into<String>, globs: Vec<String>) -> Self {
        Self {
            label: label.into(),
            globs,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_option_keys_are_ignored() {
        let options: LoadOptions =
            serde_json::from_str(r#"{"notAvalid": "key", "posix": true}"#).unwrap();
        assert_eq!(options.base, None);
        assert!(options.posix);
    }

    #[test]
    fn test_marker_display() {
        assert_eq!(Marker::Load.to_string(), "//@Load");
        assert_eq!(Marker::NoCache.to_string(), "//@NoCache");
    }
}
