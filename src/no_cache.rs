//! @ai:module:intent Append a cache-busting version to targets of //@NoCache annotations
//! @ai:module:layer application
//! @ai:module:public_api NoCacheTransform, VersionToken, TargetKind, classify, version_target
//! @ai:module:depends_on tokenizer, adapter, error
//! @ai:module:thread_safe true

use crate::adapter::TextTransform;
use crate::annotation::Marker;
use crate::error::{Error, Result};
use crate::tokenizer;
use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

static PROCESS_START: Lazy<VersionToken> =
    Lazy::new(|| VersionToken(Utc::now().timestamp_millis().to_string()));

/// @ai:intent Immutable version appended as `?v=<token>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionToken(String);

impl VersionToken {
    /// @ai:intent Token fixed at the first call in this process (UTC milliseconds)
    /// @ai:idempotent true
    pub fn process_start() -> Self {
        PROCESS_START.clone()
    }

    pub fn fixed(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// @ai:intent How a target is split before versioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Has an extension, split on `.`.
    Extension,
    /// Path without extension, split on `/`.
    Path,
}

impl TargetKind {
    pub fn separator(&self) -> char {
        match self {
            TargetKind::Extension => '.',
            TargetKind::Path => '/',
        }
    }
}

fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}

fn is_trailing_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\'' | '"' | '`' | ',' | ';' | ')')
}

/// @ai:intent Decide whether a target is versioned on its extension or its last path segment
/// @ai:example ("'a/b.template.html',") -> Extension
/// @ai:example ("'a/b'") -> Path
/// @ai:example ("bare") -> UnversionableTarget
/// @ai:effects pure
/// @ai:edge_cases trailing dot is not an extension, single segment without extension is an error
/// @ai:edge_cases a trailing `//` comment, `?query` or `#fragment` is ignored
pub fn classify(target: &str) -> Result<TargetKind> {
    let (code, _) = split_line_comment(target);
    let core = code[..path_end(code)].trim_end_matches(is_trailing_delimiter);
    let path_like = core.contains('/');

    let last_segment = match core.rfind('/') {
        Some(idx) => &core[idx + 1..],
        None => core,
    };
    let has_extension = last_segment
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx + 1 < last_segment.len());

    if has_extension {
        Ok(TargetKind::Extension)
    } else if path_like {
        Ok(TargetKind::Path)
    } else {
        Err(Error::UnversionableTarget {
            target: target.trim().to_string(),
        })
    }
}

/// @ai:intent Split a trailing `//` comment (outside quotes) off a target line
/// @ai:example ("'a/b.html', // c") -> ("'a/b.html',", " // c")
/// @ai:effects pure
fn split_line_comment(line: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (idx, ch) in line.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if matches!(ch, '\'' | '"' | '`') => quote = Some(ch),
            None if line[idx..].starts_with("//")
                && prev.map_or(true, |p| p.is_whitespace() || matches!(p, ',' | ';')) =>
            {
                let end = line[..idx].trim_end().len();
                return line.split_at(end);
            }
            None => {}
        }
        prev = Some(ch);
    }

    (line, "")
}

/// @ai:intent Offset where the path of a target ends and its `?query` or `#fragment` begins
/// @ai:effects pure
fn path_end(code: &str) -> usize {
    let core = code.trim_end_matches(is_trailing_delimiter);
    let segment_start = core.rfind('/').map_or(0, |idx| idx + 1);

    core[segment_start..]
        .find(['?', '#'])
        .map_or(code.len(), |idx| segment_start + idx)
}

/// @ai:intent Rewrite a target line with `?v=<token>` after its last segment
/// @ai:pre target is the line following a //@NoCache() marker
/// @ai:post leading whitespace is removed, everything else outside the versioned token is kept
/// @ai:effects pure
/// @ai:edge_cases an existing query gets `&v=<token>`, a trailing line comment is left untouched
pub fn version_target(target: &str, token: &VersionToken) -> Result<String> {
    let separator = classify(target)?.separator();
    let (code, comment) = split_line_comment(target);
    let (path, rest) = code.split_at(path_end(code));

    let mut segments: Vec<String> = path.split(separator).map(str::to_string).collect();

    let rest = match rest.strip_prefix('?') {
        Some(query) => {
            let query_end = query
                .find(|ch: char| ch == '#' || is_trailing_delimiter(ch))
                .unwrap_or(query.len());
            let joiner = if query_end == 0 { "" } else { "&" };
            format!("?{}{}v={}{}", &query[..query_end], joiner, token, &query[query_end..])
        }
        None => {
            if let Some(last) = segments.last_mut() {
                let token_end = last.find(|ch: char| !is_token_char(ch)).unwrap_or(last.len());
                last.insert_str(token_end, &format!("?v={}", token));
            }
            rest.to_string()
        }
    };
    if let Some(first) = segments.first_mut() {
        *first = first.trim_start().to_string();
    }

    Ok(format!("{}{}{}", segments.join(&separator.to_string()), rest, comment))
}

/// @ai:intent //@NoCache transform bound to one version token
#[derive(Debug, Clone)]
pub struct NoCacheTransform {
    token: VersionToken,
}

impl NoCacheTransform {
    pub fn new(token: VersionToken) -> Self {
        Self { token }
    }

    /// @ai:intent Drop each //@NoCache() marker and version the line after it
    /// @ai:post indentation before the marker is kept
    /// @ai:effects pure
    pub fn rewrite(&self, text: &str) -> Result<String> {
        tokenizer::replace(text, Marker::NoCache, |occurrence| {
            let versioned = version_target(&occurrence.payload, &self.token)?;
            tracing::debug!("line {}: versioned `{}`", occurrence.line + 1, versioned.trim());
            Ok(versioned)
        })
    }
}

impl Default for NoCacheTransform {
    fn default() -> Self {
        Self::new(VersionToken::process_start())
    }
}

impl TextTransform for NoCacheTransform {
    fn name(&self) -> &'static str {
        "no-cache"
    }

    fn apply(&self, text: &str) -> Result<String> {
        self.rewrite(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token() -> VersionToken {
        VersionToken::fixed("1234")
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("my-directive/my-directive.template.html").unwrap(), TargetKind::Extension);
        assert_eq!(classify("my-directive/my-directive").unwrap(), TargetKind::Path);
        assert_eq!(classify("'./views/main',").unwrap(), TargetKind::Path);
        assert_eq!(classify("app.min.js").unwrap(), TargetKind::Extension);
        assert_eq!(classify("some.dir/file").unwrap(), TargetKind::Path);
        assert_eq!(classify("'a/b?x=1.5' // c.js").unwrap(), TargetKind::Path);
    }

    #[test]
    fn test_classify_unversionable() {
        for target in ["my-directive", "trailing.", "'quoted'"] {
            let err = classify(target).unwrap_err();
            assert!(matches!(err, Error::UnversionableTarget { .. }), "{}", target);
            assert!(err.to_string().contains("./"));
        }
    }

    #[test]
    fn test_version_extension() {
        assert_eq!(
            version_target("my-directive/my-directive.template.html", &token()).unwrap(),
            "my-directive/my-directive.template.html?v=1234"
        );
    }

    #[test]
    fn test_version_path_without_extension() {
        assert_eq!(
            version_target("my-directive/my-directive", &token()).unwrap(),
            "my-directive/my-directive?v=1234"
        );
    }

    #[test]
    fn test_version_keeps_quotes_and_trims_indent() {
        assert_eq!(
            version_target("    templateUrl: 'views/main.html',", &token()).unwrap(),
            "templateUrl: 'views/main.html?v=1234',"
        );
        assert_eq!(
            version_target("  \"./views/main\"", &token()).unwrap(),
            "\"./views/main?v=1234\""
        );
    }

    #[test]
    fn test_version_ignores_trailing_comment() {
        assert_eq!(
            version_target("    templateUrl: 'a/b.html', // c", &token()).unwrap(),
            "templateUrl: 'a/b.html?v=1234', // c"
        );
        assert_eq!(
            version_target("  './views/main' // see views/", &token()).unwrap(),
            "'./views/main?v=1234' // see views/"
        );
        assert_eq!(
            version_target("'http://cdn/a/b.js',", &token()).unwrap(),
            "'http://cdn/a/b.js?v=1234',"
        );
    }

    #[test]
    fn test_version_extends_existing_query() {
        assert_eq!(
            version_target("'a/b.html?x=1'", &token()).unwrap(),
            "'a/b.html?x=1&v=1234'"
        );
        assert_eq!(
            version_target("'./views/main?x=1#top',", &token()).unwrap(),
            "'./views/main?x=1&v=1234#top',"
        );
        assert_eq!(
            version_target("'a/b.html#top'", &token()).unwrap(),
            "'a/b.html?v=1234#top'"
        );
    }

    #[test]
    fn test_comment_only_line_is_unversionable() {
        let err = version_target("  // nothing here", &token()).unwrap_err();
        assert!(matches!(err, Error::UnversionableTarget { .. }));
    }

    #[test]
    fn test_rewrite_removes_marker_line() {
        let text = "angular.directive('x', {\n    //@NoCache()\n    templateUrl: 'my-directive/my-directive.template.html',\n});";
        let output = NoCacheTransform::new(token()).rewrite(text).unwrap();
        assert_eq!(
            output,
            "angular.directive('x', {\n    templateUrl: 'my-directive/my-directive.template.html?v=1234',\n});"
        );
    }

    #[test]
    fn test_rewrite_unversionable_target() {
        let err = NoCacheTransform::new(token())
            .rewrite("//@NoCache()\nmy-directive")
            .unwrap_err();
        assert!(matches!(err, Error::UnversionableTarget { .. }));
    }

    #[test]
    fn test_process_start_token_is_stable() {
        assert_eq!(VersionToken::process_start(), VersionToken::process_start());
        assert!(!VersionToken::process_start().as_str().is_empty());
    }
}
