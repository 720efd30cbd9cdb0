//! @ai:module:intent Expand //@Load annotations into literal file arrays
//! @ai:module:layer application
//! @ai:module:public_api LoadTransform, substitute, render_file_list
//! @ai:module:depends_on extractor, resolver, tokenizer, arguments, adapter
//! @ai:module:thread_safe true

use crate::adapter::TextTransform;
use crate::annotation::Marker;
use crate::arguments::parse_payload;
use crate::error::Result;
use crate::extractor::extract_directives;
use crate::resolver::{resolve_registry, FsGlobMatcher, GlobMatcher, ResolvedFiles};
use crate::tokenizer;
use std::path::PathBuf;

/// @ai:intent Two-pass //@Load expansion: collect and resolve, then substitute
pub struct LoadTransform<M = FsGlobMatcher> {
    matcher: M,
}

impl LoadTransform<FsGlobMatcher> {
    /// @ai:intent Expand globs against the filesystem below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            matcher: FsGlobMatcher::new(root),
        }
    }
}

impl<M: GlobMatcher> LoadTransform<M> {
    pub fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// @ai:intent Rewrite every //@Load annotation of a file
    /// @ai:pre text is the full content of one file
    /// @ai:post text without //@Load annotations is returned unchanged
    /// @ai:effects fs:read
    pub fn expand(&self, text: &str) -> Result<String> {
        let registry = extract_directives(text)?;
        if registry.is_empty() {
            return Ok(text.to_string());
        }

        let resolved = resolve_registry(&self.matcher, &registry)?;
        substitute(text, &resolved)
    }
}

impl<M: GlobMatcher> TextTransform for LoadTransform<M> {
    fn name(&self) -> &'static str {
        "load"
    }

    fn apply(&self, text: &str) -> Result<String> {
        self.expand(text)
    }
}

/// @ai:intent Replace each //@Load occurrence with its label's file list
/// @ai:pre every label in text was resolved into `resolved`
/// @ai:effects pure
pub fn substitute(text: &str, resolved: &ResolvedFiles) -> Result<String> {
    tokenizer::replace(text, Marker::Load, |occurrence| {
        let directive = parse_payload(&occurrence.payload)?;
        let files = resolved
            .get(&directive.label)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(render_file_list(files))
    })
}

/// @ai:intent Render paths as double-quoted entries joined by `,` and a newline
/// @ai:example ([]) -> "\"\""
/// @ai:example (["a.js", "b.js"]) -> "\"a.js\",\n\"b.js\""
/// @ai:effects pure
pub fn render_file_list(files: &[String]) -> String {
    if files.is_empty() {
        return "\"\"".to_string();
    }

    files
        .iter()
        .map(|file| quote(file))
        .collect::<Vec<_>>()
        .join(",\n")
}

// JSON string escaping keeps Windows separators and quotes valid inside the literal.
fn quote(file: &str) -> String {
    serde_json::to_string(file).unwrap_or_else(|_| format!("\"{}\"", file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/load.js"), "").unwrap();
        fs::write(dir.path().join("lib/no-cache.js"), "").unwrap();
        dir
    }

    /// Matcher returning canned results, for tests independent of the filesystem.
    struct StaticMatcher(Vec<String>);

    impl GlobMatcher for StaticMatcher {
        fn root(&self) -> &Path {
            Path::new(".")
        }

        fn resolve(&self, _patterns: &[String]) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_render_file_list() {
        assert_eq!(render_file_list(&[]), "\"\"");
        assert_eq!(
            render_file_list(&["a.js".to_string(), "b.js".to_string()]),
            "\"a.js\",\n\"b.js\""
        );
    }

    #[test]
    fn test_replace_without_options() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let output = transform.expand("//@Load(label, ['lib/load.js'])").unwrap();
        assert_eq!(output, "\"lib/load.js\"");
    }

    #[test]
    fn test_replace_with_base() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let output = transform
            .expand("//@Load(label, ['lib/load.js'], {'base': 'lib'})")
            .unwrap();
        assert_eq!(output, "\"load.js\"");
    }

    #[test]
    fn test_unknown_options_are_ignored() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let output = transform
            .expand("//@Load(label, ['lib/load.js'], {'notAvalid': 'key'})")
            .unwrap();
        assert_eq!(output, "\"lib/load.js\"");
    }

    #[test]
    fn test_unfound_base() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let output = transform
            .expand("//@Load(label, ['lib/load.js'], {'base': 'not-existent'})")
            .unwrap();
        assert_eq!(output, "\"lib/load.js\"");
    }

    #[test]
    fn test_empty_globs_give_empty_string() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let output = transform
            .expand("var x = [\n//@Load(label, ['not/existent*.js'], {'base': '.'})\n];")
            .unwrap();
        assert_eq!(output, "var x = [\n\"\"\n];");
    }

    #[test]
    fn test_multiple_files_and_labels() {
        let dir = fixture();
        let transform = LoadTransform::new(dir.path());

        let text = "a = [\n//@Load(all, ['lib/*.js'])\n];\nb = [//@Load(one, ['lib/no-cache.js'])];";
        let output = transform.expand(text).unwrap();
        assert_eq!(
            output,
            "a = [\n\"lib/load.js\",\n\"lib/no-cache.js\"\n];\nb = [\"lib/no-cache.js\"];"
        );
    }

    #[test]
    fn test_plain_file_is_unchanged() {
        let transform = LoadTransform::with_matcher(StaticMatcher(vec!["x.js".to_string()]));
        let text = "console.log(\"Hey! I am a plain JavaScript file!\");";
        assert_eq!(transform.expand(text).unwrap(), text);
    }

    #[test]
    fn test_rerun_on_output_is_noop() {
        let transform = LoadTransform::with_matcher(StaticMatcher(vec![
            "a.js".to_string(),
            "b.js".to_string(),
        ]));

        let once = transform.expand("var x = [\n//@Load(label, ['*.js'])\n];").unwrap();
        let twice = transform.expand(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_labels_fail_before_substitution() {
        let transform = LoadTransform::with_matcher(StaticMatcher(Vec::new()));
        let err = transform
            .expand("//@Load(x, ['a.js'])\n//@Load(x, ['other/*.css'], {'base': 'b'})")
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { .. }));
    }

    #[test]
    fn test_empty_form_is_never_left_in_output() {
        let transform = LoadTransform::with_matcher(StaticMatcher(vec!["Cargo.toml".to_string()]));

        let err = transform.expand("//@Load(a, ['*.toml'])\n//@Load()").unwrap_err();
        assert!(matches!(err, Error::EmptyArguments));

        let err = transform.expand("//@Load(a, ['*.toml'])\n//@Load( )").unwrap_err();
        assert!(matches!(err, Error::MissingLabel { .. }));
    }
}
