//! @ai:module:intent Validate //@Load and //@NoCache annotations without rewriting files
//! @ai:module:layer application
//! @ai:module:public_api check_text, check_file, check_paths, CheckConfig, CheckResult, CheckIssue, Severity
//! @ai:module:depends_on tokenizer, arguments, resolver, no_cache, adapter, error
//! @ai:module:stateless true

use crate::annotation::{Location, Marker};
use crate::adapter::discover;
use crate::arguments::parse_payload;
use crate::error::{Error, Result};
use crate::no_cache::classify;
use crate::resolver::{resolve_directive, GlobMatcher};
use crate::tokenizer::{column_of, find_empty_load, scan};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// @ai:intent Severity level for check issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// @ai:intent A single problem found in an annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub location: Location,
    pub suggestion: Option<String>,
}

/// @ai:intent Configuration for the checker
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Also expand globs, reporting labels that match nothing.
    pub resolve_globs: bool,
    pub extensions: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            resolve_globs: true,
            extensions: Vec::new(),
        }
    }
}

/// @ai:intent Result of checking files
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckResult {
    pub files_checked: usize,
    pub annotations_checked: usize,
    pub issues: Vec<CheckIssue>,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckResult {
    /// @ai:intent Check passed when no errors were found
    pub fn passed(&self) -> bool {
        self.errors == 0
    }

    /// @ai:intent Merge another check result into this one
    pub fn merge(&mut self, other: CheckResult) {
        self.files_checked += other.files_checked;
        self.annotations_checked += other.annotations_checked;
        self.issues.extend(other.issues);
        self.errors += other.errors;
        self.warnings += other.warnings;
    }

    fn error(&mut self, error: &Error, location: Location) {
        self.issues.push(CheckIssue {
            severity: Severity::Error,
            code: error.code().to_string(),
            message: error.to_string(),
            location,
            suggestion: suggestion_for(error),
        });
        self.errors += 1;
    }

    fn warning(&mut self, code: &str, message: String, location: Location) {
        self.issues.push(CheckIssue {
            severity: Severity::Warning,
            code: code.to_string(),
            message,
            location,
            suggestion: None,
        });
        self.warnings += 1;
    }
}

fn suggestion_for(error: &Error) -> Option<String> {
    let hint = match error {
        Error::MissingLabel { .. } => "Write //@Load(label, ['glob/**/*.js'])",
        Error::InvalidGlobs { .. } => "Wrap globs in an array, even a single one: ['a.js']",
        Error::InvalidOptions { .. } => "Options must be an object such as {'base': 'src'}",
        Error::DuplicateLabel { .. } => "Give every //@Load annotation of a file its own label",
        Error::EmptyArguments => "Add a label and a glob array inside //@Load()",
        Error::UnversionableTarget { .. } => "Prefix the target with ./ or give it an extension",
        _ => return None,
    };
    Some(hint.to_string())
}

/// @ai:intent Check every annotation of one text, collecting all issues instead of stopping at the first
/// @ai:effects fs:read
pub fn check_text(path: &Path, text: &str, matcher: Option<&dyn GlobMatcher>) -> CheckResult {
    let mut result = CheckResult {
        files_checked: 1,
        ..Default::default()
    };
    let mut labels = HashSet::new();
    let mut loads = 0;

    for occurrence in scan(text, Marker::Load) {
        loads += 1;
        let location = Location::new(path.to_path_buf(), occurrence.line)
            .with_column(column_of(text, occurrence.span.start));

        let directive = match parse_payload(&occurrence.payload) {
            Ok(directive) => directive,
            Err(e) => {
                result.error(&e, location);
                continue;
            }
        };

        if !labels.insert(directive.label.clone()) {
            let duplicate = Error::DuplicateLabel {
                label: directive.label.clone(),
            };
            result.error(&duplicate, location);
            continue;
        }

        if let Some(matcher) = matcher {
            match resolve_directive(matcher, &directive) {
                Ok(files) if files.is_empty() => result.warning(
                    "W001",
                    format!("Label `{}` matches no files", directive.label),
                    location,
                ),
                Ok(_) => {}
                Err(e) => result.error(&e, location),
            }
        }
    }

    if let Some(line) = find_empty_load(text) {
        loads += 1;
        result.error(&Error::EmptyArguments, Location::new(path.to_path_buf(), line));
    }

    let mut no_caches = 0;
    for occurrence in scan(text, Marker::NoCache) {
        no_caches += 1;
        if let Err(e) = classify(&occurrence.payload) {
            result.error(&e, Location::new(path.to_path_buf(), occurrence.line + 1));
        }
    }

    let markers = text.matches("//@NoCache()").count();
    if markers > no_caches {
        result.warning(
            "W002",
            format!(
                "{} //@NoCache() marker(s) without a target on the next line",
                markers - no_caches
            ),
            Location::new(path.to_path_buf(), 0),
        );
    }

    result.annotations_checked = loads + no_caches;
    result
}

/// @ai:intent Check a single file
/// @ai:effects fs:read
pub fn check_file(
    path: &Path,
    config: &CheckConfig,
    matcher: &dyn GlobMatcher,
) -> Result<CheckResult> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let matcher = config.resolve_globs.then_some(matcher);
    Ok(check_text(path, &text, matcher))
}

/// @ai:intent Check files and directories; unreadable files become issues
/// @ai:effects fs:read
pub fn check_paths(
    paths: &[PathBuf],
    config: &CheckConfig,
    matcher: &dyn GlobMatcher,
) -> CheckResult {
    let mut result = CheckResult::default();

    for path in paths {
        for file in discover(path, &config.extensions) {
            match check_file(&file, config, matcher) {
                Ok(file_result) => result.merge(file_result),
                Err(e) => {
                    result.files_checked += 1;
                    result.error(&e, Location::new(file, 0));
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FsGlobMatcher;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reports_every_problem() {
        let text = "\
//@Load(['a.js'])
//@Load(x, 'a.js')
//@Load(y, ['a.js'], {'base': })
//@Load(z, ['a.js'])
//@Load(z, ['b.js'])
//@NoCache()
bare
";
        let result = check_text(Path::new("a.js"), text, None);

        let codes: Vec<_> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["E001", "E002", "E003", "E004", "E006"]);
        assert_eq!(result.errors, 5);
        assert_eq!(result.annotations_checked, 6);
        assert_eq!(result.issues[4].location.line, 7);
        assert_eq!(result.issues[0].location.column, Some(1));
        assert!(!result.passed());
    }

    #[test]
    fn test_empty_arguments() {
        let result = check_text(Path::new("a.js"), "x\n//@Load()\n", None);
        assert_eq!(result.errors, 1);
        assert_eq!(result.issues[0].code, "E005");
        assert_eq!(result.issues[0].location.line, 2);
    }

    #[test]
    fn test_empty_forms_next_to_valid_directives() {
        let text = "//@Load(a, ['a.js'])\nx = [ //@Load( )\n//@Load()\n";
        let result = check_text(Path::new("a.js"), text, None);

        let codes: Vec<_> = result.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["E001", "E005"]);
        assert_eq!(result.issues[0].location.line, 2);
        assert_eq!(result.issues[0].location.column, Some(7));
        assert_eq!(result.issues[1].location.line, 3);
        assert_eq!(result.annotations_checked, 3);
    }

    #[test]
    fn test_no_cache_without_target() {
        let result = check_text(Path::new("a.js"), "//@NoCache()", None);
        assert_eq!(result.errors, 0);
        assert_eq!(result.warnings, 1);
        assert_eq!(result.issues[0].code, "W002");
    }

    #[test]
    fn test_check_directory_with_globs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.js"), "").unwrap();
        fs::write(
            dir.path().join("src/index.js"),
            "//@Load(lib, ['src/*.js'])\n//@Load(none, ['missing/*.js'])\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "//@Load()").unwrap();

        let config = CheckConfig {
            resolve_globs: true,
            extensions: vec!["js".to_string()],
        };
        let matcher = FsGlobMatcher::new(dir.path());
        let result = check_paths(&[dir.path().to_path_buf()], &config, &matcher);

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.errors, 0);
        assert_eq!(result.warnings, 1);
        assert_eq!(result.issues[0].code, "W001");
        assert!(result.passed());
    }
}
