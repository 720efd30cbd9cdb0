//! @ai:module:intent Resolve //@Load glob arrays to file lists
//! @ai:module:layer application
//! @ai:module:public_api GlobMatcher, FsGlobMatcher, ResolvedFiles, resolve_directive, resolve_registry
//! @ai:module:depends_on annotation, extractor, paths, error
//! @ai:module:thread_safe true

use crate::annotation::LoadDirective;
use crate::error::{Error, Result};
use crate::extractor::DirectiveRegistry;
use crate::paths::{relativize, to_posix};
use globset::{GlobBuilder, GlobMatcher as CompiledGlob};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Label to resolved paths, one entry per directive of a file.
pub type ResolvedFiles = HashMap<String, Vec<String>>;

/// @ai:intent Expands an ordered glob array into matched paths
/// @ai:post zero matches is an empty list, never an error
pub trait GlobMatcher: Send + Sync {
    /// Directory patterns and `base` options are resolved against.
    fn root(&self) -> &Path;

    fn resolve(&self, patterns: &[String]) -> Result<Vec<String>>;
}

/// @ai:intent Filesystem glob matcher with glob-array semantics
///
/// Patterns are applied in order. Each positive pattern appends its sorted
/// matches (skipping paths already collected), a `!pattern` removes matching
/// paths collected so far. Matches are reported in the pattern's own form.
/// Wildcards never match a name starting with `.`; such entries are only
/// reached through a pattern segment that itself starts with `.`.
#[derive(Debug, Clone)]
pub struct FsGlobMatcher {
    root: PathBuf,
}

impl FsGlobMatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// @ai:intent Matches of one positive pattern, sorted
    /// @ai:effects fs:read
    fn expand(&self, pattern: &str) -> Result<Vec<String>> {
        if !has_magic(pattern) {
            let exists = self.root.join(pattern).exists();
            return Ok(if exists { vec![pattern.to_string()] } else { Vec::new() });
        }

        let (prefix, rest) = split_static_prefix(pattern);
        let walk_root = self.root.join(prefix);
        if !walk_root.is_dir() {
            return Ok(Vec::new());
        }

        let glob = compile(pattern)?;
        let segments: Vec<&str> = rest.split('/').collect();
        let globstar = rest.contains("**");

        let mut walker = WalkDir::new(&walk_root).min_depth(1).follow_links(true);
        if !globstar {
            walker = walker.max_depth(segments.len());
        }

        let mut matched: Vec<String> = walker
            .into_iter()
            .filter_entry(|entry| {
                !is_hidden(entry) || dot_segment_allowed(&segments, globstar, entry.depth())
            })
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&walk_root).ok()?;
                let candidate = join_posix(prefix, &to_posix(relative));
                glob.is_match(&candidate).then_some(candidate)
            })
            .collect();

        matched.sort();
        Ok(matched)
    }
}

impl GlobMatcher for FsGlobMatcher {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, patterns: &[String]) -> Result<Vec<String>> {
        let mut files: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for pattern in patterns {
            if let Some(negated) = pattern.strip_prefix('!') {
                let glob = compile(negated)?;
                files.retain(|f| !glob.is_match(f));
                seen.retain(|f| !glob.is_match(f));
                continue;
            }

            for file in self.expand(pattern)? {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }

        Ok(files)
    }
}

fn compile(pattern: &str) -> Result<CompiledGlob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// @ai:intent Whether a dot-named entry at `depth` below the walk root can be matched
/// @ai:effects pure
/// @ai:edge_cases below a `**` the depth is unknown, so any explicit dot segment admits it
fn dot_segment_allowed(segments: &[&str], globstar: bool, depth: usize) -> bool {
    if globstar {
        return segments
            .iter()
            .any(|s| s.starts_with('.') && *s != "." && *s != "..");
    }

    depth
        .checked_sub(1)
        .and_then(|idx| segments.get(idx))
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn has_magic(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// @ai:intent Split a pattern into its literal leading directories and the rest
/// @ai:example ("src/app/**/*.js") -> ("src/app", "**/*.js")
/// @ai:example ("/abs/*.js") -> ("/", "*.js")
/// @ai:effects pure
fn split_static_prefix(pattern: &str) -> (&str, &str) {
    let mut end = 0;
    let mut offset = 0;

    for segment in pattern.split('/') {
        if has_magic(segment) {
            break;
        }
        offset += segment.len() + 1;
        end = offset;
    }

    let end = end.min(pattern.len());
    let prefix = pattern[..end].trim_end_matches('/');
    let rest = &pattern[end..];

    if prefix.is_empty() && pattern.starts_with('/') {
        ("/", rest)
    } else {
        (prefix, rest)
    }
}

fn join_posix(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, relative)
    } else {
        format!("{}/{}", prefix, relative)
    }
}

/// @ai:intent Resolve one directive, relativizing against `options.base` when it exists
/// @ai:effects fs:read
/// @ai:edge_cases missing base leaves paths untouched
pub fn resolve_directive<M: GlobMatcher + ?Sized>(
    matcher: &M,
    directive: &LoadDirective,
) -> Result<Vec<String>> {
    let files = matcher.resolve(&directive.globs)?;

    let Some(base) = &directive.options.base else {
        return Ok(files);
    };

    let base_dir = matcher.root().join(base);
    if !base_dir.exists() {
        tracing::debug!(
            "base `{}` for label `{}` does not exist, keeping paths as matched",
            base.display(),
            directive.label
        );
        return Ok(files);
    }

    Ok(files
        .iter()
        .map(|file| {
            relativize(
                &base_dir,
                &matcher.root().join(file),
                directive.options.posix,
            )
        })
        .collect())
}

/// @ai:intent Resolve every directive of a registry independently
/// @ai:effects fs:read
pub fn resolve_registry<M: GlobMatcher + ?Sized>(
    matcher: &M,
    registry: &DirectiveRegistry,
) -> Result<ResolvedFiles> {
    let mut resolved = ResolvedFiles::with_capacity(registry.len());

    for directive in registry.iter() {
        let files = resolve_directive(matcher, directive)?;
        tracing::debug!("label `{}` resolved to {} file(s)", directive.label, files.len());
        resolved.insert(directive.label.clone(), files);
    }

    Ok(resolved)
}
