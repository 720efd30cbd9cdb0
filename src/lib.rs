//! @ai:module:intent Expand //@Load and //@NoCache source annotations as a build step
//! @ai:module:layer infrastructure
//! @ai:module:public_api adapter, annotation, arguments, checker, config, error, extractor, load, no_cache, output, paths, resolver, tokenizer
//! @ai:module:stateless true
//!
//! # annotate
//!
//! Rewrites comment annotations in source files:
//!
//! * `//@Load(label, ['src/**/*.js'], {'base': 'src'})` becomes the quoted,
//!   comma-newline separated list of files matched by the globs.
//! * `//@NoCache()` followed by a line holding a path appends `?v=<token>` to
//!   that path and drops the marker line.
//!
//! ## Example
//!
//! ```rust,no_run
//! use annotate_core::{FileAdapter, LoadTransform, NoCacheTransform, SourceFile, VersionToken};
//! use std::path::Path;
//!
//! let adapter = FileAdapter::new(LoadTransform::new("."))
//!     .then(NoCacheTransform::new(VersionToken::process_start()));
//!
//! let file = SourceFile::read(Path::new("src/index.js")).unwrap();
//! let file = adapter.process(file).unwrap();
//! file.write(Some(Path::new("dist"))).unwrap();
//! ```

pub mod adapter;
pub mod annotation;
pub mod arguments;
pub mod checker;
pub mod config;
pub mod error;
pub mod extractor;
pub mod load;
pub mod no_cache;
pub mod output;
pub mod paths;
pub mod resolver;
pub mod tokenizer;

pub use adapter::{
    discover, Contents, FileAdapter, FileFailure, PipelineFile, RunReport, RunSummary,
    SourceFile, TextTransform,
};
pub use annotation::{LoadDirective, LoadOptions, Location, Marker, Occurrence};
pub use arguments::parse_payload;
pub use checker::{check_file, check_paths, check_text, CheckConfig, CheckIssue, CheckResult, Severity};
pub use config::AnnotateConfig;
pub use error::{Error, Result};
pub use extractor::{extract_directives, DirectiveRegistry};
pub use load::LoadTransform;
pub use no_cache::{NoCacheTransform, TargetKind, VersionToken};
pub use output::{format_check_result, format_run_summary, OutputFormat};
pub use resolver::{FsGlobMatcher, GlobMatcher, ResolvedFiles};
