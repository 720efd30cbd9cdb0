//! @ai:module:intent CLI entry point running annotate transforms over files
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on adapter, load, no_cache, checker, config, output

use annotate_core::{
    check_paths, discover, format_check_result, format_run_summary, AnnotateConfig, CheckConfig,
    FileAdapter, FsGlobMatcher, LoadTransform, NoCacheTransform, OutputFormat, RunSummary,
    SourceFile, VersionToken,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "annotate")]
#[command(author, version, about = "Expand //@Load and //@NoCache annotations in source files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace //@Load annotations with the files their globs match
    Load {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Append a cache-busting version to targets of //@NoCache annotations
    NoCache {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        write: WriteArgs,

        /// Version token to use instead of the process start time
        #[arg(long)]
        version_token: Option<String>,
    },

    /// Run Load, then NoCache, on every file
    Run {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        write: WriteArgs,

        /// Version token to use instead of the process start time
        #[arg(long)]
        version_token: Option<String>,
    },

    /// Validate annotations without rewriting anything
    Check {
        #[command(flatten)]
        common: CommonArgs,

        /// Skip glob expansion (no "matches no files" warnings)
        #[arg(long, default_value = "false")]
        no_resolve: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Files or directories to process
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Path to configuration file (defaults to ./annotate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory globs are resolved against
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Args)]
struct WriteArgs {
    /// Write results below this directory instead of rewriting files in place
    #[arg(long, short)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("annotate=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(common: &CommonArgs) -> Result<AnnotateConfig, ExitCode> {
    match AnnotateConfig::discover(common.config.as_deref()) {
        Ok(mut config) => {
            if let Some(root) = &common.root {
                config.load.root = root.clone();
            }
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(2))
        }
    }
}

fn version_token(config: &AnnotateConfig, flag: Option<String>) -> VersionToken {
    flag.map(VersionToken::fixed)
        .unwrap_or_else(|| config.version_token())
}

/// @ai:intent Read, transform and write every discovered file, reporting per-file failures
/// @ai:effects fs:read, fs:write
fn run_adapter(
    adapter: &FileAdapter,
    common: &CommonArgs,
    config: &AnnotateConfig,
    out_dir: Option<&Path>,
) -> ExitCode {
    let mut summary = RunSummary::new(adapter.name());
    let mut files = Vec::new();

    for input in &common.paths {
        let base = if input.is_dir() {
            input.clone()
        } else {
            input.parent().map(Path::to_path_buf).unwrap_or_default()
        };

        for path in discover(input, &config.files.extensions) {
            match SourceFile::read(&path) {
                Ok(file) => files.push(file.with_base(&base)),
                Err(e) => summary.record_failure(&path, &e),
            }
        }
    }

    tracing::info!("{}: {} file(s)", adapter.name(), files.len());
    let report = adapter.run(files);

    for failure in &report.failures {
        summary.record_failure(&failure.path, &failure.error);
    }

    for file in &report.files {
        match file.write(out_dir) {
            Ok(Some(written)) => summary.written.push(written),
            Ok(None) => {}
            Err(e) => summary.record_failure(&file.path, &e),
        }
    }

    println!("{}", format_run_summary(&summary, common.format.into()));

    if summary.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load { common, write } => {
            let config = match load_config(&common) {
                Ok(config) => config,
                Err(code) => return code,
            };

            let adapter = FileAdapter::new(LoadTransform::new(&config.load.root));
            run_adapter(&adapter, &common, &config, write.out_dir.as_deref())
        }

        Commands::NoCache {
            common,
            write,
            version_token: flag,
        } => {
            let config = match load_config(&common) {
                Ok(config) => config,
                Err(code) => return code,
            };

            let token = version_token(&config, flag);
            tracing::info!("version token {}", token);
            let adapter = FileAdapter::new(NoCacheTransform::new(token));
            run_adapter(&adapter, &common, &config, write.out_dir.as_deref())
        }

        Commands::Run {
            common,
            write,
            version_token: flag,
        } => {
            let config = match load_config(&common) {
                Ok(config) => config,
                Err(code) => return code,
            };

            let token = version_token(&config, flag);
            tracing::info!("version token {}", token);
            let adapter = FileAdapter::new(LoadTransform::new(&config.load.root))
                .then(NoCacheTransform::new(token));
            run_adapter(&adapter, &common, &config, write.out_dir.as_deref())
        }

        Commands::Check { common, no_resolve } => {
            let config = match load_config(&common) {
                Ok(config) => config,
                Err(code) => return code,
            };

            let check_config = CheckConfig {
                resolve_globs: !no_resolve,
                extensions: config.files.extensions.clone(),
            };
            let matcher = FsGlobMatcher::new(&config.load.root);
            let result = check_paths(&common.paths, &check_config, &matcher);

            println!("{}", format_check_result(&result, common.format.into()));

            if result.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
    }
}
