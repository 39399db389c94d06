//! apidoc: extract API documentation from annotated source comments.
//!
//! Two modes:
//!
//! - **stdin mode**: `apidoc < routes.js`
//! - **file mode**: `apidoc -o api.json -c apidoc.json src/ lib/**/*.ts`
//!
//! Both write the document model as JSON and summarize diagnostics on stderr.

use anyhow::{Context, Result};
use apidoc_core::{Diagnostics, Options, PackageInfo, Severity, SourceFile, VersionedEndpoint};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "apidoc",
    about = "Extract versioned API documentation from annotated source comments"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Package configuration. Defaults to ./apidoc.json when present.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Include blocks marked @apiPrivate
    #[arg(long)]
    private: bool,

    /// Do not collect @apiDefine blocks or expand @apiUse
    #[arg(long)]
    no_definitions: bool,

    /// Treat unknown tags as errors and exit non-zero on any error
    #[arg(long)]
    strict: bool,

    /// Debug logging on stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            definitions: !self.no_definitions,
            include_private: self.private,
            strict_tags: self.strict,
        }
    }
}

/// The JSON document written by the CLI.
#[derive(Serialize)]
struct Output<'a> {
    project: &'a PackageInfo,
    endpoints: &'a [VersionedEndpoint],
    diagnostics: &'a Diagnostics,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let package = load_package(cli.config.as_deref())?;
    let sources = if cli.files.is_empty() {
        read_stdin()?
    } else {
        read_sources(&expand_globs(&cli.files)?)?
    };
    tracing::debug!(files = sources.len(), "read sources");

    let model = apidoc_core::run(&sources, package.clone(), cli.options())
        .context("invalid package configuration")?;

    let output = Output {
        project: &package,
        endpoints: &model.endpoints,
        diagnostics: &model.diagnostics,
    };
    let json = serde_json::to_string_pretty(&output).context("failed to serialize document model")?;
    match cli.output {
        Some(ref path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
            }
            fs::write(path, json + "\n").with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{}", json),
    }

    summarize(&model.diagnostics);
    if cli.strict && model.has_errors() {
        anyhow::bail!("errors were reported and --strict is set");
    }
    Ok(())
}

/// stderr only; stdout carries the JSON in stdin mode.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Explicit `--config` must exist; `./apidoc.json` is optional.
fn load_package(config: Option<&Path>) -> Result<PackageInfo> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from("apidoc.json");
            if !fallback.is_file() {
                return Ok(PackageInfo::default());
            }
            fallback
        }
    };
    let text = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_stdin() -> Result<Vec<SourceFile>> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(vec![SourceFile::new("stdin", input)])
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok(SourceFile::new(path.to_string_lossy(), text))
        })
        .collect()
}

/// File extensions recognized as source files when scanning directories.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "js", "mjs", "cjs", "jsx", "ts", "tsx", "java", "c", "cc", "cpp", "h", "hpp", "cs", "go", "php", "rs",
    "swift", "kt", "scala", "dart", "py", "rb", "pl", "pm", "sh", "bash",
];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned for supported file types (non-recursive).
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            files.extend(
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|p| p.is_file() && is_supported(p)),
            );
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!(%pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn summarize(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warnings = diagnostics.len() - errors;
    eprintln!("apidoc: {} error(s), {} warning(s)", errors, warnings);
}
