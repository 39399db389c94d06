//! End-to-end run: sources in, document model out.

use crate::assemble::{self, ParsedFile, SourceFile};
use crate::context::{Context, Options, PackageInfo};
use crate::diagnostics::Diagnostics;
use crate::error::ConfigError;
use crate::filter;
use crate::grouper;
use crate::model::DocumentModel;
use crate::registry::Registry;
use crate::worker;
use rayon::prelude::*;

/// Scan and assemble all files in parallel. Results keep input order.
pub fn parse_sources(
    sources: &[SourceFile],
    registry: &Registry,
    ctx: &Context,
) -> (Vec<ParsedFile>, Diagnostics) {
    let results: Vec<(ParsedFile, Diagnostics)> = sources
        .par_iter()
        .enumerate()
        .map(|(order, file)| assemble::parse_file(file, order, registry, ctx))
        .collect();

    let mut diagnostics = Diagnostics::default();
    let files = results
        .into_iter()
        .map(|(file, diags)| {
            diagnostics.append(diags);
            file
        })
        .collect();
    (files, diagnostics)
}

/// Run every stage with an already validated context.
pub fn run_with(sources: &[SourceFile], registry: &Registry, ctx: &Context) -> DocumentModel {
    let (mut files, mut diagnostics) = parse_sources(sources, registry, ctx);
    worker::run(&mut files, ctx, &mut diagnostics);
    let blocks = filter::documentable(files);
    let endpoints = grouper::group(blocks, ctx, &mut diagnostics);
    tracing::debug!(
        files = sources.len(),
        endpoints = endpoints.len(),
        diagnostics = diagnostics.len(),
        "run complete"
    );
    DocumentModel {
        endpoints,
        diagnostics,
    }
}

/// Validate the configuration, then run with the built-in tags.
pub fn run(sources: &[SourceFile], package: PackageInfo, options: Options) -> Result<DocumentModel, ConfigError> {
    let ctx = Context::new(package, options)?;
    let registry = Registry::with_builtins();
    Ok(run_with(sources, &registry, &ctx))
}
