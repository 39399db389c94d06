//! Workers: whole-run passes over the assembled blocks.
//!
//! Every worker first gets a read-only look at all files (`pre_process`),
//! then the post-processing passes run one after another in [`pipeline`]
//! order. Each worker documents the block fields it reads and writes.

mod field_title;
mod group;
mod inherit;
mod name;
mod permission;
mod sample_request;

pub use field_title::FieldTitleWorker;
pub use group::GroupWorker;
pub use inherit::InheritWorker;
pub use name::NameWorker;
pub use permission::PermissionWorker;
pub use sample_request::SampleRequestWorker;

use crate::assemble::ParsedFile;
use crate::block::{Block, BlockKind};
use crate::context::Context;
use crate::define::DefinitionPool;
use crate::diagnostics::Diagnostics;
use serde_json::Value;

/// Tables built by the pre-process passes.
#[derive(Debug, Default)]
pub struct PreProcess {
    pub definitions: DefinitionPool,
}

pub trait Worker {
    fn name(&self) -> &'static str;

    fn pre_process(
        &self,
        _files: &[ParsedFile],
        _ctx: &Context,
        _pre: &mut PreProcess,
        _diagnostics: &mut Diagnostics,
    ) {
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        pre: &PreProcess,
        ctx: &Context,
        diagnostics: &mut Diagnostics,
    );
}

/// Workers in the order they run. Inheritance is left out when definitions
/// are disabled.
pub fn pipeline(ctx: &Context) -> Vec<Box<dyn Worker>> {
    let mut workers: Vec<Box<dyn Worker>> = Vec::new();
    if ctx.options().definitions {
        workers.push(Box::new(InheritWorker));
    }
    workers.push(Box::new(NameWorker));
    workers.push(Box::new(GroupWorker));
    for worker in FieldTitleWorker::all() {
        workers.push(Box::new(worker));
    }
    workers.push(Box::new(PermissionWorker));
    workers.push(Box::new(SampleRequestWorker));
    workers
}

/// Run every worker over `files`: defaults, all pre-processes, then all
/// post-processes.
pub fn run(files: &mut [ParsedFile], ctx: &Context, diagnostics: &mut Diagnostics) {
    fill_defaults(files, ctx);

    let workers = pipeline(ctx);
    let mut pre = PreProcess::default();
    for worker in &workers {
        tracing::debug!(worker = worker.name(), "pre-process");
        worker.pre_process(files, ctx, &mut pre, diagnostics);
    }
    for worker in &workers {
        tracing::debug!(worker = worker.name(), "post-process");
        worker.post_process(files, &pre, ctx, diagnostics);
    }
}

/// Reads: `local.type`, `local.url`, `local.version`.
/// Writes: the same keys when missing, plus `local.filename`.
pub fn fill_defaults(files: &mut [ParsedFile], ctx: &Context) {
    for block in documentable_mut(files) {
        if block.kind == BlockKind::Endpoint {
            for key in ["type", "url"] {
                block
                    .local
                    .entry(key)
                    .or_insert_with(|| Value::String(String::new()));
            }
        }
        block
            .local
            .entry("version")
            .or_insert_with(|| Value::String(ctx.default_version().to_string()));
        let filename = block.filename.clone();
        block.local.insert("filename".into(), Value::String(filename));
    }
}

/// Blocks that are not definitions.
pub(crate) fn documentable_mut(files: &mut [ParsedFile]) -> impl Iterator<Item = &mut Block> {
    files
        .iter_mut()
        .flat_map(|f| f.blocks.iter_mut())
        .filter(|b| !b.is_definition())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::assemble::ParsedFile;
    use crate::block::{Block, BlockKind};
    use serde_json::Value;

    pub fn endpoint(local: Value) -> Block {
        let mut block = Block::new(BlockKind::Endpoint, "src/users.js", 0, 1);
        if let Value::Object(map) = local {
            block.local = map;
        }
        block
    }

    pub fn files(blocks: Vec<Block>) -> Vec<ParsedFile> {
        vec![ParsedFile {
            filename: "src/users.js".into(),
            blocks,
        }]
    }
}
