use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::context::Context;
use crate::define::{block_version, DefinitionPool};
use crate::diagnostics::Diagnostics;

/// `@apiUse` and `@api*Structure` expansion.
///
/// Pre-process: builds the definition pool.
/// Reads: `local.use`, the structure references, `local.version`.
/// Writes: inherited keys into `local`, removes the references, extends `markdown_fields`.
pub struct InheritWorker;

impl Worker for InheritWorker {
    fn name(&self) -> &'static str {
        "inherit"
    }

    fn pre_process(
        &self,
        files: &[ParsedFile],
        ctx: &Context,
        pre: &mut PreProcess,
        diagnostics: &mut Diagnostics,
    ) {
        pre.definitions = DefinitionPool::collect(files, ctx, diagnostics);
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        pre: &PreProcess,
        ctx: &Context,
        diagnostics: &mut Diagnostics,
    ) {
        for block in documentable_mut(files) {
            let version = block_version(block, ctx);
            let filename = block.filename.clone();
            pre.definitions.expand(
                &mut block.local,
                &mut block.markdown_fields,
                &version,
                (filename.as_str(), block.index),
                diagnostics,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{endpoint, files};
    use super::*;
    use crate::block::{Block, BlockKind};
    use crate::diagnostics::DiagnosticKind;
    use serde_json::json;

    fn definition(name: &str, local: serde_json::Value) -> Block {
        let mut block = Block::new(BlockKind::Definition, "src/defs.js", 0, 9);
        block.global.insert("define".into(), json!({ "name": name }));
        if let serde_json::Value::Object(map) = local {
            block.local = map;
        }
        block.markdown_fields.insert("error.fields.Error 4xx[].description".into());
        block
    }

    fn run(blocks: Vec<Block>) -> (Vec<ParsedFile>, Diagnostics) {
        let ctx = Context::default();
        let mut files = files(blocks);
        let mut pre = PreProcess::default();
        let mut diags = Diagnostics::default();
        InheritWorker.pre_process(&files, &ctx, &mut pre, &mut diags);
        InheritWorker.post_process(&mut files, &pre, &ctx, &mut diags);
        (files, diags)
    }

    #[test]
    fn author_wins_over_definition() {
        let (files, diags) = run(vec![
            definition(
                "UserError",
                json!({ "title": "inherited", "error": { "fields": { "Error 4xx": [{ "field": "UserNotFound" }] } } }),
            ),
            endpoint(json!({ "title": "Read user", "use": [{ "name": "UserError" }] })),
        ]);
        assert!(diags.is_empty());
        let block = &files[0].blocks[1];
        assert_eq!(block.local["title"], "Read user");
        assert_eq!(block.local["error"]["fields"]["Error 4xx"][0]["field"], "UserNotFound");
        assert!(!block.local.contains_key("use"));
        assert!(block.markdown_fields.contains("error.fields.Error 4xx[].description"));
    }

    #[test]
    fn missing_definition_keeps_authored_fields() {
        let (files, diags) = run(vec![endpoint(json!({
            "title": "Read user",
            "url": "/user/:id",
            "use": [{ "name": "MissingDef" }]
        }))]);
        assert_eq!(diags.of_kind(DiagnosticKind::UnresolvedReference).count(), 1);
        let local = &files[0].blocks[0].local;
        assert_eq!(local["title"], "Read user");
        assert_eq!(local["url"], "/user/:id");
        assert!(!local.contains_key("use"));
    }
}
