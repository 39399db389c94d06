use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::context::Context;
use crate::define::block_version;
use crate::diagnostics::Diagnostics;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Group metadata.
///
/// Reads: `local.group`, `local.version`, the definition pool.
/// Writes: `local.group` (file stem when missing), `local.groupTitle`,
/// `local.groupDescription`.
pub struct GroupWorker;

impl Worker for GroupWorker {
    fn name(&self) -> &'static str {
        "group"
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        pre: &PreProcess,
        ctx: &Context,
        _diagnostics: &mut Diagnostics,
    ) {
        for block in documentable_mut(files) {
            let group = match block.group() {
                "" => file_group(&block.filename),
                authored => RE_NON_WORD.replace_all(authored, "_").into_owned(),
            };

            let version = block_version(block, ctx);
            let definition = pre.definitions.lookup(&group, &version);
            let title = definition
                .map(|d| d.title.as_str())
                .filter(|t| !t.is_empty())
                .unwrap_or(&group)
                .to_string();
            if let Some(description) = definition.map(|d| &d.description).filter(|d| !d.is_empty()) {
                block
                    .local
                    .insert("groupDescription".into(), Value::String(description.clone()));
                block.markdown_fields.insert("groupDescription".into());
            }
            block.local.insert("groupTitle".into(), Value::String(title));
            block.local.insert("group".into(), Value::String(group));
        }
    }
}

/// Group name derived from the file stem: `src/user-accounts.js` is `user_accounts`.
fn file_group(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    RE_NON_WORD.replace_all(stem, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::super::testing::{endpoint, files};
    use super::*;
    use crate::block::{Block, BlockKind};
    use crate::define::DefinitionPool;
    use serde_json::json;

    fn run(blocks: Vec<Block>) -> Vec<ParsedFile> {
        let ctx = Context::default();
        let mut files = files(blocks);
        let mut diags = Diagnostics::default();
        let pre = PreProcess {
            definitions: DefinitionPool::collect(&files, &ctx, &mut diags),
        };
        GroupWorker.post_process(&mut files, &pre, &ctx, &mut diags);
        files
    }

    #[test]
    fn missing_group_uses_file_stem() {
        let mut block = endpoint(json!({}));
        block.filename = "src/user-accounts.js".into();
        let files = run(vec![block]);
        assert_eq!(files[0].blocks[0].group(), "user_accounts");
        assert_eq!(files[0].blocks[0].local["groupTitle"], "user_accounts");
    }

    #[test]
    fn group_metadata_from_definition() {
        let mut define = Block::new(BlockKind::Definition, "src/defs.js", 0, 1);
        define.global.insert(
            "define".into(),
            json!({ "name": "User", "title": "User management", "description": "All about *users*." }),
        );
        let files = run(vec![define, endpoint(json!({ "group": "User" }))]);
        let block = &files[0].blocks[1];
        assert_eq!(block.local["groupTitle"], "User management");
        assert_eq!(block.local["groupDescription"], "All about *users*.");
        assert!(block.markdown_fields.contains("groupDescription"));
        assert!(!files[0].blocks[0].local.contains_key("groupTitle"));
    }
}
