use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::context::Context;
use crate::define::block_version;
use crate::diagnostics::Diagnostics;
use serde_json::{json, Value};

/// Permission lookup.
///
/// Reads: `local.permission`, `local.version`, the definition pool.
/// Writes: each `local.permission` entry becomes `{name, title, description}`
/// when a definition of that name exists.
pub struct PermissionWorker;

impl Worker for PermissionWorker {
    fn name(&self) -> &'static str {
        "permission"
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        pre: &PreProcess,
        ctx: &Context,
        _diagnostics: &mut Diagnostics,
    ) {
        for block in documentable_mut(files) {
            let version = block_version(block, ctx);
            let Some(Value::Array(entries)) = block.local.get_mut("permission") else {
                continue;
            };
            for entry in entries.iter_mut() {
                let Some(name) = entry.get("name").and_then(Value::as_str) else {
                    continue;
                };
                if let Some(definition) = pre.definitions.lookup(name, &version) {
                    *entry = json!({
                        "name": definition.name,
                        "title": definition.title,
                        "description": definition.description,
                    });
                }
            }
        }
    }
}
