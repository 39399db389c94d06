use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::block::Block;
use crate::context::Context;
use crate::define::{block_version, DefinitionPool};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::version::Version;
use serde_json::{Map, Value};

/// Field group titles.
///
/// A `(group)` on a field tag may name an `@apiDefine` block; the fields are
/// then listed under that definition's title instead of the bare group name.
/// Groups with no definition keep their name.
///
/// Reads: `local.<section>.fields`, `local.version`, the definition pool.
/// Writes: `local.<section>.fields` (regrouped by title), `markdown_fields`.
pub struct FieldTitleWorker {
    section: &'static str,
    tag: &'static str,
}

impl FieldTitleWorker {
    pub const fn new(section: &'static str, tag: &'static str) -> Self {
        Self { section, tag }
    }

    /// One worker per grouped field section.
    pub fn all() -> [Self; 4] {
        [
            Self::new("parameter", "apiParam"),
            Self::new("success", "apiSuccess"),
            Self::new("error", "apiError"),
            Self::new("header", "apiHeader"),
        ]
    }

    fn title(
        &self,
        group: &str,
        pool: &DefinitionPool,
        version: &Version,
        block: &Block,
        diagnostics: &mut Diagnostics,
    ) -> String {
        if !pool.contains(group) {
            return group.to_string();
        }
        match pool.lookup(group, version) {
            Some(definition) if !definition.title.is_empty() => definition.title.clone(),
            Some(_) => group.to_string(),
            None => {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnresolvedReference,
                        format!("field group `{}` has no definition at or below version {}", group, version),
                    )
                    .in_file(block.filename.clone())
                    .at_block(block.index)
                    .with_tag(self.tag),
                );
                group.to_string()
            }
        }
    }
}

impl Worker for FieldTitleWorker {
    fn name(&self) -> &'static str {
        "field_title"
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        pre: &PreProcess,
        ctx: &Context,
        diagnostics: &mut Diagnostics,
    ) {
        for block in documentable_mut(files) {
            let Some(Value::Object(fields)) = block
                .local
                .get_mut(self.section)
                .and_then(|section| section.get_mut("fields"))
                .filter(|fields| fields.is_object())
                .map(Value::take)
            else {
                continue;
            };

            let version = block_version(block, ctx);
            let mut regrouped = Map::new();
            for (group, entries) in fields {
                let title = self.title(&group, &pre.definitions, &version, block, diagnostics);
                if title != group {
                    rename_markdown(block, self.section, &group, &title);
                }
                let merged = regrouped
                    .entry(title)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let (Value::Array(existing), Value::Array(more)) = (merged, entries) {
                    existing.extend(more);
                }
            }
            if let Some(section) = block.local.get_mut(self.section) {
                section["fields"] = Value::Object(regrouped);
            }
        }
    }
}

/// `parameter.fields.Login[].description` follows its group to `parameter.fields.<title>[]...`.
fn rename_markdown(block: &mut Block, section: &str, group: &str, title: &str) {
    let from = format!("{}.fields.{}[]", section, group);
    let to = format!("{}.fields.{}[]", section, title);
    let renamed: Vec<String> = block
        .markdown_fields
        .iter()
        .filter_map(|pattern| pattern.strip_prefix(&from).map(|rest| format!("{}{}", to, rest)))
        .collect();
    block.markdown_fields.retain(|pattern| !pattern.starts_with(&from));
    block.markdown_fields.extend(renamed);
}

#[cfg(test)]
mod tests {
    use super::super::testing::{endpoint, files};
    use super::*;
    use crate::block::BlockKind;
    use serde_json::json;

    fn define(name: &str, title: &str, version: &str) -> Block {
        let mut block = Block::new(BlockKind::Definition, "src/defs.js", 0, 9);
        block
            .global
            .insert("define".into(), json!({ "name": name, "title": title }));
        block.local.insert("version".into(), json!(version));
        block
    }

    fn run(blocks: Vec<Block>) -> (Vec<ParsedFile>, Diagnostics) {
        let ctx = Context::default();
        let mut files = files(blocks);
        let mut diags = Diagnostics::default();
        let pre = PreProcess {
            definitions: DefinitionPool::collect(&files, &ctx, &mut diags),
        };
        for worker in FieldTitleWorker::all() {
            worker.post_process(&mut files, &pre, &ctx, &mut diags);
        }
        (files, diags)
    }

    #[test]
    fn defined_group_is_listed_under_its_title() {
        let mut block = endpoint(json!({
            "version": "1.2.0",
            "parameter": { "fields": {
                "Login": [{ "group": "Login", "field": "user" }],
                "Parameter": [{ "group": "Parameter", "field": "id" }]
            } }
        }));
        block
            .markdown_fields
            .insert("parameter.fields.Login[].description".into());

        let (files, diags) = run(vec![
            define("Login", "Login credentials", "1.0.0"),
            define("Login", "Login (v2)", "2.0.0"),
            block,
        ]);
        assert!(diags.is_empty());
        let block = &files[0].blocks[2];
        assert_eq!(
            block.local["parameter"]["fields"],
            json!({
                "Login credentials": [{ "group": "Login", "field": "user" }],
                "Parameter": [{ "group": "Parameter", "field": "id" }]
            })
        );
        let patterns: Vec<&str> = block.markdown_fields.iter().map(String::as_str).collect();
        assert_eq!(patterns, ["parameter.fields.Login credentials[].description"]);
    }

    #[test]
    fn groups_sharing_a_title_are_merged() {
        let block = endpoint(json!({
            "success": { "fields": {
                "Account": [{ "group": "Account", "field": "id" }],
                "User": [{ "group": "User", "field": "name" }]
            } }
        }));
        let (files, _) = run(vec![define("Account", "User", "0.0.0"), block]);
        assert_eq!(
            files[0].blocks[1].local["success"]["fields"],
            json!({ "User": [{ "group": "Account", "field": "id" }, { "group": "User", "field": "name" }] })
        );
    }

    #[test]
    fn defined_only_in_later_versions() {
        let block = endpoint(json!({
            "version": "1.0.0",
            "error": { "fields": { "Auth": [{ "group": "Auth", "field": "Denied" }] } }
        }));
        let (files, diags) = run(vec![define("Auth", "Authentication", "2.0.0"), block]);
        let unresolved: Vec<_> = diags.of_kind(DiagnosticKind::UnresolvedReference).collect();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].tag.as_deref(), Some("apiError"));
        assert!(files[0].blocks[1].local["error"]["fields"].get("Auth").is_some());
    }
}
