use super::{documentable_mut, PreProcess, Worker};
use crate::assemble::ParsedFile;
use crate::block::{Block, BlockKind};
use crate::context::Context;
use crate::diagnostics::Diagnostics;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

/// Identifier synthesis.
///
/// Reads: `local.name`, `local.type`, `local.url`, `local.title`.
/// Writes: `local.name` when missing or empty.
pub struct NameWorker;

impl Worker for NameWorker {
    fn name(&self) -> &'static str {
        "name"
    }

    fn post_process(
        &self,
        files: &mut [ParsedFile],
        _pre: &PreProcess,
        _ctx: &Context,
        _diagnostics: &mut Diagnostics,
    ) {
        for block in documentable_mut(files) {
            if !block.name().is_empty() {
                continue;
            }
            let name = synthesize(block);
            tracing::debug!(file = %block.filename, block = block.index, %name, "synthesized name");
            block.local.insert("name".into(), Value::String(name));
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn words(text: &str) -> String {
    RE_WORD.find_iter(text).map(|m| capitalize(m.as_str())).collect()
}

/// `get /user/:id` becomes `GetUserId`. Blocks whose method and url carry
/// no word characters use their title, then their kind and position.
/// Never empty.
pub fn synthesize(block: &Block) -> String {
    if block.kind == BlockKind::Endpoint {
        let kind = block.str_field("type").unwrap_or("");
        let url = block.str_field("url").unwrap_or("");
        let name = format!("{}{}", capitalize(&kind.to_lowercase()), words(url));
        if !name.is_empty() {
            return RE_NON_WORD.replace_all(&name, "_").into_owned();
        }
    }
    let from_title = words(block.title());
    if !from_title.is_empty() {
        return from_title;
    }
    format!("{}{}", capitalize(block.kind.as_str()), block.index)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{endpoint, files};
    use super::*;
    use serde_json::json;

    #[test]
    fn from_type_and_url() {
        let block = endpoint(json!({ "type": "get", "url": "/user/:id" }));
        assert_eq!(synthesize(&block), "GetUserId");
        let block = endpoint(json!({ "type": "post", "url": "/api/v1/notes-archive" }));
        assert_eq!(synthesize(&block), "PostApiV1NotesArchive");
    }

    #[test]
    fn non_word_characters_in_type_become_underscores() {
        let block = endpoint(json!({ "type": "m-search", "url": "/x" }));
        assert_eq!(synthesize(&block), "M_searchX");
    }

    #[test]
    fn identical_type_and_url_collide() {
        let a = endpoint(json!({ "type": "get", "url": "/notes" }));
        let b = endpoint(json!({ "type": "GET", "url": "/notes/" }));
        assert_eq!(synthesize(&a), synthesize(&b));
    }

    #[test]
    fn fallbacks_without_url() {
        let block = endpoint(json!({ "type": "", "url": "", "title": "list all notes" }));
        assert_eq!(synthesize(&block), "ListAllNotes");
        let mut block = endpoint(json!({}));
        block.kind = BlockKind::Model;
        block.index = 4;
        assert_eq!(synthesize(&block), "Model4");
    }

    #[test]
    fn root_url_without_method_falls_back_to_title() {
        let block = endpoint(json!({ "type": "", "url": "/", "title": "Root" }));
        assert_eq!(synthesize(&block), "Root");
        let mut block = endpoint(json!({ "type": "", "url": "/" }));
        block.index = 2;
        assert_eq!(synthesize(&block), "Endpoint2");
    }

    #[test]
    fn authored_names_are_kept() {
        let mut files = files(vec![
            endpoint(json!({ "name": "ReadUser", "type": "get", "url": "/user" })),
            endpoint(json!({ "name": "", "type": "get", "url": "/user" })),
        ]);
        NameWorker.post_process(&mut files, &PreProcess::default(), &Context::default(), &mut Diagnostics::default());
        assert_eq!(files[0].blocks[0].name(), "ReadUser");
        assert_eq!(files[0].blocks[1].name(), "GetUser");
    }
}
