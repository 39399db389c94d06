//! Block assembler: one source file in, ordered blocks out.
//!
//! Every recognized tag is parsed by its registered descriptor and the
//! fragment is written into the block through [`Block::apply`]. Nothing here
//! knows about individual tags.

use crate::block::{Block, BlockKind, RawTag};
use crate::context::Context;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::error::ParameterError;
use crate::registry::Registry;
use crate::sanity;
use crate::scan::{self, CommentSyntax, Element};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// One input file, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// All documentation blocks of one file, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFile {
    pub filename: String,
    pub blocks: Vec<Block>,
}

type ParseCache = HashMap<(String, String), Result<Option<Value>, ParameterError>>;

/// Scan and assemble one file. `file_order` is the file's position in the input.
pub fn parse_file(
    file: &SourceFile,
    file_order: usize,
    registry: &Registry,
    ctx: &Context,
) -> (ParsedFile, Diagnostics) {
    let filename = file.filename.replace('\\', "/");
    let syntax = CommentSyntax::for_path(&filename);
    let mut diagnostics = Diagnostics::default();
    let mut cache = ParseCache::new();
    let mut blocks = Vec::new();

    for (i, raw) in scan::find_blocks(&file.text, syntax).into_iter().enumerate() {
        let index = i + 1;
        let elements = scan::find_elements(&raw);
        if !is_selected(&elements, registry, ctx, &filename, index) {
            continue;
        }

        let mut block = Block::new(block_kind(&elements, registry), &filename, file_order, index);
        block.source = raw;

        for element in &elements {
            apply_element(&mut block, element, registry, ctx, &mut cache, &mut diagnostics);
        }

        if block.is_definition() {
            block.kind = BlockKind::Definition;
        }
        if block.local.is_empty() && block.global.is_empty() {
            tracing::debug!(file = %filename, block = index, "block produced no data, dropped");
            continue;
        }
        blocks.push(block);
    }

    sanity::check_file(&filename, &blocks, &mut diagnostics);
    tracing::debug!(file = %filename, blocks = blocks.len(), "assembled file");

    (ParsedFile { filename, blocks }, diagnostics)
}

/// A comment is documentation when it holds at least one registered tag and
/// is not excluded by `@apiIgnore` / `@apiPrivate`.
fn is_selected(elements: &[Element], registry: &Registry, ctx: &Context, filename: &str, index: usize) -> bool {
    if !elements.iter().any(|e| registry.contains(&e.name)) {
        return false;
    }
    if elements.iter().any(|e| e.name == "apiignore") {
        tracing::debug!(file = %filename, block = index, "@apiIgnore, block skipped");
        return false;
    }
    if !ctx.options().include_private && elements.iter().any(|e| e.name == "apiprivate") {
        tracing::debug!(file = %filename, block = index, "@apiPrivate, block skipped");
        return false;
    }
    true
}

fn block_kind(elements: &[Element], registry: &Registry) -> BlockKind {
    elements
        .iter()
        .filter(|e| registry.contains(&e.name))
        .find_map(|e| BlockKind::from_tag(&e.name))
        .unwrap_or(BlockKind::Other)
}

fn apply_element(
    block: &mut Block,
    element: &Element,
    registry: &Registry,
    ctx: &Context,
    cache: &mut ParseCache,
    diagnostics: &mut Diagnostics,
) {
    let (filename, index) = (block.filename.clone(), block.index);
    let context = |kind: DiagnosticKind, message: String| {
        Diagnostic::new(kind, message)
            .in_file(filename.clone())
            .at_block(index)
            .with_tag(element.source_name.clone())
    };

    let Some(parser) = registry.resolve(&element.name) else {
        let mut diagnostic = context(DiagnosticKind::UnknownTag, "no parser registered for this tag".into());
        if ctx.options().strict_tags {
            diagnostic = diagnostic.with_severity(Severity::Error);
        }
        diagnostics.push(diagnostic);
        block.unrecognized.push(RawTag {
            tag: element.source_name.clone(),
            content: element.content.clone(),
        });
        return;
    };

    let parsed = cache
        .entry((element.name.clone(), element.content.clone()))
        .or_insert_with(|| parser.parse(&element.content))
        .clone();

    match parsed {
        Ok(None) => {}
        Err(err) => {
            diagnostics.push(context(
                DiagnosticKind::ParseError,
                format!("{} Usage: {}", err.message, err.usage),
            ));
        }
        Ok(Some(fragment)) => {
            if let Err(err) = block.apply(parser, fragment) {
                diagnostics.push(context(DiagnosticKind::ParseError, err.to_string()));
            }
        }
    }
}
