//! Per-file consistency checks between endpoint urls and documented parameters.

use crate::block::Block;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use serde_json::Value;
use std::collections::HashMap;

/// `(field, optional)` for every `local.parameter.fields.*` entry of a block.
fn parameter_fields(block: &Block) -> Vec<(&str, bool)> {
    let Some(groups) = block
        .local
        .get("parameter")
        .and_then(|p| p.get("fields"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };
    groups
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|entry| {
            let field = entry.get("field")?.as_str()?;
            let optional = entry.get("optional").and_then(Value::as_bool).unwrap_or(false);
            Some((field, optional))
        })
        .collect()
}

/// `:name` segments of the url's path.
fn url_parameters(url: &str) -> Vec<&str> {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => url,
    };
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .filter_map(|part| part.strip_prefix(':'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Warn about url parameters without a matching `@apiParam`, and mandatory
/// parameters that never appear in the url. Definitions used by a block count
/// as documentation when they are declared in the same file.
pub fn check_file(filename: &str, blocks: &[Block], diagnostics: &mut Diagnostics) {
    let definitions: HashMap<&str, &Block> = blocks
        .iter()
        .filter_map(|b| {
            let name = b.global.get("define")?.get("name")?.as_str()?;
            Some((name, b))
        })
        .collect();

    for block in blocks {
        let own = parameter_fields(block);
        let inherited: Vec<(&str, bool)> = block
            .local
            .get("use")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|u| u.get("name")?.as_str())
            .filter_map(|name| definitions.get(name).copied())
            .flat_map(parameter_fields)
            .collect();

        let url_params = block.str_field("url").map(url_parameters).unwrap_or_default();

        for param in &url_params {
            let documented = own.iter().chain(&inherited).any(|(field, _)| field == param);
            if !documented {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UndocumentedUrlParameter,
                        format!(
                            "url contains a parameter `:{}` that is not documented as @apiParam in `{}`",
                            param,
                            block.title()
                        ),
                    )
                    .in_file(filename)
                    .at_block(block.index),
                );
            }
        }

        if block.is_definition() {
            continue;
        }
        for (field, optional) in &own {
            if !optional && !url_params.contains(field) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::UnusedParameter,
                        format!(
                            "mandatory @apiParam `{}` does not appear in the url of `{}`",
                            field,
                            block.title()
                        ),
                    )
                    .in_file(filename)
                    .at_block(block.index),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use serde_json::json;

    fn endpoint(url: &str, fields: Value) -> Block {
        let mut block = Block::new(BlockKind::Endpoint, "users.js", 0, 1);
        block.local.insert("url".into(), json!(url));
        block.local.insert("title".into(), json!("Read user"));
        block
            .local
            .insert("parameter".into(), json!({ "fields": { "Parameter": fields } }));
        block
    }

    #[test]
    fn url_parameter_extraction() {
        assert_eq!(url_parameters("/user/:id/posts/:post?x=:y"), ["id", "post"]);
        assert_eq!(url_parameters("https://api.example.com/:org/repos"), ["org"]);
        assert!(url_parameters("/health").is_empty());
    }

    #[test]
    fn consistent_block_is_quiet() {
        let block = endpoint(
            "/user/:id",
            json!([{ "field": "id", "optional": false }, { "field": "verbose", "optional": true }]),
        );
        let mut diags = Diagnostics::default();
        check_file("users.js", &[block], &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn undocumented_and_unused_parameters() {
        let block = endpoint("/user/:id", json!([{ "field": "name", "optional": false }]));
        let mut diags = Diagnostics::default();
        check_file("users.js", &[block], &mut diags);
        assert_eq!(diags.of_kind(DiagnosticKind::UndocumentedUrlParameter).count(), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::UnusedParameter).count(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn parameters_from_same_file_definitions_count() {
        let mut define = Block::new(BlockKind::Definition, "users.js", 0, 1);
        define.global.insert("define".into(), json!({ "name": "UserId" }));
        define.local.insert(
            "parameter".into(),
            json!({ "fields": { "Parameter": [{ "field": "id", "optional": false }] } }),
        );
        let mut block = endpoint("/user/:id", json!([]));
        block.index = 2;
        block.local.insert("use".into(), json!([{ "name": "UserId" }]));

        let mut diags = Diagnostics::default();
        check_file("users.js", &[define, block], &mut diags);
        assert!(diags.is_empty(), "{:?}", diags);
    }
}
