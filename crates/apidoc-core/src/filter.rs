//! Final filters before grouping.

use crate::assemble::ParsedFile;
use crate::block::Block;
use serde_json::Value;
use std::collections::HashSet;

/// Grouped field sections: `local.<section>.fields.<group>`.
const GROUPED: &[&str] = &["parameter", "success", "error", "header"];
/// Flat field sections: `local.<section>`.
const FLAT: &[&str] = &["query", "body"];

fn dedup(fields: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    fields.retain(|entry| match entry.get("field").and_then(Value::as_str) {
        Some(field) => seen.insert(field.to_string()),
        None => true,
    });
}

/// Keep the first entry per field name in every field list.
pub fn dedup_fields(block: &mut Block) {
    for section in GROUPED {
        let Some(Value::Object(groups)) = block
            .local
            .get_mut(*section)
            .and_then(|s| s.get_mut("fields"))
        else {
            continue;
        };
        for fields in groups.values_mut() {
            if let Value::Array(fields) = fields {
                dedup(fields);
            }
        }
    }
    for section in FLAT {
        if let Some(Value::Array(fields)) = block.local.get_mut(*section) {
            dedup(fields);
        }
    }
}

/// Blocks that go into the document model, fields de-duplicated, in file
/// order then block order.
pub fn documentable(files: Vec<ParsedFile>) -> Vec<Block> {
    files
        .into_iter()
        .flat_map(|f| f.blocks)
        .filter(Block::is_documentable)
        .map(|mut block| {
            dedup_fields(&mut block);
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use serde_json::json;

    #[test]
    fn first_field_wins() {
        let mut block = Block::new(BlockKind::Endpoint, "a.js", 0, 1);
        block.local.insert(
            "parameter".into(),
            json!({ "fields": { "Parameter": [
                { "field": "id", "description": "first" },
                { "field": "id", "description": "second" },
                { "field": "name" }
            ] } }),
        );
        block.local.insert("query".into(), json!([{ "field": "q" }, { "field": "q" }]));
        dedup_fields(&mut block);
        assert_eq!(
            block.local["parameter"]["fields"]["Parameter"],
            json!([{ "field": "id", "description": "first" }, { "field": "name" }])
        );
        assert_eq!(block.local["query"], json!([{ "field": "q" }]));
    }

    #[test]
    fn definitions_are_not_documentable() {
        let mut define = Block::new(BlockKind::Definition, "a.js", 0, 1);
        define.global.insert("define".into(), json!({ "name": "X" }));
        define.local.insert("title".into(), json!("t"));
        let mut endpoint = Block::new(BlockKind::Endpoint, "a.js", 0, 2);
        endpoint.local.insert("title".into(), json!("t"));

        let blocks = documentable(vec![ParsedFile {
            filename: "a.js".into(),
            blocks: vec![define, endpoint],
        }]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].index, 2);
    }
}
