//! Block data model and the path/method engine that writes fragments into it.

use crate::error::AssembleError;
use crate::registry::{Method, Root, TagParser, TargetPath};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// The leading tag family of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Endpoint,
    Model,
    Code,
    Definition,
    Other,
}

impl BlockKind {
    /// Family of a (lowercase) tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.starts_with("api") {
            Some(Self::Endpoint)
        } else if tag.starts_with("model") {
            Some(Self::Model)
        } else if tag.starts_with("code") {
            Some(Self::Code)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Model => "model",
            Self::Code => "code",
            Self::Definition => "definition",
            Self::Other => "other",
        }
    }
}

/// A tag with no registered parser, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTag {
    pub tag: String,
    pub content: String,
}

/// One documented element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Raw comment text, for diagnostics.
    #[serde(skip)]
    pub source: String,
    pub local: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub global: Map<String, Value>,
    /// 1-based position within the file.
    pub index: usize,
    pub file_order: usize,
    pub filename: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<RawTag>,
    /// Field patterns whose values are Markdown, e.g. `parameter.fields[].description`.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub markdown_fields: BTreeSet<String>,
}

impl Block {
    pub fn new(kind: BlockKind, filename: impl Into<String>, file_order: usize, index: usize) -> Self {
        Self {
            kind,
            source: String::new(),
            local: Map::new(),
            global: Map::new(),
            index,
            file_order,
            filename: filename.into(),
            unrecognized: Vec::new(),
            markdown_fields: BTreeSet::new(),
        }
    }

    /// Apply a parsed fragment at the descriptor's path with its method.
    pub fn apply(&mut self, parser: &dyn TagParser, fragment: Value) -> Result<(), AssembleError> {
        let path = parser.path(&fragment);
        let method = parser.method();

        if path.root() == Root::Global && !self.global.is_empty() {
            return Err(AssembleError::GlobalAlreadyDefined);
        }

        let markdown = markdown_patterns(parser, &path, &fragment);

        if parser.extend_root() {
            insert_at(&mut self.local, &[], fragment, &path)?;
        } else {
            let root = match path.root() {
                Root::Local => &mut self.local,
                Root::Global => &mut self.global,
            };
            match method {
                Method::Insert => insert_at(root, path.segments(), fragment, &path)?,
                Method::Push => push_at(root, path.segments(), fragment, &path)?,
            }
        }

        if path.root() == Root::Local {
            self.markdown_fields.extend(markdown);
        }
        Ok(())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.local.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or("")
    }

    pub fn group(&self) -> &str {
        self.str_field("group").unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.str_field("title").unwrap_or("")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn is_definition(&self) -> bool {
        self.global.contains_key("define")
    }

    /// Blocks that end up in the document model: local data, no global entry.
    pub fn is_documentable(&self) -> bool {
        self.global.is_empty() && !self.local.is_empty()
    }
}

fn markdown_patterns(parser: &dyn TagParser, path: &TargetPath, fragment: &Value) -> Vec<String> {
    let base = if parser.extend_root() {
        String::new()
    } else {
        let mut base = path.relative();
        if parser.method() == Method::Push {
            base.push_str("[]");
        }
        base
    };
    parser
        .markdown_fields()
        .iter()
        .filter(|field| lookup(fragment, field).is_some_and(|v| !v.is_null()))
        .map(|field| {
            if base.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", base, field)
            }
        })
        .collect()
}

/// Read a dot path inside a JSON value.
pub fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

/// Walk `segments` below `root`, creating objects on demand.
fn object_at<'a>(
    root: &'a mut Map<String, Value>,
    segments: &[String],
    path: &TargetPath,
    method: Method,
) -> Result<&'a mut Map<String, Value>, AssembleError> {
    let mut current = root;
    for segment in segments {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(AssembleError::PathConflict {
                    path: path.to_string(),
                    method: method.as_str(),
                })
            }
        };
    }
    Ok(current)
}

fn insert_at(
    root: &mut Map<String, Value>,
    segments: &[String],
    fragment: Value,
    path: &TargetPath,
) -> Result<(), AssembleError> {
    let Some((last, parents)) = segments.split_last() else {
        return match fragment {
            Value::Object(map) => {
                root.extend(map);
                Ok(())
            }
            _ => Err(AssembleError::NotAnObject {
                path: path.to_string(),
            }),
        };
    };
    let parent = object_at(root, parents, path, Method::Insert)?;
    match parent.get_mut(last.as_str()) {
        Some(Value::Array(_)) => Err(AssembleError::PathConflict {
            path: path.to_string(),
            method: Method::Insert.as_str(),
        }),
        Some(Value::Object(existing)) if fragment.is_object() => {
            if let Value::Object(map) = fragment {
                existing.extend(map);
            }
            Ok(())
        }
        _ => {
            parent.insert(last.clone(), fragment);
            Ok(())
        }
    }
}

fn push_at(
    root: &mut Map<String, Value>,
    segments: &[String],
    fragment: Value,
    path: &TargetPath,
) -> Result<(), AssembleError> {
    let conflict = || AssembleError::PathConflict {
        path: path.to_string(),
        method: Method::Push.as_str(),
    };
    let (last, parents) = segments.split_last().ok_or_else(conflict)?;
    let parent = object_at(root, parents, path, Method::Push)?;
    match parent
        .entry(last.clone())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => {
            items.push(fragment);
            Ok(())
        }
        _ => Err(conflict()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParameterError;
    use serde_json::json;

    struct Tag {
        path: &'static str,
        method: Method,
        extend_root: bool,
    }

    impl TagParser for Tag {
        fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
            Ok(Some(json!({ "value": content })))
        }
        fn path(&self, _fragment: &Value) -> TargetPath {
            TargetPath::parse(self.path)
        }
        fn method(&self) -> Method {
            self.method
        }
        fn markdown_fields(&self) -> &[&'static str] {
            &["value"]
        }
        fn extend_root(&self) -> bool {
            self.extend_root
        }
    }

    fn tag(path: &'static str, method: Method) -> Tag {
        Tag {
            path,
            method,
            extend_root: false,
        }
    }

    fn block() -> Block {
        Block::new(BlockKind::Endpoint, "a.js", 0, 1)
    }

    #[test]
    fn push_accumulates_in_call_order() {
        let parser = tag("local.see", Method::Push);
        let mut b = block();
        for n in 0..3 {
            b.apply(&parser, json!({ "n": n })).unwrap();
        }
        assert_eq!(b.local["see"], json!([{ "n": 0 }, { "n": 1 }, { "n": 2 }]));
    }

    #[test]
    fn insert_keeps_last_value() {
        let parser = tag("local", Method::Insert);
        let mut b = block();
        b.apply(&parser, json!({ "title": "first" })).unwrap();
        b.apply(&parser, json!({ "title": "second" })).unwrap();
        assert_eq!(b.local["title"], "second");
    }

    #[test]
    fn intermediate_objects_are_created() {
        let parser = tag("local.query.fields", Method::Push);
        let mut b = block();
        b.apply(&parser, json!({ "field": "q" })).unwrap();
        assert_eq!(b.local["query"]["fields"][0]["field"], "q");
    }

    #[test]
    fn insert_onto_sequence_conflicts() {
        let mut b = block();
        b.apply(&tag("local.see", Method::Push), json!({ "a": 1 })).unwrap();
        let err = b.apply(&tag("local.see", Method::Insert), json!({ "b": 2 })).unwrap_err();
        assert!(matches!(err, AssembleError::PathConflict { .. }));
        assert_eq!(b.local["see"], json!([{ "a": 1 }]));
    }

    #[test]
    fn extend_root_writes_top_level_keys() {
        let parser = Tag {
            path: "local.code",
            method: Method::Insert,
            extend_root: true,
        };
        let mut b = block();
        b.apply(&parser, json!({ "name": "trim" })).unwrap();
        assert_eq!(b.local["name"], "trim");
        assert!(!b.local.contains_key("code"));
        assert!(b.markdown_fields.is_empty());
    }

    #[test]
    fn single_global_entry_per_block() {
        let define = tag("global.define", Method::Insert);
        let mut b = block();
        b.apply(&define, json!({ "name": "A" })).unwrap();
        assert!(b.is_definition());
        let err = b.apply(&define, json!({ "name": "B" })).unwrap_err();
        assert_eq!(err, AssembleError::GlobalAlreadyDefined);
    }

    #[test]
    fn markdown_patterns_follow_path_and_method() {
        let mut b = block();
        b.apply(&tag("local.parameter.fields.Parameter", Method::Push), json!({ "value": "x" }))
            .unwrap();
        b.apply(&tag("local", Method::Insert), json!({ "value": "y" })).unwrap();
        let fields: Vec<&str> = b.markdown_fields.iter().map(String::as_str).collect();
        assert_eq!(fields, ["parameter.fields.Parameter[].value", "value"]);
    }

    #[test]
    fn lookup_follows_dots() {
        let v = json!({ "deprecated": { "content": "use v2" } });
        assert_eq!(lookup(&v, "deprecated.content"), Some(&json!("use v2")));
        assert_eq!(lookup(&v, "deprecated.missing"), None);
    }
}
