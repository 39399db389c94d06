//! Code-family tags (`@code`, `@codeParam`, `@codeReturn`, ...).

use super::text::unindent;
use crate::error::ParameterError;
use crate::registry::{Method, TagParser, TargetPath};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

static RE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{([^}]+)\}\s+(.+)$").unwrap());

// {type} [name=default] description | {type} name description
static RE_CODE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\{([^}]+)\}\s+(?:\[([^\]=]+)(?:=([^\]]+))?\]|(\S+))(?:\s+(.*))?$").unwrap()
});

static RE_TYPED_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^\{([^}]+)\}\s*(.*)$").unwrap());

// Lines that look like code rather than an example title
static RE_CODE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[(){};=]|^(?://|#|val |let |var |const |def |func |fun )").unwrap()
});

/// `@code [{kind}] name`; the kind defaults to `function`.
pub struct Code;

impl TagParser for Code {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ParameterError::new("No arguments found.", "@code [{kind}] name"));
        }
        let fragment = match RE_CODE.captures(content) {
            Some(caps) => json!({
                "kind": caps[1].trim().to_ascii_lowercase(),
                "name": caps[2].trim(),
            }),
            None => json!({ "kind": "function", "name": content }),
        };
        Ok(Some(fragment))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("local.code")
    }

    fn extend_root(&self) -> bool {
        true
    }
}

/// `@codeParam {type} [name=default] description`
pub struct CodeParam;

impl TagParser for CodeParam {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let Some(caps) = RE_CODE_PARAM.captures(content) else {
            return Ok(Some(json!({
                "type": "any",
                "field": content,
                "description": "",
                "optional": false,
            })));
        };

        let mut fragment = Map::new();
        fragment.insert("type".into(), caps[1].trim().into());
        let name = caps.get(2).or(caps.get(4)).map(|m| m.as_str().trim()).unwrap_or("");
        fragment.insert("field".into(), name.into());
        fragment.insert(
            "description".into(),
            unindent(caps.get(5).map(|m| m.as_str()).unwrap_or("")).into(),
        );
        fragment.insert("optional".into(), caps.get(2).is_some().into());
        if let Some(default) = caps.get(3) {
            fragment.insert("defaultValue".into(), default.as_str().trim().into());
        }
        Ok(Some(Value::Object(fragment)))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("local.params")
    }

    fn method(&self) -> Method {
        Method::Push
    }

    fn markdown_fields(&self) -> &[&'static str] {
        &["description"]
    }
}

/// `{type} description` tags: `@codeReturn` (insert) and `@codeThrows` (push).
pub struct TypedText {
    path: &'static str,
    method: Method,
    fallback_type: &'static str,
}

impl TypedText {
    pub const fn returns() -> Self {
        Self {
            path: "local.returns",
            method: Method::Insert,
            fallback_type: "any",
        }
    }

    pub const fn throws() -> Self {
        Self {
            path: "local.throws",
            method: Method::Push,
            fallback_type: "Error",
        }
    }
}

impl TagParser for TypedText {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let fragment = match RE_TYPED_TEXT.captures(content) {
            Some(caps) => json!({
                "type": caps[1].trim(),
                "description": unindent(&caps[2]),
            }),
            None => json!({ "type": self.fallback_type, "description": content }),
        };
        Ok(Some(fragment))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse(self.path)
    }

    fn method(&self) -> Method {
        self.method
    }

    fn markdown_fields(&self) -> &[&'static str] {
        &["description"]
    }
}

/// `@codeSee reference [description]`
pub struct See;

impl TagParser for See {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let mut words = content.split_whitespace();
        let Some(reference) = words.next() else {
            return Ok(None);
        };
        Ok(Some(json!({
            "reference": reference,
            "description": words.collect::<Vec<_>>().join(" "),
        })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("local.see")
    }

    fn method(&self) -> Method {
        Method::Push
    }
}

/// `@codeExample [title]` followed by code. A first line that reads like
/// code is part of the body and the title stays `Example`.
pub struct CodeExample;

impl TagParser for CodeExample {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        let (head, rest) = content.split_once('\n').unwrap_or((content, ""));
        let head = head.trim();
        let looks_like_title = !head.is_empty() && head.len() < 50 && !RE_CODE_LINE.is_match(head);

        let (title, code) = if looks_like_title {
            (head, unindent(rest))
        } else {
            ("Example", unindent(content))
        };
        Ok(Some(json!({ "title": title, "code": code })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("local.examples")
    }

    fn method(&self) -> Method {
        Method::Push
    }
}
