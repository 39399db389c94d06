//! `@apiParam`-style field tags.
//!
//! Grammar:
//!
//! ```text
//! [(group)] [{type[{size}][=allowed,values]}] [ [ ]field[=default][ ] ] description
//! ```
//!
//! `[field]` marks the field optional, `[]` in the type marks an array.

use super::text::unindent;
use crate::error::ParameterError;
use crate::registry::{Method, TagParser, TargetPath};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static RE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)^\s*",
        // 1: group
        r"(?:\(\s*(.+?)\s*\)\s*)?",
        // 2: type, 3: size, 4: allowed values
        r"\s*(?:\{\s*([a-zA-Z0-9()#:\./\\\[\]_|-]+)",
        r"\s*(?:\{\s*(.+?)\s*\}\s*)?",
        r"\s*(?:=\s*(.+?))?",
        r"\s*\}\s*)?",
        // 5: optional marker + name, 6: name
        r"(\[?\s*([#@a-zA-Z0-9\x{00C0}-\x{017F}$:\./\\_-]+(?:\[[a-zA-Z0-9\x{00C0}-\x{017F}\./\\_-]*\])?)",
        // 7, 8, 9: default value in double quotes, single quotes, bare
        r#"(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|(.*?)(?:\s|\]|$)))?"#,
        r"\s*\]?\s*)",
        // 10: description
        r"(.*)?$"
    ))
    .unwrap()
});

static RE_ALLOWED_DOUBLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*[^"]""#).unwrap());
static RE_ALLOWED_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'[^']*[^']'").unwrap());
static RE_ALLOWED_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^,\s]+").unwrap());

/// Where a field tag writes and how its group is chosen.
pub struct FieldTag {
    /// Key under `local`, e.g. `parameter`, `query`.
    section: &'static str,
    default_group: &'static str,
    /// Grouped sections write to `local.<section>.fields.<group>`;
    /// ungrouped ones push straight onto `local.<section>`.
    grouped: bool,
    /// Boolean fields carry a `checked` flag.
    checkbox: bool,
    usage: &'static str,
}

impl FieldTag {
    pub const fn grouped(section: &'static str, default_group: &'static str, usage: &'static str) -> Self {
        Self {
            section,
            default_group,
            grouped: true,
            checkbox: false,
            usage,
        }
    }

    pub const fn flat(section: &'static str, default_group: &'static str, usage: &'static str) -> Self {
        Self {
            section,
            default_group,
            grouped: false,
            checkbox: false,
            usage,
        }
    }

    pub const fn with_checkbox(mut self) -> Self {
        self.checkbox = true;
        self
    }
}

fn allowed_values(raw: &str) -> Vec<Value> {
    let re: &Regex = match raw.chars().next() {
        Some('"') => &RE_ALLOWED_DOUBLE,
        Some('\'') => &RE_ALLOWED_SINGLE,
        _ => &RE_ALLOWED_BARE,
    };
    re.find_iter(raw)
        .map(|m| Value::String(m.as_str().to_string()))
        .collect()
}

impl TagParser for FieldTag {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ParameterError::new("No arguments found.", self.usage));
        }
        let caps = RE_FIELD
            .captures(content)
            .ok_or_else(|| ParameterError::new("Malformed field signature.", self.usage))?;

        let text = |i: usize| caps.get(i).map(|m| m.as_str());
        let group = text(1).unwrap_or(self.default_group);
        let kind = text(2);
        let field = text(6).unwrap_or("");
        let default_value = text(7).or(text(8)).or(text(9)).filter(|v| !v.is_empty());

        let mut fragment = Map::new();
        fragment.insert("group".into(), group.into());
        if let Some(kind) = kind {
            fragment.insert("type".into(), kind.into());
        }
        if let Some(size) = text(3) {
            fragment.insert("size".into(), size.into());
        }
        if let Some(raw) = text(4) {
            fragment.insert("allowedValues".into(), Value::Array(allowed_values(raw)));
        }
        fragment.insert(
            "optional".into(),
            text(5).is_some_and(|m| m.starts_with('[')).into(),
        );
        fragment.insert("field".into(), field.into());
        fragment.insert("isArray".into(), kind.is_some_and(|k| k.contains("[]")).into());
        if let Some(default_value) = default_value {
            fragment.insert("defaultValue".into(), default_value.into());
        }
        fragment.insert(
            "description".into(),
            unindent(text(10).unwrap_or("")).into(),
        );

        if self.checkbox && kind.is_some_and(|k| k.eq_ignore_ascii_case("boolean")) {
            let checked = default_value.is_some_and(|d| d != "false");
            fragment.insert("checked".into(), checked.into());
        }

        Ok(Some(Value::Object(fragment)))
    }

    fn path(&self, fragment: &Value) -> TargetPath {
        let base = TargetPath::local().child(self.section);
        if !self.grouped {
            return base;
        }
        let group = fragment
            .get("group")
            .and_then(Value::as_str)
            .unwrap_or(self.default_group);
        base.child("fields").child(group)
    }

    fn method(&self) -> Method {
        Method::Push
    }

    fn markdown_fields(&self) -> &[&'static str] {
        &["description"]
    }
}
