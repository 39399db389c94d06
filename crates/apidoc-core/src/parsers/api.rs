//! Endpoint-family and shared single-value tags.

use super::text::{first_line, following_lines, underscore_whitespace, unindent};
use crate::error::ParameterError;
use crate::registry::{Method, TagParser, TargetPath};
use crate::version::Version;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

// `{type} url title`, type and title optional
static RE_API: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\{(.+?)\})?\s*(\S+?)(?:\s+(.+?))?$").unwrap());

// Definition name, then whatever is left of the first word
static RE_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w:]*)(\S*)(?:\s+(.*))?$").unwrap());

// -- @api ---------------------------------------------------------------------

/// `@api {method} path [title]`
pub struct Api;

impl TagParser for Api {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let line = first_line(content);
        if line.is_empty() {
            return Err(ParameterError::new(
                "No arguments found.",
                "@api {method} path [title]",
            ));
        }
        let caps = RE_API.captures(line).ok_or_else(|| {
            ParameterError::new("Malformed endpoint signature.", "@api {method} path [title]")
        })?;

        let mut fragment = Map::new();
        if let Some(kind) = caps.get(1) {
            fragment.insert("type".into(), json!(kind.as_str().trim()));
        }
        fragment.insert("url".into(), json!(&caps[2]));
        fragment.insert(
            "title".into(),
            json!(caps.get(3).map(|m| m.as_str()).unwrap_or("")),
        );
        Ok(Some(Value::Object(fragment)))
    }
}

// -- Single text values -------------------------------------------------------

/// A tag whose whole content becomes one string key in `local`
/// (`@apiName`, `@apiGroup`, `@apiDescription`, ...).
pub struct TextTag {
    key: &'static str,
    underscore: bool,
    multiline: bool,
    markdown: &'static [&'static str],
}

impl TextTag {
    /// Identifier-like value: one line, whitespace replaced by `_`.
    pub const fn identifier(key: &'static str) -> Self {
        Self {
            key,
            underscore: true,
            multiline: false,
            markdown: &[],
        }
    }

    /// Free text over several lines, rendered as Markdown downstream.
    pub const fn markdown(key: &'static str, markdown: &'static [&'static str]) -> Self {
        Self {
            key,
            underscore: false,
            multiline: true,
            markdown,
        }
    }

    /// Plain single-line value kept as written.
    pub const fn plain(key: &'static str) -> Self {
        Self {
            key,
            underscore: false,
            multiline: false,
            markdown: &[],
        }
    }
}

impl TagParser for TextTag {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let value = if self.multiline {
            unindent(content)
        } else if self.underscore {
            underscore_whitespace(content)
        } else {
            content.trim().to_string()
        };
        if value.is_empty() {
            return Ok(None);
        }
        let mut fragment = Map::new();
        fragment.insert(self.key.into(), Value::String(value));
        Ok(Some(Value::Object(fragment)))
    }

    fn markdown_fields(&self) -> &[&'static str] {
        self.markdown
    }
}

// -- @apiVersion --------------------------------------------------------------

/// `@apiVersion major.minor.patch`
pub struct VersionTag;

impl TagParser for VersionTag {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Version::parse(content).map_err(|_| {
            ParameterError::new("Version format not valid.", "@apiVersion major.minor.patch")
        })?;
        Ok(Some(json!({ "version": content })))
    }

    fn extend_root(&self) -> bool {
        true
    }
}

// -- @apiDefine ---------------------------------------------------------------

/// `@apiDefine name [title]` followed by a description.
pub struct Define;

impl TagParser for Define {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        const USAGE: &str = "@apiDefine name [title]";

        let line = first_line(content);
        if line.is_empty() {
            return Err(ParameterError::new("No arguments found.", USAGE));
        }
        let caps = RE_DEFINE
            .captures(line)
            .ok_or_else(|| ParameterError::new("No arguments found.", USAGE))?;
        if caps[1].is_empty() || !caps[2].is_empty() {
            return Err(ParameterError::new(
                "Name must contain only alphanumeric and colon characters.",
                USAGE,
            ));
        }

        Ok(Some(json!({
            "name": &caps[1],
            "title": caps.get(3).map(|m| m.as_str().trim()).unwrap_or(""),
            "description": following_lines(content),
        })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("global.define")
    }

    fn markdown_fields(&self) -> &[&'static str] {
        &["description"]
    }
}

// -- Name references ----------------------------------------------------------

/// A repeatable tag holding one name, pushed to a list in `local`
/// (`@apiUse`, `@apiPermission`).
pub struct NameRef {
    path: &'static str,
    usage: &'static str,
}

impl NameRef {
    pub const fn new(path: &'static str, usage: &'static str) -> Self {
        Self { path, usage }
    }
}

impl TagParser for NameRef {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let name = first_line(content);
        if name.is_empty() {
            return Err(ParameterError::new("No arguments found.", self.usage));
        }
        Ok(Some(json!({ "name": name })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse(self.path)
    }

    fn method(&self) -> Method {
        Method::Push
    }
}

// -- @apiSampleRequest --------------------------------------------------------

/// `@apiSampleRequest url` (`off` disables sample requests for the block).
pub struct SampleRequest;

impl TagParser for SampleRequest {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let url = content.trim();
        if url.is_empty() {
            return Ok(None);
        }
        Ok(Some(json!({ "url": url })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse("local.sampleRequest")
    }

    fn method(&self) -> Method {
        Method::Push
    }
}

// -- Flags --------------------------------------------------------------------

/// `@apiDeprecated [text]`
pub struct Deprecated;

impl TagParser for Deprecated {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let text = unindent(content);
        if text.is_empty() {
            return Ok(Some(json!({ "deprecated": true })));
        }
        Ok(Some(json!({ "deprecated": { "content": text } })))
    }

    fn markdown_fields(&self) -> &[&'static str] {
        &["deprecated.content"]
    }
}

/// `@apiPrivate`
pub struct Private;

impl TagParser for Private {
    fn parse(&self, _content: &str) -> Result<Option<Value>, ParameterError> {
        Ok(Some(json!({ "private": true })))
    }
}

/// Tags that only steer block selection (`@apiIgnore`) and write nothing.
pub struct Marker;

impl TagParser for Marker {
    fn parse(&self, _content: &str) -> Result<Option<Value>, ParameterError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_signature() {
        let fragment = Api.parse("{get} /user/:id Read user data").unwrap().unwrap();
        assert_eq!(fragment, json!({ "type": "get", "url": "/user/:id", "title": "Read user data" }));
    }

    #[test]
    fn api_without_type_or_title() {
        let fragment = Api.parse("/health").unwrap().unwrap();
        assert_eq!(fragment, json!({ "url": "/health", "title": "" }));
        assert!(Api.parse("   ").is_err());
    }

    #[test]
    fn parse_is_pure() {
        let content = "{post} /notes Create a note";
        assert_eq!(Api.parse(content).unwrap(), Api.parse(content).unwrap());
    }

    #[test]
    fn identifier_text_is_underscored() {
        let group = TextTag::identifier("group");
        assert_eq!(group.parse("User Admin").unwrap(), Some(json!({ "group": "User_Admin" })));
        assert_eq!(group.parse("  ").unwrap(), None);
    }

    #[test]
    fn description_is_unindented() {
        let tag = TextTag::markdown("description", &["description"]);
        let fragment = tag.parse("First\n    second").unwrap().unwrap();
        assert_eq!(fragment["description"], "First\n    second");
        let fragment = tag.parse("\n  one\n  two").unwrap().unwrap();
        assert_eq!(fragment["description"], "one\ntwo");
    }

    #[test]
    fn version_is_validated() {
        assert_eq!(VersionTag.parse("1.10.0").unwrap(), Some(json!({ "version": "1.10.0" })));
        assert!(VersionTag.parse("1.x").is_err());
    }

    #[test]
    fn define_name_title_description() {
        let fragment = Define
            .parse("UserNotFound Error 404\n  The user was not found.")
            .unwrap()
            .unwrap();
        assert_eq!(
            fragment,
            json!({ "name": "UserNotFound", "title": "Error 404", "description": "The user was not found." })
        );
        assert_eq!(Define.path(&fragment).to_string(), "global.define");
    }

    #[test]
    fn define_rejects_bad_names() {
        assert_eq!(Define.parse("").unwrap_err().message, "No arguments found.");
        let err = Define.parse("bad-name").unwrap_err();
        assert!(err.message.starts_with("Name must contain"));
        assert!(Define.parse("admin:read Read access").is_ok());
    }

    #[test]
    fn use_requires_a_name() {
        let tag = NameRef::new("local.use", "@apiUse name");
        assert_eq!(tag.parse("Paging").unwrap(), Some(json!({ "name": "Paging" })));
        assert!(tag.parse("").is_err());
    }

    #[test]
    fn deprecated_with_and_without_text() {
        assert_eq!(Deprecated.parse("").unwrap(), Some(json!({ "deprecated": true })));
        assert_eq!(
            Deprecated.parse("use (#User:GetUserV2)").unwrap(),
            Some(json!({ "deprecated": { "content": "use (#User:GetUserV2)" } }))
        );
    }
}
