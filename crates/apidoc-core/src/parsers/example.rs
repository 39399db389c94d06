//! `@apiExample`-style tags: `[{type}] title` on the first line, body below.

use super::text::{first_line, following_lines};
use crate::error::ParameterError;
use crate::registry::{Method, TagParser, TargetPath};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static RE_EXAMPLE_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\{\s*([a-zA-Z0-9./\\\[\]_-]+)\s*\}\s*)?(.*)$").unwrap());

pub struct ExampleTag {
    path: &'static str,
}

impl ExampleTag {
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }
}

impl TagParser for ExampleTag {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let body = following_lines(content);
        if body.is_empty() {
            return Ok(None);
        }
        let head = first_line(content);
        let (kind, title) = match RE_EXAMPLE_HEAD.captures(head) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str()).unwrap_or("json").to_string(),
                caps[2].trim().to_string(),
            ),
            None => ("json".to_string(), head.to_string()),
        };
        Ok(Some(json!({
            "title": title,
            "content": body,
            "type": kind,
        })))
    }

    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::parse(self.path)
    }

    fn method(&self) -> Method {
        Method::Push
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_example() {
        let tag = ExampleTag::new("local.examples");
        let fragment = tag
            .parse("{curl} Example usage\n    curl -i http://localhost/user/4711")
            .unwrap()
            .unwrap();
        assert_eq!(
            fragment,
            json!({
                "title": "Example usage",
                "content": "curl -i http://localhost/user/4711",
                "type": "curl"
            })
        );
    }

    #[test]
    fn type_defaults_to_json() {
        let tag = ExampleTag::new("local.success.examples");
        let fragment = tag.parse("Success-Response\n  {\n    \"ok\": true\n  }").unwrap().unwrap();
        assert_eq!(fragment["type"], "json");
        assert_eq!(fragment["content"], "{\n  \"ok\": true\n}");
        assert_eq!(tag.path(&fragment).to_string(), "local.success.examples");
    }

    #[test]
    fn example_without_body_is_a_no_op() {
        let tag = ExampleTag::new("local.examples");
        assert_eq!(tag.parse("{json} Title only").unwrap(), None);
    }
}
