//! `@model Name [title]`

use super::text::first_line;
use crate::error::ParameterError;
use crate::registry::TagParser;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static RE_MODEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)(?:\s+(.+?))?$").unwrap());

pub struct Model;

impl TagParser for Model {
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError> {
        let line = first_line(content);
        if line.is_empty() {
            return Err(ParameterError::new("No arguments found.", "@model Name [title]"));
        }
        let caps = RE_MODEL.captures(line).ok_or_else(|| {
            ParameterError::new("Model name must be a single word.", "@model Name [title]")
        })?;
        Ok(Some(json!({
            "name": &caps[1],
            "title": caps.get(2).map(|m| m.as_str()).unwrap_or(""),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_title() {
        assert_eq!(
            Model.parse("User Complete user entity").unwrap(),
            Some(json!({ "name": "User", "title": "Complete user entity" }))
        );
        assert_eq!(
            Model.parse("Company").unwrap(),
            Some(json!({ "name": "Company", "title": "" }))
        );
    }

    #[test]
    fn rejects_non_word_names() {
        assert!(Model.parse("user-account").is_err());
    }
}
