//! Run configuration threaded explicitly through every pipeline stage.

use crate::error::ConfigError;
use crate::version::Version;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Package-level information (the `apidoc.json` object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Base url prepended to relative sample requests. `false` disables it.
    #[serde(
        deserialize_with = "string_or_false",
        skip_serializing_if = "Option::is_none"
    )]
    pub sample_url: Option<String>,
    /// Version assumed for blocks without an explicit `@apiVersion`.
    pub default_version: String,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "0.0.0".to_string(),
            description: "API Documentation".to_string(),
            title: None,
            url: None,
            sample_url: None,
            default_version: "0.0.0".to_string(),
        }
    }
}

fn string_or_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null | Value::Bool(false) => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or false, got {}",
            other
        ))),
    }
}

/// Behaviour switches for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Collect `@apiDefine` blocks and expand `@apiUse` references.
    pub definitions: bool,
    /// Keep blocks marked `@apiPrivate`.
    pub include_private: bool,
    /// Report unknown tags as errors instead of warnings.
    pub strict_tags: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            definitions: true,
            include_private: false,
            strict_tags: false,
        }
    }
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Context {
    package: PackageInfo,
    options: Options,
    default_version: Version,
}

impl Context {
    pub fn new(package: PackageInfo, options: Options) -> Result<Self, ConfigError> {
        let default_version = Version::parse(&package.default_version).map_err(|source| {
            ConfigError::InvalidDefaultVersion {
                value: package.default_version.clone(),
                source,
            }
        })?;
        if matches!(package.sample_url.as_deref(), Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::EmptySampleUrl);
        }
        Ok(Self {
            package,
            options,
            default_version,
        })
    }

    pub fn package(&self) -> &PackageInfo {
        &self.package
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn default_version(&self) -> &Version {
        &self.default_version
    }

    pub fn sample_url(&self) -> Option<&str> {
        self.package.sample_url.as_deref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            package: PackageInfo::default(),
            options: Options::default(),
            default_version: Version::ZERO,
        }
    }
}
