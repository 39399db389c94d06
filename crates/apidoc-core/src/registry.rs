//! Tag registry: maps `@tag` names to parser descriptors.
//!
//! A descriptor ([`TagParser`]) declares *what* a tag produces (`parse`) and
//! *where* it goes (`path` + `method`). The assembler only ever talks to this
//! interface, so parsers never need to know about each other.

use crate::error::ParameterError;
use crate::parsers;
use serde_json::Value;
use std::fmt;

/// How a fragment is attached at its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Overwrite the value (object keys are overwritten individually).
    Insert,
    /// Append to a sequence, creating it when absent.
    Push,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Insert => "insert",
            Method::Push => "push",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Local,
    Global,
}

/// Dot-notation target inside a block, e.g. `local.parameter.fields.Parameter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    root: Root,
    segments: Vec<String>,
}

impl TargetPath {
    pub fn local() -> Self {
        Self {
            root: Root::Local,
            segments: Vec::new(),
        }
    }

    /// Parse `local`, `local.a.b`, `global.define`. A path without a known
    /// root is taken relative to `local`.
    pub fn parse(path: &str) -> Self {
        let mut parts = path.split('.').filter(|p| !p.is_empty());
        let (root, first) = match parts.next() {
            Some("local") => (Root::Local, None),
            Some("global") => (Root::Global, None),
            other => (Root::Local, other),
        };
        Self {
            root,
            segments: first.into_iter().chain(parts).map(str::to_string).collect(),
        }
    }

    /// Append one segment verbatim (it may contain dots or spaces).
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path relative to the root, as written in markdown field patterns.
    pub fn relative(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.root {
            Root::Local => "local",
            Root::Global => "global",
        };
        f.write_str(root)?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// Parser descriptor for one tag.
///
/// `parse` must be pure: the same content always yields the same fragment.
pub trait TagParser: Send + Sync {
    /// `Ok(None)` means the tag is a no-op for this content.
    fn parse(&self, content: &str) -> Result<Option<Value>, ParameterError>;

    /// Target of the fragment. May depend on the fragment (field groups).
    fn path(&self, _fragment: &Value) -> TargetPath {
        TargetPath::local()
    }

    fn method(&self) -> Method {
        Method::Insert
    }

    /// Fragment keys (dot paths) holding Markdown for the rendering stage.
    fn markdown_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Write the fragment's keys into the top level of `local` instead of `path`.
    fn extend_root(&self) -> bool {
        false
    }
}

/// Ordered registration list; later entries shadow earlier ones.
#[derive(Default)]
pub struct Registry {
    entries: Vec<(String, Box<dyn TagParser>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        parsers::register_builtins(&mut registry);
        registry
    }

    /// Register `parser` under `tag`. A later registration with the same
    /// (case-insensitive) name wins at lookup time.
    pub fn register(&mut self, tag: &str, parser: impl TagParser + 'static) {
        self.entries.push((tag.to_ascii_lowercase(), Box::new(parser)));
    }

    pub fn resolve(&self, tag: &str) -> Option<&dyn TagParser> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map(|(_, parser)| parser.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// Number of distinct tag names.
    pub fn len(&self) -> usize {
        let mut names: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}
