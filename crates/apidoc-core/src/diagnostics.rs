//! Recorded diagnostics: warnings, skipped fragments and conflicts.

use serde::Serialize;
use std::fmt;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A tag's content was rejected by its parser, or its fragment could not be applied.
    ParseError,
    /// No parser is registered for the tag.
    UnknownTag,
    /// `@apiUse` names a definition that is not in the pool.
    UnresolvedReference,
    /// Definitions that use each other; all of them are excluded from the pool.
    CyclicDefinition,
    /// Two blocks share group, name and version; the later one wins.
    DuplicateVersion,
    /// Two `@apiDefine` blocks share name and version; the later one wins.
    DuplicateDefinition,
    /// A `:param` in the url has no matching `@apiParam`.
    UndocumentedUrlParameter,
    /// A mandatory `@apiParam` does not appear in the url.
    UnusedParameter,
}

impl DiagnosticKind {
    pub fn default_severity(self) -> Severity {
        match self {
            Self::ParseError | Self::UnresolvedReference | Self::CyclicDefinition => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded problem with file/block/tag context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            file: None,
            block: None,
            tag: None,
            message: message.into(),
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at_block(mut self, block: usize) -> Self {
        self.block = Some(block);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(block) = self.block {
                write!(f, " (block {})", block)?;
            }
            write!(f, ": ")?;
        }
        if let Some(ref tag) = self.tag {
            write!(f, "@{}: ", tag)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Ordered diagnostic sink. Each pushed entry is also emitted through `tracing`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic),
            Severity::Error => tracing::error!(kind = ?diagnostic.kind, "{}", diagnostic),
        }
        self.0.push(diagnostic);
    }

    /// Append already-logged diagnostics (e.g. collected on a worker thread).
    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let d = Diagnostic::new(DiagnosticKind::UnknownTag, "no parser registered")
            .in_file("src/users.js")
            .at_block(2)
            .with_tag("apiFoo");
        assert_eq!(d.to_string(), "src/users.js (block 2): @apiFoo: no parser registered");
    }

    #[test]
    fn severity_follows_kind() {
        assert_eq!(
            Diagnostic::new(DiagnosticKind::UnresolvedReference, "x").severity,
            Severity::Error
        );
        assert_eq!(
            Diagnostic::new(DiagnosticKind::DuplicateVersion, "x").severity,
            Severity::Warning
        );
    }

    #[test]
    fn has_errors_only_for_error_severity() {
        let mut diags = Diagnostics::default();
        diags.push(Diagnostic::new(DiagnosticKind::UnknownTag, "x"));
        assert!(!diags.has_errors());
        diags.push(Diagnostic::new(DiagnosticKind::ParseError, "y"));
        assert!(diags.has_errors());
        assert_eq!(diags.of_kind(DiagnosticKind::ParseError).count(), 1);
    }
}
