//! Annotated API documentation extractor.
//!
//! Source files go through the tag scanner, the tag registry and the block
//! assembler; whole-run workers expand `@apiUse` definitions and fill in
//! names, groups and sample requests; the grouper sorts versions and diffs
//! them. The result is a [`DocumentModel`] plus [`Diagnostics`].
//!
//! ```no_run
//! use apidoc_core::{run, Options, PackageInfo, SourceFile};
//!
//! let sources = vec![SourceFile::new("notes.js", "/** @api {get} /notes List notes */")];
//! let model = run(&sources, PackageInfo::default(), Options::default()).unwrap();
//! println!("{}", serde_json::to_string_pretty(&model).unwrap());
//! ```

pub mod assemble;
pub mod block;
pub mod context;
pub mod define;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod grouper;
pub mod merge;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod registry;
pub mod sanity;
pub mod scan;
pub mod version;
pub mod worker;

pub use assemble::{ParsedFile, SourceFile};
pub use block::{Block, BlockKind};
pub use context::{Context, Options, PackageInfo};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{ConfigError, ParameterError};
pub use grouper::{ChangeKind, FieldChange, VersionDiff, VersionEntry, VersionedEndpoint};
pub use model::DocumentModel;
pub use pipeline::{run, run_with};
pub use registry::{Method, Registry, TagParser, TargetPath};
pub use version::Version;
