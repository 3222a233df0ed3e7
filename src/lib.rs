//! gomod-manifest - parser and canonical formatter for go.mod manifests
//!
//! Turns manifest text into a typed [`Manifest`] of statements (module
//! identity, requirements, replacements, exclusions and unknown directives)
//! and writes it back as canonical text.
//!
//! ```
//! use gomod_manifest::{Manifest, StatementKind};
//!
//! let manifest: Manifest = "module m\nrequire a v1\nrequire b v2\n".parse().unwrap();
//! assert_eq!(manifest.len(), 3);
//! assert_eq!(manifest.find(StatementKind::Require).len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod utils;

pub use error::{ManifestError, ModuleRefError, Position};
pub use model::{Manifest, ModuleRef, Statement, StatementKind};
pub use parser::ManifestParser;
