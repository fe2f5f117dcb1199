//! Common types and utilities shared by the typewiz crates.
//!
//! - [`replacement`]: ordered text edits over the original byte offsets of a file
//! - [`hash`]: the content hash that ties observations to one version of a file
//! - [`diagnostics`]: diagnostic records produced by the parser and checker
//! - [`limits`]: recursion and nesting limits

pub mod diagnostics;
pub mod hash;
pub mod limits;
pub mod replacement;

pub use diagnostics::{Diagnostic, DiagnosticCategory, format_message};
pub use hash::content_hash;
pub use replacement::{Replacement, apply_replacements};
