//! Checker options and per-file checking context.

use crate::binder::SymbolId;
use crate::types::Type;
use rustc_hash::{FxHashMap, FxHashSet};
use typewiz_common::Diagnostic;
use typewiz_parser::NodeIndex;

/// Compiler options that influence checking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckerOptions {
    pub no_implicit_this: bool,
    pub strict: bool,
}

impl CheckerOptions {
    /// `noImplicitThis`, either set directly or implied by `strict`.
    #[must_use]
    pub const fn reports_implicit_this(&self) -> bool {
        self.no_implicit_this || self.strict
    }
}

#[derive(Debug, Default)]
pub struct CheckerContext {
    pub options: CheckerOptions,
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) symbol_types: FxHashMap<SymbolId, Type>,
    pub(crate) node_types: FxHashMap<NodeIndex, Type>,
    /// Symbols whose type is being computed; re-entry yields `any`.
    pub(crate) resolving: FxHashSet<SymbolId>,
    pub(crate) depth: u32,
}

impl CheckerContext {
    #[must_use]
    pub fn new(options: CheckerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}
