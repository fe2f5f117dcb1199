//! Binder and lightweight type checker for typewiz.
//!
//! - `binder` - lexical scopes and symbols
//! - `context` - checker options and per-file state
//! - `state` - `CheckerState` and the implicit-`this` check (TS2683)
//! - `expr` / `type_nodes` - expression, declaration and annotation types
//! - `type_api` - type display at a source position
//! - `coverage` - identifier type coverage
//! - `types` - the type model and its TypeScript-style display

pub mod binder;
pub mod context;
pub mod coverage;
pub mod expr;
pub mod state;
pub mod type_api;
pub mod type_nodes;
pub mod types;

pub use binder::{BinderState, ScopeId, Symbol, SymbolId, symbol_flags};
pub use context::{CheckerContext, CheckerOptions};
pub use coverage::TypeCoverage;
pub use state::{CheckerState, this_container};
pub use type_api::find_expression_starting_at;
pub use types::{FunctionType, ParameterType, PropertyType, Type};
