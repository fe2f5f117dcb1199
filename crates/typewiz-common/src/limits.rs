//! Centralized limits shared across the typewiz crates.

// =============================================================================
// Runtime Type Naming
// =============================================================================

/// Nesting depth at which the runtime type namer gives up on a value.
///
/// Cyclic object graphs and pathologically deep values both end here instead
/// of recursing without bound.
pub const MAX_TYPE_NAME_DEPTH: u32 = 5;

// =============================================================================
// Parser / Checker
// =============================================================================

/// Maximum nesting of recursive-descent calls before the parser stops
/// descending and reports the construct as too deeply nested.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 1_000;

/// Maximum depth for resolving the type of nested expressions in the checker.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 200;

/// Maximum `extends` chain followed when loading tsconfig files.
pub const MAX_TSCONFIG_EXTENDS_DEPTH: usize = 32;
