//! Type coverage of a project: the share of identifiers whose type is not
//! `any`.

use crate::compiler_helper::{CompilerOptions, Program};
use crate::error::Result;
use std::path::Path;
use tracing::info;
use typewiz_checker::TypeCoverage;

/// Coverage over every non-declaration file of the configured project.
/// Without a configured tsconfig, `tsconfig.json` in the root directory is
/// used.
pub fn type_coverage(options: &CompilerOptions) -> Result<TypeCoverage> {
    let program = match Program::from_options(options)? {
        Some(program) => program,
        None => {
            let root = options.root_dir.as_deref().unwrap_or(Path::new("."));
            Program::from_tsconfig(&root.join("tsconfig.json"), options.root_dir.as_deref())?
        }
    };
    let coverage = program.type_coverage();
    info!(
        known = coverage.known_types,
        total = coverage.total_types,
        percentage = coverage.percentage,
        "type coverage"
    );
    Ok(coverage)
}

#[cfg(test)]
#[path = "tests/type_coverage_tests.rs"]
mod tests;
