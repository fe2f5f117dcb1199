//! typewiz: observe the runtime types of a TypeScript program and write them
//! back into its source.
//!
//! The pipeline has three stages:
//!
//! 1. [`instrument`] rewrites a source file so that every untyped parameter,
//!    class field and implicit `this` reports its runtime value to a probe.
//! 2. The instrumented program runs in some execution environment that routes
//!    the probes into a [`TypeCollector`], which names each value and
//!    accumulates the names per site.
//! 3. [`apply_types`] takes the collected snapshot and inserts the observed
//!    types as annotations into the original files.
//!
//! A [`Program`] built from a tsconfig provides the static side: implicit
//! `this` diagnostics for the instrumenter, sharper declared types for the
//! applier, and the [`type_coverage`] report.

pub mod apply_types;
pub mod compiler_helper;
pub mod configuration;
pub mod error;
pub mod instrument;
pub mod tracing_config;
pub mod tsconfig;
pub mod type_coverage;

#[cfg(feature = "cli")]
pub mod cli;

pub use apply_types::{ApplyTypesOptions, apply_types, apply_types_to_file, read_type_info};
pub use compiler_helper::{CompilerOptions, Program};
pub use configuration::{Configuration, find_config_file};
pub use error::{Result, TypewizError};
pub use instrument::{InstrumentOptions, instrument, instrument_with_program};
pub use type_coverage::type_coverage;

pub use typewiz_checker::TypeCoverage;
pub use typewiz_common::{Replacement, apply_replacements, content_hash};
pub use typewiz_runtime::{
    CollectedTypeInfo, FileTypeInfo, NamingFailure, ProbeError, SiteInfo, SiteOptions,
    TypeCollector, TypeDescriptor, TypeNamer, Value,
};
