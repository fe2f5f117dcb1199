//! Runtime half of typewiz.
//!
//! Instrumented programs report every probed value to a [`TypeCollector`].
//! The collector names values with a [`TypeNamer`] and accumulates the
//! names per probe site; the resulting [`CollectedTypeInfo`] snapshot is the
//! only thing handed back to the static side.
//!
//! - [`value`]: the runtime value model seen by probes
//! - [`type_name`]: runtime type naming
//! - [`collector`]: the type observation store
//! - [`snapshot`]: wire types for probe options and the observation snapshot

pub mod collector;
pub mod snapshot;
pub mod type_name;
pub mod value;

pub use collector::{ProbeError, TypeCollector};
pub use snapshot::{CollectedTypeInfo, FileTypeInfo, SiteInfo, SiteOptions, TypeDescriptor};
pub use type_name::{NamingFailure, TypeNamer};
pub use value::{ArrayRef, FunctionRef, Getter, ObjectRef, Property, Value, ValueId, WeakValue};
