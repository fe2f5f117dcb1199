//! Type observation store.
//!
//! A [`TypeCollector`] is created by the harness, handed to the execution
//! environment that runs the instrumented program, and read back once with
//! [`TypeCollector::get`]. Probe calls emitted by the instrumenter map onto
//! [`TypeCollector::probe`] and [`TypeCollector::track`].
//!
//! The collector is single-threaded (`!Sync`); one execution writes into one
//! collector.

use crate::snapshot::{CollectedTypeInfo, FileTypeInfo, SiteInfo, SiteOptions, TypeDescriptor};
use crate::type_name::{NamingFailure, TypeNamer};
use crate::value::{Value, ValueId, WeakValue};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A probe failure that must reach the executing program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("exception while naming observed value: {0}")]
    Thrown(String),
    #[error("invalid probe options {json:?}: {message}")]
    InvalidOptions { json: String, message: String },
}

/// Tracked entries are swept for dead values once the table reaches this
/// size; the threshold then doubles with the live count.
const TRACKED_SWEEP_MIN: usize = 64;

/// Declaration site recorded for a tracked value.
#[derive(Clone, Debug)]
struct TrackedOrigin {
    /// Reserves the value's identity without keeping the value alive.
    value: WeakValue,
    file: String,
    offset: u32,
}

#[derive(Debug, Default)]
struct SiteRecord {
    types: IndexSet<TypeDescriptor>,
    options: SiteOptions,
}

#[derive(Debug)]
struct FileRecord {
    hash: String,
    sites: BTreeMap<u32, SiteRecord>,
}

#[derive(Debug, Default)]
struct CollectorState {
    files: IndexMap<String, FileRecord>,
    tracked: FxHashMap<ValueId, TrackedOrigin>,
    next_sweep: usize,
}

impl CollectorState {
    fn sweep_tracked(&mut self) {
        if self.tracked.len() < self.next_sweep.max(TRACKED_SWEEP_MIN) {
            return;
        }
        let before = self.tracked.len();
        self.tracked.retain(|_, origin| origin.value.is_alive());
        self.next_sweep = self.tracked.len() * 2;
        trace!(before, after = self.tracked.len(), "swept tracked values");
    }

    fn file_record(&mut self, filename: &str, file_hash: &str) -> &mut FileRecord {
        self.files
            .entry(filename.to_string())
            .or_insert_with(|| FileRecord {
                hash: file_hash.to_string(),
                sites: BTreeMap::new(),
            })
    }
}

#[derive(Debug, Default)]
pub struct TypeCollector {
    namer: TypeNamer,
    state: RefCell<CollectorState>,
}

impl TypeCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dynamic occurrence of a probe site.
    ///
    /// Values that cannot be named because of re-entrant naming or excessive
    /// nesting are dropped silently; exceptions raised by host code while
    /// naming are returned to the caller.
    pub fn probe(
        &self,
        value: &Value,
        offset: u32,
        filename: &str,
        opts_json: &str,
        file_hash: &str,
    ) -> Result<(), ProbeError> {
        let options = SiteOptions::from_json(opts_json).map_err(|err| ProbeError::InvalidOptions {
            json: opts_json.to_string(),
            message: err.to_string(),
        })?;
        self.state.borrow_mut().file_record(filename, file_hash);

        // No borrow of the state may be held here: getters run while naming
        // and may probe this collector again.
        let name = match self.namer.type_name(value) {
            Ok(name) => name,
            Err(NamingFailure::Thrown(message)) => return Err(ProbeError::Thrown(message)),
            Err(failure) => {
                debug!(filename, offset, %failure, "value not observed");
                return Ok(());
            }
        };

        let mut state = self.state.borrow_mut();
        let declaration = value
            .identity()
            .and_then(|id| state.tracked.get(&id))
            .filter(|origin| origin.value.is_alive())
            .map(|origin| (origin.file.clone(), origin.offset));
        let site = state
            .file_record(filename, file_hash)
            .sites
            .entry(offset)
            .or_insert_with(|| SiteRecord {
                types: IndexSet::new(),
                options,
            });
        let Some(name) = name else {
            return Ok(());
        };
        trace!(filename, offset, type_name = %name, "observed type");
        let descriptor = match declaration {
            Some((file, declared_at)) => TypeDescriptor::Declared(file, declared_at, name),
            None => TypeDescriptor::Name(name),
        };
        site.types.insert(descriptor);
        Ok(())
    }

    /// Remember where an object or function argument was passed from, keyed
    /// by identity. Primitives are not tracked, and tracking does not keep a
    /// value alive. The value is returned so the call can wrap the original
    /// argument expression.
    pub fn track(&self, value: Value, filename: &str, offset: u32, file_hash: &str) -> Value {
        let mut state = self.state.borrow_mut();
        state.file_record(filename, file_hash);
        if let (Some(id), Some(weak)) = (value.identity(), value.downgrade()) {
            state.sweep_tracked();
            state.tracked.insert(
                id,
                TrackedOrigin {
                    value: weak,
                    file: filename.to_string(),
                    offset,
                },
            );
        }
        value
    }

    /// Number of tracked values that are still alive.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        let state = self.state.borrow();
        state.tracked.values().filter(|origin| origin.value.is_alive()).count()
    }

    /// Snapshot of everything observed so far. Does not clear the collector.
    #[must_use]
    pub fn get(&self) -> CollectedTypeInfo {
        let state = self.state.borrow();
        let files = state
            .files
            .iter()
            .map(|(name, record)| {
                let sites = record
                    .sites
                    .iter()
                    .map(|(&offset, site)| {
                        let info = SiteInfo {
                            types: site.types.iter().cloned().collect(),
                            options: site.options.clone(),
                        };
                        (offset, info)
                    })
                    .collect();
                let info = FileTypeInfo {
                    hash: record.hash.clone(),
                    sites,
                };
                (name.clone(), info)
            })
            .collect();
        CollectedTypeInfo { files }
    }

    /// The snapshot as pretty-printed JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        self.get().to_json_pretty()
    }

    /// Forget all observations and tracked values.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.files.clear();
        state.tracked.clear();
        state.next_sweep = 0;
    }

    /// Name a value with this collector's namer.
    pub fn type_name(&self, value: &Value) -> Result<Option<String>, NamingFailure> {
        self.namer.type_name(value)
    }
}

#[cfg(test)]
#[path = "tests/collector_tests.rs"]
mod tests;
