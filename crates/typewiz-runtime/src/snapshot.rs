//! Wire types shared by the instrumenter, the observation store and the
//! type applier.
//!
//! The observation snapshot is a JSON object mapping each file name to its
//! record:
//!
//! ```json
//! {
//!   "src/greet.ts": {
//!     "hash": "9f86d08...",
//!     "15": { "types": ["string", ["src/main.ts", 40, "string[]"]], "arrow": true }
//!   }
//! }
//! ```
//!
//! Offset keys are decimal byte offsets into the uninstrumented file; each
//! site holds its observed type descriptors plus the site options emitted by
//! the instrumenter.

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Site options
// =============================================================================

/// Per-site facts the applier needs to compose an annotation. Serialized
/// with camelCase keys; false and absent fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOptions {
    #[serde(default, skip_serializing_if = "is_false")]
    pub arrow: bool,
    /// Span of an arrow function's sole unparenthesized parameter, which
    /// must be wrapped in parentheses once annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parens: Option<(u32, u32)>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub this_type: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub this_needs_comma: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SiteOptions {
    /// Options as the compact JSON object embedded in probe calls.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse the options JSON received by a probe.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// Type descriptors
// =============================================================================

/// One observed type at a site: a bare type name, or a type name together
/// with the declaration site `(file, offset)` of the observed value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDescriptor {
    Name(String),
    Declared(String, u32, String),
}

impl TypeDescriptor {
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            TypeDescriptor::Name(name) | TypeDescriptor::Declared(_, _, name) => name,
        }
    }
}

// =============================================================================
// Sites and files
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub types: Vec<TypeDescriptor>,
    #[serde(flatten)]
    pub options: SiteOptions,
}

/// Observations for one file, valid only against text with `hash`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileTypeInfo {
    pub hash: String,
    pub sites: BTreeMap<u32, SiteInfo>,
}

impl FileTypeInfo {
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            sites: BTreeMap::new(),
        }
    }
}

impl Serialize for FileTypeInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sites.len() + 1))?;
        map.serialize_entry("hash", &self.hash)?;
        for (offset, site) in &self.sites {
            map.serialize_entry(&offset.to_string(), site)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FileTypeInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FileTypeInfoVisitor)
    }
}

struct FileTypeInfoVisitor;

impl<'de> Visitor<'de> for FileTypeInfoVisitor {
    type Value = FileTypeInfo;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object with a \"hash\" key and decimal offset keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut hash = None;
        let mut sites = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            if key == "hash" {
                if hash.is_some() {
                    return Err(de::Error::duplicate_field("hash"));
                }
                hash = Some(access.next_value::<String>()?);
                continue;
            }
            let offset: u32 = key
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid site offset key {key:?}")))?;
            sites.insert(offset, access.next_value::<SiteInfo>()?);
        }
        let hash = hash.ok_or_else(|| de::Error::missing_field("hash"))?;
        Ok(FileTypeInfo { hash, sites })
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything observed during one execution, keyed by file name in the
/// order files were first seen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedTypeInfo {
    pub files: IndexMap<String, FileTypeInfo>,
}

impl CollectedTypeInfo {
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&FileTypeInfo> {
        self.files.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileTypeInfo)> {
        self.files.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[path = "tests/snapshot_tests.rs"]
mod tests;
