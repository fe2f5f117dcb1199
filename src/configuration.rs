//! `typewiz.json`: project-wide defaults for the instrumenter and the
//! applier.
//!
//! ```json
//! {
//!   "common": { "rootDir": ".", "tsConfig": "tsconfig.json" },
//!   "instrument": { "instrumentCallExpressions": true, "instrumentImplicitThis": true },
//!   "applyTypes": { "prefix": "/*auto*/" }
//! }
//! ```
//!
//! Every section is optional and unknown keys are rejected. Relative paths
//! are resolved against the directory holding the configuration file.

use crate::apply_types::ApplyTypesOptions;
use crate::compiler_helper::CompilerOptions;
use crate::error::{Result, TypewizError};
use crate::instrument::InstrumentOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "typewiz.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommonSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_config: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstrumentSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_call_expressions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_implicit_this: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_twiz_declarations: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplyTypesSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<CommonSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<InstrumentSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_types: Option<ApplyTypesSection>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Configuration {
    /// Parse configuration text. `path` labels errors and supplies the base
    /// directory for relative paths.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| TypewizError::ConfigParse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        let mut config: Configuration =
            serde_json::from_value(value).map_err(|err| TypewizError::ConfigValidation {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load a configuration file. A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(TypewizError::ConfigRead {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    fn resolve(&self, value: Option<&String>) -> Option<PathBuf> {
        let value = value?;
        Some(match &self.base_dir {
            Some(base) if !Path::new(value).is_absolute() => base.join(value),
            _ => PathBuf::from(value),
        })
    }

    #[must_use]
    pub fn compiler_options(&self) -> CompilerOptions {
        let common = self.common.clone().unwrap_or_default();
        CompilerOptions {
            root_dir: self.resolve(common.root_dir.as_ref()),
            ts_config: self.resolve(common.ts_config.as_ref()),
        }
    }

    #[must_use]
    pub fn instrument_options(&self) -> InstrumentOptions {
        let section = self.instrument.clone().unwrap_or_default();
        InstrumentOptions {
            instrument_call_expressions: section.instrument_call_expressions.unwrap_or(false),
            instrument_implicit_this: section.instrument_implicit_this.unwrap_or(false),
            skip_twiz_declarations: section.skip_twiz_declarations.unwrap_or(false),
            compiler: self.compiler_options(),
        }
    }

    #[must_use]
    pub fn apply_types_options(&self) -> ApplyTypesOptions {
        ApplyTypesOptions {
            prefix: self.apply_types.as_ref().and_then(|s| s.prefix.clone()),
            compiler: self.compiler_options(),
        }
    }
}

/// Nearest `typewiz.json` in `start_dir` or one of its ancestors.
#[must_use]
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
#[path = "tests/configuration_tests.rs"]
mod tests;
