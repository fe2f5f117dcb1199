//! tsconfig.json loading: JSONC parsing, `extends` chains and the project
//! file set.

use crate::error::{Result, TypewizError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use typewiz_checker::CheckerOptions;
use typewiz_common::limits::MAX_TSCONFIG_EXTENDS_DEPTH;
use walkdir::WalkDir;

/// Extensions of files that belong to a program.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js"];

const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<TsCompilerOptions>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// The compiler options typewiz reads. Everything else in
/// `compilerOptions` is ignored.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsCompilerOptions {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_implicit_this: Option<bool>,
    #[serde(default)]
    pub out_dir: Option<String>,
}

impl TsConfig {
    #[must_use]
    pub fn checker_options(&self) -> CheckerOptions {
        let options = self.compiler_options.as_ref();
        CheckerOptions {
            no_implicit_this: options.and_then(|o| o.no_implicit_this).unwrap_or(false),
            strict: options.and_then(|o| o.strict).unwrap_or(false),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse tsconfig text. `path` only labels errors.
pub fn parse_tsconfig(source: &str, path: &Path) -> Result<TsConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let value: serde_json::Value =
        serde_json::from_str(&normalized).map_err(|err| TypewizError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    serde_json::from_value(value).map_err(|err| TypewizError::ConfigValidation {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Load a tsconfig file and everything it `extends`.
pub fn load_tsconfig(path: &Path) -> Result<TsConfig> {
    let mut visited = FxHashSet::default();
    load_tsconfig_inner(path, &mut visited)
}

fn load_tsconfig_inner(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        return Err(TypewizError::ConfigValidation {
            path: path.to_path_buf(),
            message: format!("tsconfig extends cycle detected at {}", canonical.display()),
        });
    }
    if visited.len() > MAX_TSCONFIG_EXTENDS_DEPTH {
        return Err(TypewizError::ConfigValidation {
            path: path.to_path_buf(),
            message: format!("tsconfig extends chain is deeper than {MAX_TSCONFIG_EXTENDS_DEPTH}"),
        });
    }

    let source = std::fs::read_to_string(path).map_err(|err| TypewizError::ConfigRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let mut config = parse_tsconfig(&source, path)?;

    if let Some(extends) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends);
        debug!(config = %path.display(), base = %base_path.display(), "following tsconfig extends");
        let base = load_tsconfig_inner(&base_path, visited)?;
        config = merge_configs(base, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current_path: &Path, extends: &str) -> PathBuf {
    let base_dir = current_path.parent().unwrap_or_else(|| Path::new(""));
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    if candidate.is_absolute() {
        candidate
    } else {
        base_dir.join(candidate)
    }
}

fn merge_configs(base: TsConfig, child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options) {
        (Some(base_opts), Some(child_opts)) => Some(TsCompilerOptions {
            strict: child_opts.strict.or(base_opts.strict),
            no_implicit_this: child_opts.no_implicit_this.or(base_opts.no_implicit_this),
            out_dir: child_opts.out_dir.or(base_opts.out_dir),
        }),
        (base_opts, child_opts) => child_opts.or(base_opts),
    };

    TsConfig {
        extends: None,
        compiler_options,
        include: child.include.or(base.include),
        exclude: child.exclude.or(base.exclude),
        files: child.files.or(base.files),
    }
}

// =============================================================================
// File discovery
// =============================================================================

/// The project's source files, relative references resolved against
/// `base_dir`: `files` first, then every file under `base_dir` matched by
/// `include` (default `**/*`) and not by `exclude`.
pub fn discover_source_files(config: &TsConfig, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let config_path = base_dir.to_path_buf();
    let mut result = Vec::new();
    let mut seen = FxHashSet::default();

    for file in config.files.iter().flatten() {
        let path = base_dir.join(file);
        if path.is_file() {
            if seen.insert(path.clone()) {
                result.push(path);
            }
        } else {
            warn!(file = %path.display(), "file listed in tsconfig does not exist");
        }
    }

    let include_patterns: Vec<String> = match (&config.include, &config.files) {
        (Some(include), _) => include.clone(),
        (None, Some(_)) => Vec::new(),
        (None, None) => vec!["**/*".to_string()],
    };
    if include_patterns.is_empty() {
        return Ok(result);
    }

    let mut exclude_patterns: Vec<String> = match &config.exclude {
        Some(exclude) => exclude.clone(),
        None => DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
    };
    if config.exclude.is_none() {
        if let Some(out_dir) = config.compiler_options.as_ref().and_then(|o| o.out_dir.clone()) {
            exclude_patterns.push(out_dir);
        }
    }

    let include = build_glob_set(&include_patterns, false, &config_path)?;
    let exclude = build_glob_set(&exclude_patterns, true, &config_path)?;

    let walker = WalkDir::new(base_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !relative_path(base_dir, entry.path()).is_some_and(|rel| exclude.is_match(rel))
        });
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }
        let Some(rel) = relative_path(base_dir, entry.path()) else {
            continue;
        };
        if include.is_match(&rel) && !exclude.is_match(&rel) {
            let path = entry.path().to_path_buf();
            if seen.insert(path.clone()) {
                result.push(path);
            }
        }
    }
    Ok(result)
}

#[must_use]
pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// `path` relative to `base`, with `/` separators.
fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<&str> = rel.iter().filter_map(|part| part.to_str()).collect();
    Some(parts.join("/"))
}

/// Compile tsconfig patterns. A pattern without wildcards or a file
/// extension names a directory and matches everything below it.
fn build_glob_set(patterns: &[String], directories_match_self: bool, config_path: &Path) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        let mut expanded = vec![pattern.to_string()];
        let is_literal = !pattern.contains(['*', '?', '[']);
        if is_literal && Path::new(pattern).extension().is_none() {
            expanded = vec![format!("{pattern}/**/*")];
            if directories_match_self {
                expanded.push(pattern.to_string());
            }
        }
        for glob in expanded {
            let glob = GlobBuilder::new(&glob)
                .literal_separator(true)
                .build()
                .map_err(|err| TypewizError::ConfigValidation {
                    path: config_path.to_path_buf(),
                    message: format!("invalid pattern {glob:?}: {err}"),
                })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|err| TypewizError::ConfigValidation {
        path: config_path.to_path_buf(),
        message: err.to_string(),
    })
}

// =============================================================================
// JSONC
// =============================================================================

/// Remove `//` and `/* */` comments outside strings, keeping line breaks.
pub(crate) fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Drop commas that directly precede `}` or `]`.
pub(crate) fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars.clone().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
#[path = "tests/tsconfig_tests.rs"]
mod tests;
