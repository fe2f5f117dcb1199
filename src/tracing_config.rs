//! Tracing configuration for typewiz.
//!
//! Supports three output formats controlled by `TYPEWIZ_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`
//! - `json`: one JSON object per span/event
//!
//! ```bash
//! # Every instrumented site
//! TYPEWIZ_LOG=typewiz::instrument=debug typewiz instrument src/app.ts
//!
//! # Applied files as a tree
//! TYPEWIZ_LOG=info TYPEWIZ_LOG_FORMAT=tree typewiz apply-types collected.json
//!
//! # Checker internals as JSON lines
//! TYPEWIZ_LOG="typewiz_checker=trace" TYPEWIZ_LOG_FORMAT=json typewiz coverage
//! ```
//!
//! The subscriber is only initialised when `TYPEWIZ_LOG` (or `RUST_LOG`) is
//! set, so there is no overhead otherwise.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_ENV: &str = "TYPEWIZ_LOG";
const LOG_FORMAT_ENV: &str = "TYPEWIZ_LOG_FORMAT";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Format named by `value`, case-insensitively. Unknown names fall back
    /// to [`LogFormat::Text`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).map_or(Self::Text, |value| Self::parse(&value))
    }
}

/// `TYPEWIZ_LOG` wins over `RUST_LOG`; both use `RUST_LOG` directive syntax.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        return Some(EnvFilter::builder().parse_lossy(directives));
    }
    std::env::var("RUST_LOG")
        .is_ok()
        .then(EnvFilter::from_default_env)
}

/// Install the global subscriber when `TYPEWIZ_LOG` or `RUST_LOG` is set.
///
/// Output goes to stderr so it never mixes with instrumented code written to
/// stdout. Returns whether a subscriber was installed; a second call, or a
/// call after another subscriber was set, installs nothing.
pub fn init_tracing() -> bool {
    let Some(filter) = build_filter() else {
        return false;
    };

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_names() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }
}
