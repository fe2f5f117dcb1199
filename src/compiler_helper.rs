//! Program construction and static queries.
//!
//! A [`Program`] is the set of parsed and bound files of one TypeScript
//! project. The instrumenter asks it for implicit-`this` diagnostics, the
//! applier for the declared type of tracked arguments, and the coverage
//! report for identifier types.

use crate::error::{Result, TypewizError};
use crate::tsconfig::{discover_source_files, load_tsconfig};
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info_span};
use typewiz_checker::{BinderState, CheckerOptions, CheckerState, TypeCoverage};
use typewiz_common::Diagnostic;
use typewiz_parser::{ParsedFile, parse_source};

/// Where to find the project's compiler configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Directory relative file names are resolved against. Defaults to the
    /// tsconfig's directory.
    pub root_dir: Option<PathBuf>,
    pub ts_config: Option<PathBuf>,
}

struct ProgramFile {
    parsed: ParsedFile,
    binder: BinderState,
}

impl ProgramFile {
    fn new(name: &str, text: &str) -> Self {
        let parsed = parse_source(name, text);
        let mut binder = BinderState::new();
        binder.bind_source_file(&parsed.arena, parsed.root);
        Self { parsed, binder }
    }

    fn checker(&self, options: CheckerOptions) -> CheckerState<'_> {
        CheckerState::new(&self.parsed, &self.binder, options)
    }
}

pub struct Program {
    files: IndexMap<String, ProgramFile>,
    options: CheckerOptions,
    base_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

impl Program {
    /// The program described by `options`, or `None` when no tsconfig is
    /// configured. A relative tsconfig path is resolved against `root_dir`.
    pub fn from_options(options: &CompilerOptions) -> Result<Option<Program>> {
        let Some(ts_config) = &options.ts_config else {
            return Ok(None);
        };
        let path = match &options.root_dir {
            Some(root) if ts_config.is_relative() => root.join(ts_config),
            _ => ts_config.clone(),
        };
        Self::from_tsconfig(&path, options.root_dir.as_deref()).map(Some)
    }

    /// Load the tsconfig at `path` and parse every file it selects.
    pub fn from_tsconfig(path: &Path, root_dir: Option<&Path>) -> Result<Program> {
        let _span = info_span!("load_program", tsconfig = %path.display()).entered();
        let config = load_tsconfig(path)?;
        let config_dir = parent_dir(path);
        let mut files = IndexMap::new();
        for file in discover_source_files(&config, &config_dir)? {
            let text = std::fs::read_to_string(&file).map_err(|err| TypewizError::io(&file, err))?;
            let name = normalize_path(&file);
            files.insert(name.clone(), ProgramFile::new(&name, &text));
        }
        debug!(files = files.len(), "program loaded");
        Ok(Program {
            files,
            options: config.checker_options(),
            base_dir: Some(root_dir.map_or(config_dir, Path::to_path_buf)),
        })
    }

    /// A program over in-memory sources, keyed by the given names.
    pub fn from_sources<N, T>(options: CheckerOptions, sources: impl IntoIterator<Item = (N, T)>) -> Program
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let files = sources
            .into_iter()
            .map(|(name, text)| {
                let name = normalize_path(Path::new(name.as_ref()));
                let file = ProgramFile::new(&name, text.as_ref());
                (name, file)
            })
            .collect();
        Program {
            files,
            options,
            base_dir: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> CheckerOptions {
        self.options
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    fn file(&self, name: &str) -> Option<&ProgramFile> {
        let path = Path::new(name);
        let key = match &self.base_dir {
            Some(base) if path.is_relative() => normalize_path(&base.join(path)),
            _ => normalize_path(path),
        };
        self.files.get(&key)
    }

    fn require_file(&self, name: &str) -> Result<&ProgramFile> {
        self.file(name)
            .ok_or_else(|| TypewizError::FileNotFound(name.to_string()))
    }

    #[must_use]
    pub fn source_file(&self, name: &str) -> Option<&ParsedFile> {
        self.file(name).map(|file| &file.parsed)
    }

    /// Semantic diagnostics of one file, sorted by start offset.
    pub fn semantic_diagnostics(&self, name: &str) -> Result<Vec<Diagnostic>> {
        let file = self.require_file(name)?;
        let mut checker = file.checker(self.options);
        checker.check_source_file();
        Ok(std::mem::take(&mut checker.ctx.diagnostics))
    }

    /// Display string of the type of the outermost expression starting at
    /// `offset` in file `name`.
    pub fn type_at_position(&self, name: &str, offset: u32) -> Result<Option<String>> {
        let file = self.require_file(name)?;
        let mut checker = file.checker(self.options);
        Ok(checker.type_to_string_at_position(offset))
    }

    /// Identifier coverage over every non-declaration file.
    #[must_use]
    pub fn type_coverage(&self) -> TypeCoverage {
        let mut total = TypeCoverage::default();
        for file in self.files.values() {
            if file.parsed.is_declaration_file() {
                continue;
            }
            let mut checker = file.checker(self.options);
            total.merge(&checker.type_coverage());
        }
        total
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Lexically normalized path text: `.` segments dropped and `..` applied,
/// with `/` separators.
pub(crate) fn normalize_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut rooted = false;
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => parts.push(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    let joined = parts.join("/");
    if rooted { format!("/{joined}") } else { joined }
}

#[cfg(test)]
#[path = "tests/compiler_helper_tests.rs"]
mod tests;
