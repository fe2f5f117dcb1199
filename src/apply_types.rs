//! Type application: write observed types back into the original source.

use crate::compiler_helper::{CompilerOptions, Program};
use crate::error::{Result, TypewizError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};
use typewiz_common::{Replacement, apply_replacements, content_hash};
use typewiz_runtime::{CollectedTypeInfo, FileTypeInfo, TypeDescriptor};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyTypesOptions {
    /// Text placed after the colon of every applied annotation, e.g. a
    /// marker comment such as `/*auto*/`.
    pub prefix: Option<String>,
    pub compiler: CompilerOptions,
}

/// Read an observation snapshot written by the collector.
pub fn read_type_info(path: &Path) -> Result<CollectedTypeInfo> {
    let text = std::fs::read_to_string(path).map_err(|err| TypewizError::io(path, err))?;
    CollectedTypeInfo::from_json(&text)
        .map_err(|err| TypewizError::InvalidTypeInfo(format!("{}: {err}", path.display())))
}

/// Apply the observed types to every file in `type_info`.
///
/// Every file is read, checked against its recorded hash and rewritten in
/// memory before the first one is written, so a stale file aborts the run
/// without touching any file.
pub fn apply_types(type_info: &CollectedTypeInfo, options: &ApplyTypesOptions) -> Result<()> {
    let program = Program::from_options(&options.compiler)?;
    let mut outputs: Vec<(PathBuf, String)> = Vec::new();

    for (file, file_info) in type_info.iter() {
        let path = source_path(options.compiler.root_dir.as_deref(), file);
        let source = std::fs::read_to_string(&path).map_err(|err| TypewizError::io(&path, err))?;
        let actual = content_hash(&source);
        if actual != file_info.hash {
            return Err(TypewizError::HashMismatch {
                file: file.clone(),
                expected: file_info.hash.clone(),
                actual,
            });
        }
        match apply_types_to_file(&source, file_info, options, program.as_ref())? {
            Some(updated) => outputs.push((path, updated)),
            None => debug!(file = %file, "no types to apply"),
        }
    }

    for (path, contents) in outputs {
        std::fs::write(&path, contents).map_err(|err| TypewizError::io(&path, err))?;
        info!(file = %path.display(), "applied types");
    }
    Ok(())
}

fn source_path(root_dir: Option<&Path>, file: &str) -> PathBuf {
    match root_dir {
        Some(root) if Path::new(file).is_relative() => root.join(file),
        _ => PathBuf::from(file),
    }
}

/// Annotate one file's source with its observed types. `None` when no site
/// produced an annotation.
pub fn apply_types_to_file(
    source: &str,
    file_info: &FileTypeInfo,
    options: &ApplyTypesOptions,
    program: Option<&Program>,
) -> Result<Option<String>> {
    let prefix = options.prefix.as_deref().unwrap_or("");
    let mut replacements = Vec::new();

    for (&offset, site) in &file_info.sites {
        let is_optional = offset
            .checked_sub(1)
            .and_then(|before| source.as_bytes().get(before as usize))
            == Some(&b'?');

        let mut names = Vec::with_capacity(site.types.len());
        for descriptor in &site.types {
            names.push(resolve_type_name(descriptor, program)?);
        }
        names.retain(|name| !name.is_empty() && !(is_optional && name == "undefined"));
        names.sort();
        names.dedup();
        if names.is_empty() {
            continue;
        }

        let mut suffix = "";
        if let Some((open, _)) = site.options.parens {
            replacements.push(Replacement::insert(open, "("));
            suffix = ")";
        }
        if site.options.this_needs_comma {
            suffix = ", ";
        }
        let this_prefix = if site.options.this_type { "this" } else { "" };
        let annotation = format!("{this_prefix}: {prefix}{}{suffix}", names.join("|"));
        trace!(offset, %annotation, "annotate site");
        replacements.push(Replacement::insert(offset, annotation));
    }

    if replacements.is_empty() {
        return Ok(None);
    }
    Ok(Some(apply_replacements(source, replacements)))
}

/// Name to write for one observation. A value tracked from a declaration
/// takes the declaration's static type unless the checker only knows `any`.
fn resolve_type_name(descriptor: &TypeDescriptor, program: Option<&Program>) -> Result<String> {
    if let (TypeDescriptor::Declared(file, offset, name), Some(program)) = (descriptor, program) {
        return Ok(match program.type_at_position(file, *offset)? {
            Some(found) if found != "any" => found,
            _ => name.clone(),
        });
    }
    Ok(descriptor.type_name().to_string())
}

#[cfg(test)]
#[path = "tests/apply_types_tests.rs"]
mod tests;
