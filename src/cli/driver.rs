//! Command execution for the typewiz binary.
//!
//! Relative paths on the command line and in snapshots resolve against the
//! working directory unless the configuration names a root directory.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::args::{CliArgs, Command};
use super::reporter::Reporter;
use crate::apply_types::{apply_types, read_type_info};
use crate::compiler_helper::{CompilerOptions, Program};
use crate::configuration::{Configuration, find_config_file};
use crate::instrument::instrument_with_program;
use crate::type_coverage::type_coverage;

pub fn run(args: &CliArgs, cwd: &Path, out: &mut dyn Write) -> Result<()> {
    let config = load_configuration(args.config.as_deref(), cwd)?;
    let reporter = Reporter::new(!args.no_color);
    match &args.command {
        Command::Instrument {
            files,
            output,
            inplace,
        } => instrument_files(&config, cwd, files, output.as_deref(), *inplace, &reporter, out),
        Command::ApplyTypes { collected, prefix } => {
            apply_collected_types(&config, cwd, collected, prefix.clone())
        }
        Command::Coverage { project, json } => {
            report_coverage(&config, cwd, project.as_deref(), *json, &reporter, out)
        }
    }
}

/// The configuration named on the command line, else the nearest
/// `typewiz.json`, else the defaults.
pub fn load_configuration(explicit: Option<&Path>, cwd: &Path) -> Result<Configuration> {
    let path = match explicit {
        Some(path) => Some(cwd.join(path)),
        None => find_config_file(cwd),
    };
    let Some(path) = path else {
        debug!("no typewiz.json found");
        return Ok(Configuration::default());
    };
    Configuration::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn with_root_dir(mut compiler: CompilerOptions, cwd: &Path) -> CompilerOptions {
    if compiler.root_dir.is_none() {
        compiler.root_dir = Some(cwd.to_path_buf());
    }
    compiler
}

fn instrument_files(
    config: &Configuration,
    cwd: &Path,
    files: &[PathBuf],
    output: Option<&Path>,
    inplace: bool,
    reporter: &Reporter,
    out: &mut dyn Write,
) -> Result<()> {
    if output.is_some() && files.len() > 1 {
        bail!("--output takes exactly one input file, got {}", files.len());
    }
    let mut options = config.instrument_options();
    options.compiler = with_root_dir(options.compiler, cwd);
    let program = if options.instrument_implicit_this {
        Program::from_options(&options.compiler).context("failed to load the TypeScript project")?
    } else {
        None
    };

    for file in files {
        let path = cwd.join(file);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = file.to_string_lossy();
        let instrumented = instrument_with_program(&source, &name, &options, program.as_ref())
            .with_context(|| format!("failed to instrument {}", path.display()))?;

        let destination = if inplace {
            Some(path.clone())
        } else {
            output.map(|output| cwd.join(output))
        };
        match destination {
            Some(destination) => {
                std::fs::write(&destination, instrumented)
                    .with_context(|| format!("failed to write {}", destination.display()))?;
                writeln!(out, "{}", reporter.format_written(&destination))?;
            }
            None => writeln!(out, "{instrumented}")?,
        }
    }
    Ok(())
}

fn apply_collected_types(
    config: &Configuration,
    cwd: &Path,
    collected: &Path,
    prefix: Option<String>,
) -> Result<()> {
    let mut options = config.apply_types_options();
    options.compiler = with_root_dir(options.compiler, cwd);
    if prefix.is_some() {
        options.prefix = prefix;
    }
    let path = cwd.join(collected);
    let type_info = read_type_info(&path)?;
    apply_types(&type_info, &options).context("failed to apply types")
}

fn report_coverage(
    config: &Configuration,
    cwd: &Path,
    project: Option<&Path>,
    json: bool,
    reporter: &Reporter,
    out: &mut dyn Write,
) -> Result<()> {
    let mut compiler = with_root_dir(config.compiler_options(), cwd);
    if let Some(project) = project {
        let project = cwd.join(project);
        compiler.ts_config = Some(if project.is_dir() {
            project.join("tsconfig.json")
        } else {
            project
        });
    }
    let coverage = type_coverage(&compiler).context("failed to compute type coverage")?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&coverage)?)?;
    } else {
        writeln!(out, "{}", reporter.format_coverage(&coverage))?;
    }
    Ok(())
}
