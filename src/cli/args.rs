use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the typewiz binary.
#[derive(Parser, Debug)]
#[command(
    name = "typewiz",
    version,
    about = "Collect runtime types and write them back into TypeScript source"
)]
pub struct CliArgs {
    /// Path to the typewiz.json configuration file. Defaults to the nearest
    /// typewiz.json in the working directory or one of its parents.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long = "noColor", alias = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Insert type probes into source files.
    Instrument {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Write the instrumented source to this file (stdout by default).
        #[arg(short = 'o', long, conflicts_with = "inplace")]
        output: Option<PathBuf>,

        /// Overwrite the input files.
        #[arg(short = 'p', long)]
        inplace: bool,
    },

    /// Write collected types back into the source files.
    #[command(name = "apply-types", visible_alias = "apply", alias = "applyTypes")]
    ApplyTypes {
        /// Observation snapshot produced by the instrumented program.
        #[arg(value_name = "COLLECTED_TYPES_JSON")]
        collected: PathBuf,

        /// Text placed after the colon of every applied annotation.
        #[arg(short = 'p', long)]
        prefix: Option<String>,
    },

    /// Report how many identifiers have a type other than `any`.
    Coverage {
        /// Path to tsconfig.json or a directory containing it.
        #[arg(short = 'p', long)]
        project: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}
