use clap::Parser;
use std::fs;
use std::path::Path;

use super::args::CliArgs;
use super::driver::{load_configuration, run};
use crate::content_hash;

fn run_cli(cwd: &Path, argv: &[&str]) -> anyhow::Result<String> {
    let mut full = vec!["typewiz", "--noColor"];
    full.extend_from_slice(argv);
    let args = CliArgs::try_parse_from(full)?;
    let mut out = Vec::new();
    run(&args, cwd, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn instrument_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let source = "function greet(c) { return c; }";
    fs::write(dir.path().join("greet.ts"), source).unwrap();

    let output = run_cli(dir.path(), &["instrument", "greet.ts"]).unwrap();
    assert!(output.starts_with("declare function $_$twiz("));
    assert!(output.contains("{$_$twiz(c,16,\"greet.ts\",\"{}\","));
    assert_eq!(fs::read_to_string(dir.path().join("greet.ts")).unwrap(), source);
}

#[test]
fn instrument_in_place_honours_configuration() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("typewiz.json"),
        r#"{ "instrument": { "skipTwizDeclarations": true, "instrumentCallExpressions": true } }"#,
    )
    .unwrap();
    fs::write(dir.path().join("main.ts"), "run(config);").unwrap();

    let output = run_cli(dir.path(), &["instrument", "main.ts", "--inplace"]).unwrap();
    assert_eq!(output.trim(), format!("wrote {}", dir.path().join("main.ts").display()));
    let instrumented = fs::read_to_string(dir.path().join("main.ts")).unwrap();
    assert!(instrumented.starts_with("run($_$twiz.track(config,\"main.ts\",4,"));
}

#[test]
fn instrument_output_needs_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_cli(dir.path(), &["instrument", "a.ts", "b.ts", "-o", "out.ts"]).unwrap_err();
    assert!(err.to_string().contains("exactly one input file"));
}

#[test]
fn apply_types_with_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let source = "function greet(c) { return c; }";
    fs::write(dir.path().join("greet.ts"), source).unwrap();
    let collected = format!(
        r#"{{ "greet.ts": {{ "hash": "{}", "16": {{ "types": ["string"] }} }} }}"#,
        content_hash(source)
    );
    fs::write(dir.path().join("collected.json"), collected).unwrap();

    run_cli(dir.path(), &["apply", "collected.json", "--prefix", "/*auto*/"]).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("greet.ts")).unwrap(),
        "function greet(c: /*auto*/string) { return c; }"
    );
}

#[test]
fn apply_types_reports_hash_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("greet.ts"), "function greet(c) {}").unwrap();
    fs::write(
        dir.path().join("collected.json"),
        r#"{ "greet.ts": { "hash": "stale", "16": { "types": ["string"] } } }"#,
    )
    .unwrap();

    let err = run_cli(dir.path(), &["applyTypes", "collected.json"]).unwrap_err();
    assert!(format!("{err:#}").contains("hash mismatch for greet.ts"));
}

#[test]
fn coverage_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();
    fs::write(dir.path().join("app/tsconfig.json"), "{}").unwrap();
    fs::write(dir.path().join("app/a.ts"), "var f;\nvar g: number;\n").unwrap();

    let text = run_cli(dir.path(), &["coverage", "--project", "app"]).unwrap();
    assert_eq!(text.trim(), "1 of 2 identifiers have a known type (50.00%)");

    let json = run_cli(dir.path(), &["coverage", "-p", "app/tsconfig.json", "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["knownTypes"], 1);
    assert_eq!(value["totalTypes"], 2);
}

#[test]
fn explicit_configuration_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tw.json"), r#"{ "instrument": { "bogus": true } }"#).unwrap();
    let err = load_configuration(Some(Path::new("tw.json")), dir.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("tw.json"));
    assert!(message.contains("bogus"));
}

#[test]
fn missing_configuration_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_configuration(None, dir.path()).unwrap();
    assert_eq!(config, crate::Configuration::default());
}
