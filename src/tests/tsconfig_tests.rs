use super::*;
use std::fs;

fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

fn names(dir: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| relative_path(dir, f).unwrap())
        .collect()
}

#[test]
fn test_strip_jsonc_keeps_strings() {
    let input = "{\n  // comment\n  \"a\": \"http://x\", /* block */ \"b\": 1\n}";
    let stripped = strip_jsonc(input);
    assert!(!stripped.contains("comment"));
    assert!(!stripped.contains("block"));
    assert!(stripped.contains("\"http://x\""));
}

#[test]
fn test_remove_trailing_commas() {
    assert_eq!(remove_trailing_commas("{\"a\": [1, 2,], }"), "{\"a\": [1, 2] }");
    assert_eq!(remove_trailing_commas("{\"a\": \",}\"}"), "{\"a\": \",}\"}");
}

#[test]
fn test_parse_jsonc_config() {
    let config = parse_tsconfig(
        "{\n  // options\n  \"compilerOptions\": { \"strict\": \"true\", \"target\": \"es2019\", },\n}",
        Path::new("tsconfig.json"),
    )
    .unwrap();
    let options = config.checker_options();
    assert!(options.strict);
    assert!(!options.no_implicit_this);
}

#[test]
fn test_syntax_error_is_parse_error() {
    let err = parse_tsconfig("{ \"compilerOptions\": ", Path::new("bad.json")).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigParse { ref path, .. } if path == Path::new("bad.json")));
}

#[test]
fn test_wrong_shape_is_validation_error() {
    let err = parse_tsconfig("{ \"include\": \"src\" }", Path::new("tsconfig.json")).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
    let err = parse_tsconfig(
        "{ \"compilerOptions\": { \"noImplicitThis\": \"maybe\" } }",
        Path::new("tsconfig.json"),
    )
    .unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = load_tsconfig(&path).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigRead { path: ref p, .. } if *p == path));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_extends_merges_options() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "base.json", r#"{ "compilerOptions": { "noImplicitThis": true } }"#);
    let child = write(
        dir.path(),
        "tsconfig.json",
        r#"{ "extends": "./base", "compilerOptions": { "strict": false }, "include": ["src"] }"#,
    );
    let config = load_tsconfig(&child).unwrap();
    let options = config.checker_options();
    assert!(options.no_implicit_this);
    assert!(!options.strict);
    assert_eq!(config.include, Some(vec!["src".to_string()]));
}

#[test]
fn test_extends_cycle_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.json", r#"{ "extends": "./b.json" }"#);
    let b = write(dir.path(), "b.json", r#"{ "extends": "./a.json" }"#);
    let err = load_tsconfig(&b).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
}

#[test]
fn test_default_include_skips_node_modules() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "");
    write(dir.path(), "src/b.js", "");
    write(dir.path(), "src/readme.md", "");
    write(dir.path(), "types/c.d.ts", "");
    write(dir.path(), "node_modules/dep/index.ts", "");
    let files = discover_source_files(&TsConfig::default(), dir.path()).unwrap();
    assert_eq!(names(dir.path(), &files), vec!["src/a.ts", "src/b.js", "types/c.d.ts"]);
}

#[test]
fn test_files_include_and_exclude() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.ts", "");
    write(dir.path(), "src/a.ts", "");
    write(dir.path(), "src/gen/b.ts", "");
    write(dir.path(), "test/t.ts", "");
    let config = TsConfig {
        files: Some(vec!["main.ts".into(), "missing.ts".into()]),
        include: Some(vec!["src/**/*".into()]),
        exclude: Some(vec!["src/gen".into()]),
        ..TsConfig::default()
    };
    let files = discover_source_files(&config, dir.path()).unwrap();
    assert_eq!(names(dir.path(), &files), vec!["main.ts", "src/a.ts"]);
}

#[test]
fn test_files_without_include_lists_only_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.ts", "");
    write(dir.path(), "other.ts", "");
    let config = TsConfig {
        files: Some(vec!["main.ts".into()]),
        ..TsConfig::default()
    };
    let files = discover_source_files(&config, dir.path()).unwrap();
    assert_eq!(names(dir.path(), &files), vec!["main.ts"]);
}

#[test]
fn test_out_dir_is_excluded_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "");
    write(dir.path(), "dist/a.js", "");
    let config = parse_tsconfig(
        r#"{ "compilerOptions": { "outDir": "dist" } }"#,
        Path::new("tsconfig.json"),
    )
    .unwrap();
    let files = discover_source_files(&config, dir.path()).unwrap();
    assert_eq!(names(dir.path(), &files), vec!["src/a.ts"]);
}

#[test]
fn test_invalid_glob_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = TsConfig {
        include: Some(vec!["src/[".into()]),
        ..TsConfig::default()
    };
    let err = discover_source_files(&config, dir.path()).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
}
