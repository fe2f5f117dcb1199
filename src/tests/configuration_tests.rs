use super::*;
use std::fs;

fn parse(text: &str) -> Result<Configuration> {
    Configuration::parse(text, Path::new("/project/typewiz.json"))
}

#[test]
fn test_empty_configuration() {
    let config = parse("{}").unwrap();
    assert_eq!(config.common, None);
    let options = config.instrument_options();
    assert!(!options.instrument_call_expressions);
    assert!(!options.instrument_implicit_this);
    assert!(!options.skip_twiz_declarations);
    assert_eq!(config.apply_types_options().prefix, None);
}

#[test]
fn test_full_configuration() {
    let config = parse(
        r#"{
            "common": { "rootDir": "src", "tsConfig": "tsconfig.json" },
            "instrument": {
                "instrumentCallExpressions": true,
                "instrumentImplicitThis": true,
                "skipTwizDeclarations": true
            },
            "applyTypes": { "prefix": "/*auto*/" }
        }"#,
    )
    .unwrap();

    let instrument = config.instrument_options();
    assert!(instrument.instrument_call_expressions);
    assert!(instrument.instrument_implicit_this);
    assert!(instrument.skip_twiz_declarations);
    assert_eq!(
        instrument.compiler,
        CompilerOptions {
            root_dir: Some(PathBuf::from("/project/src")),
            ts_config: Some(PathBuf::from("/project/tsconfig.json")),
        }
    );

    let apply = config.apply_types_options();
    assert_eq!(apply.prefix.as_deref(), Some("/*auto*/"));
    assert_eq!(apply.compiler, instrument.compiler);
}

#[test]
fn test_absolute_paths_are_kept() {
    let config = parse(r#"{ "common": { "tsConfig": "/elsewhere/tsconfig.json" } }"#).unwrap();
    assert_eq!(
        config.compiler_options().ts_config,
        Some(PathBuf::from("/elsewhere/tsconfig.json"))
    );
}

#[test]
fn test_unknown_keys_are_rejected() {
    let err = parse(r#"{ "common": { "rootDir": ".", "foo": 1 } }"#).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
    assert!(err.to_string().contains("foo"));

    let err = parse(r#"{ "extra": {} }"#).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
}

#[test]
fn test_wrong_value_types_are_rejected() {
    let err = parse(r#"{ "instrument": { "instrumentCallExpressions": "yes" } }"#).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigValidation { .. }));
}

#[test]
fn test_invalid_json() {
    let err = parse("{ \"common\": ").unwrap_err();
    assert!(matches!(err, TypewizError::ConfigParse { .. }));
    assert!(err.to_string().contains("/project/typewiz.json"));
}

#[test]
fn test_missing_file_is_empty_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = Configuration::load(&dir.path().join("typewiz.json")).unwrap();
    assert_eq!(config, Configuration::default());
}

#[test]
fn test_find_config_file_walks_up() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a/b/c");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("a/typewiz.json"), "{}").unwrap();

    assert_eq!(
        find_config_file(&nested),
        Some(dir.path().join("a/typewiz.json"))
    );
}

#[test]
fn test_load_resolves_against_config_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typewiz.json");
    fs::write(&path, r#"{ "common": { "tsConfig": "tsconfig.json" } }"#).unwrap();

    let config = Configuration::load(&path).unwrap();
    assert_eq!(
        config.compiler_options().ts_config,
        Some(dir.path().join("tsconfig.json"))
    );
}
