use super::*;
use std::fs;
use typewiz_common::diagnostics::diagnostic_codes;

fn strict() -> CheckerOptions {
    CheckerOptions {
        strict: true,
        ..CheckerOptions::default()
    }
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path(Path::new("./src/../src/a.ts")), "src/a.ts");
    assert_eq!(normalize_path(Path::new("../lib/b.ts")), "../lib/b.ts");
    assert_eq!(normalize_path(Path::new("/root/./x/../y.ts")), "/root/y.ts");
    assert_eq!(normalize_path(Path::new("a/b/../../../c.ts")), "../c.ts");
}

#[test]
fn test_from_options_without_tsconfig() {
    let program = Program::from_options(&CompilerOptions::default()).unwrap();
    assert!(program.is_none());
}

#[test]
fn test_in_memory_program_queries() {
    let source = "function f(a) {}\nconst arr: string[] = [];\nf(arr);";
    let program = Program::from_sources(CheckerOptions::default(), [("./main.ts", source)]);

    assert_eq!(program.file_names().collect::<Vec<_>>(), vec!["main.ts"]);
    assert!(program.source_file("main.ts").is_some());
    assert!(program.source_file("other.ts").is_none());

    let offset = source.rfind("arr").unwrap() as u32;
    assert_eq!(
        program.type_at_position("main.ts", offset).unwrap().as_deref(),
        Some("string[]")
    );
}

#[test]
fn test_missing_file_is_reported() {
    let program = Program::from_sources(CheckerOptions::default(), [("main.ts", "")]);
    let err = program.semantic_diagnostics("gone.ts").unwrap_err();
    assert!(matches!(err, TypewizError::FileNotFound(ref name) if name == "gone.ts"));
    assert!(matches!(
        program.type_at_position("gone.ts", 0),
        Err(TypewizError::FileNotFound(_))
    ));
}

#[test]
fn test_semantic_diagnostics_follow_options() {
    let source = "function greet() { return this.text; }";
    let relaxed = Program::from_sources(CheckerOptions::default(), [("a.ts", source)]);
    assert!(relaxed.semantic_diagnostics("a.ts").unwrap().is_empty());

    let program = Program::from_sources(strict(), [("a.ts", source)]);
    let diagnostics = program.semantic_diagnostics("a.ts").unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::THIS_IMPLICITLY_HAS_TYPE_ANY);
    assert_eq!(diagnostics[0].start, source.find("this").unwrap() as u32);
}

#[test]
fn test_coverage_skips_declaration_files() {
    let program = Program::from_sources(
        CheckerOptions::default(),
        [
            ("a.ts", "var f;\nvar g: number;\n"),
            ("globals.d.ts", "declare var h;\n"),
        ],
    );
    assert_eq!(
        program.type_coverage(),
        TypeCoverage {
            known_types: 1,
            total_types: 2,
            percentage: 50.0,
        }
    );
}

#[test]
fn test_program_from_tsconfig() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::write(
        root.join("tsconfig.json"),
        "{\n  // project\n  \"compilerOptions\": { \"noImplicitThis\": true },\n}\n",
    )
    .unwrap();
    fs::write(root.join("src/a.ts"), "function f() { return this; }").unwrap();
    fs::write(root.join("node_modules/dep/index.ts"), "export {};").unwrap();

    let program = Program::from_options(&CompilerOptions {
        root_dir: Some(root.to_path_buf()),
        ts_config: Some(PathBuf::from("tsconfig.json")),
    })
    .unwrap()
    .expect("tsconfig configured");

    assert!(program.options().no_implicit_this);
    assert_eq!(program.file_names().count(), 1);
    assert!(program.source_file("src/a.ts").is_some());
    assert!(program.source_file("./src/../src/a.ts").is_some());
    assert_eq!(program.semantic_diagnostics("src/a.ts").unwrap().len(), 1);
}

#[test]
fn test_missing_tsconfig_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsconfig.json");
    let err = Program::from_tsconfig(&path, None).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigRead { .. }));
}

#[test]
fn test_malformed_tsconfig_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsconfig.json");
    fs::write(&path, "{ \"compilerOptions\": ").unwrap();
    let err = Program::from_tsconfig(&path, None).unwrap_err();
    assert!(matches!(err, TypewizError::ConfigParse { .. }));
    assert!(err.to_string().contains("tsconfig.json"));
}
