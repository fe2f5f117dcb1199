use typewiz_checker::{BinderState, CheckerOptions, CheckerState, TypeCoverage};
use typewiz_parser::parse_source;

fn coverage(source: &str) -> TypeCoverage {
    let file = parse_source("test.ts", source);
    let mut binder = BinderState::new();
    binder.bind_source_file(&file.arena, file.root);
    let mut checker = CheckerState::new(&file, &binder, CheckerOptions::default());
    checker.type_coverage()
}

#[test]
fn test_coverage_counts_typed_identifiers() {
    let result = coverage("var f;\nvar g: number;\n");
    assert_eq!(
        result,
        TypeCoverage {
            known_types: 1,
            total_types: 2,
            percentage: 50.0,
        }
    );
}

#[test]
fn test_coverage_skips_function_declaration_names() {
    assert_eq!(coverage("function f() {}"), TypeCoverage::default());
}

#[test]
fn test_coverage_skips_class_declaration_and_constructor_names() {
    let result = coverage("class MyClass {\n    constructor () {}\n}\n");
    assert_eq!(result.total_types, 0);
    assert_eq!(result.known_types, 0);
    assert_eq!(result.percentage, 100.0);
}

#[test]
fn test_coverage_of_references_and_members() {
    // x (declaration), x (use) and `length` are all known.
    let result = coverage("const x = 'abc';\nconst n = x.length;\n");
    assert_eq!(result.total_types, 4);
    assert_eq!(result.known_types, 4);
}

#[test]
fn test_coverage_merge() {
    let mut total = coverage("var a;");
    total.merge(&coverage("var b = 1;"));
    assert_eq!(total.known_types, 1);
    assert_eq!(total.total_types, 2);
    assert_eq!(total.percentage, 50.0);
}

#[test]
fn test_coverage_serializes_camel_case() {
    let json = serde_json::to_value(coverage("var g: number;")).unwrap();
    assert_eq!(json["knownTypes"], 1);
    assert_eq!(json["totalTypes"], 1);
    assert_eq!(json["percentage"], 100.0);
}
