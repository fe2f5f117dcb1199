use super::*;
use crate::error::TypewizError;
use typewiz_checker::CheckerOptions;

const FILE: &str = "test.ts";

fn without_declarations() -> InstrumentOptions {
    InstrumentOptions {
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    }
}

fn run(source: &str, options: &InstrumentOptions) -> String {
    instrument(source, FILE, options).expect("instrumentation succeeds")
}

/// Expected probe call for `source`, with the site options given as raw JSON.
fn probe(source: &str, value: &str, offset: u32, site_options: &str) -> String {
    format!(
        "$_$twiz({value},{offset},\"{FILE}\",{},{})",
        json_string(site_options),
        json_string(&content_hash(source))
    )
}

fn hash(source: &str) -> String {
    json_string(&content_hash(source))
}

// =============================================================================
// Parameters
// =============================================================================

#[test]
fn test_function_parameter_probe() {
    let source = "function greet(c) { return c; }";
    let expected = format!(
        "function greet(c) {{{}; return c; }}",
        probe(source, "c", 16, "{}")
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_declarations_prepended_only_when_edited() {
    let source = "function greet(c) { return c; }";
    let output = run(source, &InstrumentOptions::default());
    assert!(output.starts_with(TWIZ_DECLARATIONS));
    assert!(output.ends_with("return c; }"));

    let typed = "function greet(c: string) { return c; }";
    assert_eq!(run(typed, &InstrumentOptions::default()), typed);
}

#[test]
fn test_declarations_follow_shebang() {
    let source = "#!/usr/bin/env node\nfunction f(a) {}";
    let output = run(source, &InstrumentOptions::default());
    assert!(output.starts_with(&format!("#!/usr/bin/env node\n{TWIZ_DECLARATIONS}function f(a) {{")));
}

#[test]
fn test_typed_and_initialized_parameters_are_skipped() {
    let source = "function f(a: number, b = 2) { return a + b; }";
    assert_eq!(run(source, &without_declarations()), source);
}

#[test]
fn test_optional_parameter_offset_follows_question_mark() {
    let source = "function f(a?) {}";
    let expected = format!("function f(a?) {{{};}}", probe(source, "a", 13, "{}"));
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_rest_parameter() {
    let source = "function f(...args) {}";
    let expected = format!("function f(...args) {{{};}}", probe(source, "args", 18, "{}"));
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_function_without_body_is_skipped() {
    let source = "declare function f(a);";
    assert_eq!(run(source, &InstrumentOptions::default()), source);
}

#[test]
fn test_function_expression_and_object_method() {
    let source = "const g = function (b) { return b; };\nconst o = { m(a) { return a; } };";
    let output = run(source, &without_declarations());
    assert!(output.contains(&format!("function (b) {{{};", probe(source, "b", 21, "{}"))));
    let a_end = source.find("m(a)").unwrap() as u32 + 3;
    assert!(output.contains(&format!("m(a) {{{};", probe(source, "a", a_end, "{}"))));
}

// =============================================================================
// Arrow functions
// =============================================================================

#[test]
fn test_expression_arrow_without_parens() {
    let source = "const f = x => x * 2;";
    let expected = format!(
        "const f = x => ({},x * 2);",
        probe(source, "x", 11, r#"{"arrow":true,"parens":[10,11]}"#)
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_block_arrow_with_parens() {
    let source = "const f = (a) => { return a; };";
    let expected = format!(
        "const f = (a) => {{{}; return a; }};",
        probe(source, "a", 12, r#"{"arrow":true}"#)
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_arrow_with_several_parameters() {
    let source = "const add = (a, b) => a + b;";
    let output = run(source, &without_declarations());
    let site = r#"{"arrow":true}"#;
    assert!(output.contains(&format!("({},", probe(source, "a", 14, site))));
    assert!(output.contains(&format!("({},", probe(source, "b", 17, site))));
    assert!(output.ends_with(",a + b));"));
}

#[test]
fn test_arrow_returning_const_assertion() {
    let source = "const h = (a) => a as const;";
    let expected = format!(
        "const h = (a) => ({},a as const);",
        probe(source, "a", 12, r#"{"arrow":true}"#)
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

// =============================================================================
// Implicit this
// =============================================================================

fn strict_program(source: &str) -> Program {
    Program::from_sources(
        CheckerOptions {
            strict: true,
            ..CheckerOptions::default()
        },
        [(FILE, source)],
    )
}

fn implicit_this() -> InstrumentOptions {
    InstrumentOptions {
        instrument_implicit_this: true,
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    }
}

#[test]
fn test_implicit_this_probe_with_parameters() {
    let source = "function greet(name) { return this.prefix + name; }";
    let program = strict_program(source);
    let output = instrument_with_program(source, FILE, &implicit_this(), Some(&program)).unwrap();
    let expected = format!(
        "function greet(name) {{{};{}; return this.prefix + name; }}",
        probe(source, "name", 19, "{}"),
        probe(source, "this", 15, r#"{"thisType":true,"thisNeedsComma":true}"#)
    );
    assert_eq!(output, expected);
}

#[test]
fn test_implicit_this_belongs_to_innermost_function() {
    let source = "function outer() { function inner() { return this; } }";
    let program = strict_program(source);
    let output = instrument_with_program(source, FILE, &implicit_this(), Some(&program)).unwrap();
    let inner_probe = probe(source, "this", 34, r#"{"thisType":true}"#);
    assert!(output.contains(&format!("function inner() {{{inner_probe};")));
    assert_eq!(output.matches("$_$twiz(this,").count(), 1);
}

#[test]
fn test_methods_have_no_implicit_this() {
    let source = "class A { m() { return this.x; } }";
    let program = strict_program(source);
    let output = instrument_with_program(source, FILE, &implicit_this(), Some(&program)).unwrap();
    assert_eq!(output, source);
}

#[test]
fn test_implicit_this_needs_a_program() {
    let source = "function f() { return this; }";
    assert_eq!(run(source, &implicit_this()), source);
}

#[test]
fn test_file_missing_from_program() {
    let program = strict_program("function f() {}");
    let err = instrument_with_program("", "other.ts", &implicit_this(), Some(&program)).unwrap_err();
    assert!(matches!(err, TypewizError::FileNotFound(ref name) if name == "other.ts"));
}

// =============================================================================
// Class fields
// =============================================================================

#[test]
fn test_class_field_becomes_accessor_pair() {
    let source = "class A { name; }";
    let expected = format!(
        "class A {{ get name() {{ return this._twiz_private_name; }} \
         set name(value: any) {{ {}; this._twiz_private_name = value; }} _twiz_private_name; }}",
        probe(source, "value", 14, "{}")
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_readonly_class_field() {
    let source = "class A { readonly name; }";
    let expected = format!(
        "class A {{ get name() {{ return this._twiz_private_name; }} \
         set name(value: any) {{ {}; this._twiz_private_name = value; }}  _twiz_private_name; }}",
        probe(source, "value", 23, "{}")
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_definite_assignment_class_field() {
    let source = "class A { baz!; }";
    let expected = format!(
        "class A {{ get baz() {{ return this._twiz_private_baz; }} \
         set baz(value: any) {{ {}; this._twiz_private_baz = value; }} _twiz_private_baz; }}",
        probe(source, "value", 14, "{}")
    );
    assert_eq!(run(source, &without_declarations()), expected);
}

#[test]
fn test_ineligible_class_fields_are_untouched() {
    let source = "class A { static s; declare d; x = 1; y: number; #p; _twiz_private_q; }";
    assert_eq!(run(source, &without_declarations()), source);
}

// =============================================================================
// Call expressions
// =============================================================================

fn track_calls() -> InstrumentOptions {
    InstrumentOptions {
        instrument_call_expressions: true,
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    }
}

#[test]
fn test_call_arguments_are_tracked() {
    let source = "foo(\"a\", 1, ...rest, bar);";
    let expected = format!(
        "foo(\"a\", 1, ...rest, $_$twiz.track(bar,\"{FILE}\",21,{}));",
        hash(source)
    );
    assert_eq!(run(source, &track_calls()), expected);
}

#[test]
fn test_calls_untouched_without_option() {
    let source = "foo(bar);";
    assert_eq!(run(source, &InstrumentOptions::default()), source);
}

#[test]
fn test_require_context_is_not_tracked() {
    let source = "require.context(\"./dir\", true);";
    let options = InstrumentOptions {
        instrument_call_expressions: true,
        ..InstrumentOptions::default()
    };
    assert_eq!(run(source, &options), source);
}

#[test]
fn test_tracked_arrow_argument_keeps_probe_inside() {
    let source = "f(x => x);";
    let expected = format!(
        "f($_$twiz.track(x => ({},x),\"{FILE}\",2,{}));",
        probe(source, "x", 3, r#"{"arrow":true,"parens":[2,3]}"#),
        hash(source)
    );
    assert_eq!(run(source, &track_calls()), expected);
}
