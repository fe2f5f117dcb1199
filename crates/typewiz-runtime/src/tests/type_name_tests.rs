use super::*;
use std::rc::Rc;

fn name(value: &Value) -> Result<Option<String>, NamingFailure> {
    TypeNamer::new().type_name(value)
}

fn named(value: &Value) -> String {
    name(value)
        .expect("value should be nameable")
        .expect("value should have a type")
}

fn function(source: &str) -> Value {
    Value::Function(FunctionRef::from_source(source))
}

#[test]
fn test_primitive_names() {
    assert_eq!(named(&Value::Null), "null");
    assert_eq!(named(&Value::Undefined), "undefined");
    assert_eq!(named(&Value::Boolean(true)), "boolean");
    assert_eq!(named(&Value::Number(f64::NAN)), "number");
    assert_eq!(named(&Value::from("hello")), "string");
    assert_eq!(named(&Value::BigInt("12".into())), "BigInt");
}

#[test]
fn test_class_instance_uses_constructor_name() {
    assert_eq!(named(&Value::Object(ObjectRef::instance_of("Set"))), "Set");
    assert_eq!(named(&Value::Object(ObjectRef::without_prototype())), "object");
}

#[test]
fn test_empty_array_has_no_type() {
    assert_eq!(name(&Value::array(vec![])), Ok(None));
}

#[test]
fn test_homogeneous_array() {
    let value = Value::array(vec!["foo".into(), "bar".into()]);
    assert_eq!(named(&value), "string[]");
}

#[test]
fn test_mixed_array_is_sorted_union() {
    let value = Value::array(vec!["foo".into(), 15.0.into()]);
    assert_eq!(named(&value), "Array<number|string>");
}

#[test]
fn test_nested_arrays_drop_empty_elements() {
    let value = Value::array(vec![
        Value::array(vec!["foo".into()]),
        Value::array(vec![]),
        Value::array(vec!["bar".into(), "baz".into()]),
    ]);
    assert_eq!(named(&value), "string[][]");
}

#[test]
fn test_self_containing_array_hits_depth_limit() {
    let array = ArrayRef::new(vec![]);
    array.push(Value::Array(array.clone()));
    assert_eq!(name(&Value::Array(array)), Err(NamingFailure::DepthExceeded));
}

#[test]
fn test_depth_limit_counts_nesting_levels() {
    let four = Value::array(vec![Value::array(vec![Value::array(vec![Value::array(vec![
        1.0.into(),
    ])])])]);
    assert_eq!(named(&four), "number[][][][]");

    let five = Value::array(vec![four]);
    assert_eq!(name(&five), Err(NamingFailure::DepthExceeded));
}

#[test]
fn test_reentrant_getter_is_reported_and_latch_released() {
    let namer = Rc::new(TypeNamer::new());
    let inner = Rc::clone(&namer);
    let object = ObjectRef::plain();
    object.define_getter(
        "foo",
        Rc::new(move || {
            inner.type_name(&Value::Number(1.0))?;
            Ok(Value::Number(1.0))
        }),
    );

    assert_eq!(
        namer.type_name(&Value::Object(object)),
        Err(NamingFailure::Reentrant)
    );
    assert!(!namer.is_running());
    assert_eq!(namer.type_name(&Value::Boolean(false)), Ok(Some("boolean".into())));
}

#[test]
fn test_throwing_getter_surfaces_host_error() {
    let object = ObjectRef::plain();
    object.define_getter("boom", Rc::new(|| Err(NamingFailure::Thrown("nope".into()))));
    let failure = name(&Value::Object(object)).unwrap_err();
    assert_eq!(failure, NamingFailure::Thrown("nope".into()));
    assert!(!failure.is_recoverable());
}

#[test]
fn test_independent_namers_do_not_share_latch() {
    let first = Rc::new(TypeNamer::new());
    let second = Rc::new(TypeNamer::new());
    let inner = Rc::clone(&second);
    let object = ObjectRef::plain();
    object.define_getter(
        "value",
        Rc::new(move || {
            let name = inner.type_name(&Value::Number(1.0))?;
            Ok(Value::from(name.as_deref().unwrap_or("")))
        }),
    );
    assert_eq!(
        first.type_name(&Value::Object(object)),
        Ok(Some("{ value: string }".into()))
    );
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_functions_without_arguments() {
    assert_eq!(named(&function("() => 0")), "() => any");
    assert_eq!(named(&function("function() {\n    return 0;\n}")), "() => any");
}

#[test]
fn test_functions_with_arguments() {
    assert_eq!(named(&function("(a, b) => a + b")), "(a: any,b: any) => any");
    assert_eq!(named(&function("function (a, b) { return a + b; }")), "(a: any,b: any) => any");
    assert_eq!(named(&function("multiplier => x * multiplier")), "(multiplier: any) => any");
}

#[test]
fn test_functions_with_default_values() {
    assert_eq!(named(&function("(a = 2, b = 3) => a + b")), "(a: any,b: any) => any");
    assert_eq!(
        named(&function("function stringify(json, stringifyFunc, replacer = null, space = 2) {}")),
        "(json: any,stringifyFunc: any,replacer: any,space: any) => any"
    );
}

#[test]
fn test_functions_with_destructured_and_rest_parameters() {
    assert_eq!(named(&function("([first]) => first")), "(firstArray: any) => any");
    assert_eq!(
        named(&function("({ options }) => options")),
        "(optionsObject: {options: any}) => any"
    );
    assert_eq!(named(&function("(...args) => args")), "(...argsArray: any[]) => any");
}

#[test]
fn test_function_without_source_text() {
    assert_eq!(named(&Value::Function(FunctionRef::native("push"))), "Function");
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_empty_object() {
    assert_eq!(named(&Value::Object(ObjectRef::plain())), "{}");
}

#[test]
fn test_object_keys_are_sorted() {
    let object = ObjectRef::from_entries([
        ("foo", Value::from("bar")),
        ("bar", Value::Number(15.0)),
        ("baz", Value::Boolean(true)),
    ]);
    assert_eq!(
        named(&Value::Object(object)),
        "{ bar: number, baz: boolean, foo: string }"
    );
}

#[test]
fn test_nested_objects() {
    let baz = ObjectRef::from_entries([("baz", Value::from("x"))]);
    let bar = ObjectRef::from_entries([("bar", Value::Object(baz))]);
    let foo = ObjectRef::from_entries([("foo", Value::Object(bar))]);
    assert_eq!(
        named(&Value::Object(foo)),
        "{ foo: { bar: { baz: string } } }"
    );
}

#[test]
fn test_object_with_function_and_array_members() {
    let object = ObjectRef::from_entries([
        ("foo", function("() => 0")),
        ("bar", function("function (param) { return param; }")),
    ]);
    assert_eq!(
        named(&Value::Object(object)),
        "{ bar: (param: any) => any, foo: () => any }"
    );

    let object = ObjectRef::from_entries([
        ("foo", Value::array(vec!["a".into()])),
        ("bar", Value::array(vec![1.0.into(), "b".into()])),
    ]);
    assert_eq!(
        named(&Value::Object(object)),
        "{ bar: Array<number|string>, foo: string[] }"
    );
}

#[test]
fn test_special_keys_are_quoted() {
    let object = ObjectRef::from_entries([("foo-bar", Value::Number(1.0)), ("$ok_1", Value::Null)]);
    assert_eq!(
        named(&Value::Object(object)),
        "{ $ok_1: null, \"foo-bar\": number }"
    );
}

#[test]
fn test_unnamed_member_renders_any() {
    let object = ObjectRef::from_entries([("items", Value::array(vec![]))]);
    assert_eq!(named(&Value::Object(object)), "{ items: any }");
}

#[test]
fn test_circular_object_hits_depth_limit() {
    let object = ObjectRef::plain();
    object.set("self", Value::Object(object.clone()));
    assert_eq!(
        name(&Value::Object(object)),
        Err(NamingFailure::DepthExceeded)
    );
}
