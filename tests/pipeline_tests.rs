//! Integration tests for the instrument, collect and apply pipeline.
//!
//! Each test instruments a source file, plays the role of the execution
//! environment by routing the emitted probe and track calls into a
//! [`TypeCollector`], and applies the resulting snapshot back to the
//! original source.

use std::fs;
use typewiz::instrument::TWIZ_DECLARATIONS;
use typewiz::{
    ApplyTypesOptions, CollectedTypeInfo, CompilerOptions, InstrumentOptions, Program,
    TypeCollector, Value, apply_types, apply_types_to_file, content_hash, instrument,
    instrument_with_program,
};
use typewiz_checker::CheckerOptions;
use typewiz_runtime::ObjectRef;

// =============================================================================
// Test Helpers
// =============================================================================

/// One `$_$twiz(...)` call found in instrumented output.
#[derive(Debug)]
struct ProbeCall {
    value: String,
    offset: u32,
    filename: String,
    options: String,
    hash: String,
}

/// One `$_$twiz.track(...)` call found in instrumented output.
#[derive(Debug)]
struct TrackCall {
    argument: String,
    filename: String,
    offset: u32,
    hash: String,
}

/// Split a leading JSON string literal off `text`, returning its value.
fn take_json_string(text: &str) -> (String, &str) {
    let bytes = text.as_bytes();
    assert_eq!(bytes.first(), Some(&b'"'), "expected a JSON string in {text:?}");
    let mut end = 1;
    let mut escaped = false;
    while end < bytes.len() {
        match bytes[end] {
            b'\\' if !escaped => escaped = true,
            b'"' if !escaped => break,
            _ => escaped = false,
        }
        end += 1;
    }
    let value = serde_json::from_str(&text[..=end]).expect("valid JSON string");
    (value, &text[end + 1..])
}

fn skip_comma(text: &str) -> &str {
    text.strip_prefix(',').expect("comma between arguments")
}

fn probe_calls(instrumented: &str) -> Vec<ProbeCall> {
    const CALLEE: &str = "$_$twiz(";
    instrumented
        .match_indices(CALLEE)
        .map(|(start, _)| {
            let rest = &instrumented[start + CALLEE.len()..];
            let (value, rest) = rest.split_once(',').expect("value argument");
            let (offset, rest) = rest.split_once(',').expect("offset argument");
            let (filename, rest) = take_json_string(rest);
            let (options, rest) = take_json_string(skip_comma(rest));
            let (hash, _) = take_json_string(skip_comma(rest));
            ProbeCall {
                value: value.to_string(),
                offset: offset.parse().expect("numeric offset"),
                filename,
                options,
                hash,
            }
        })
        .collect()
}

fn track_calls(instrumented: &str) -> Vec<TrackCall> {
    const CALLEE: &str = "$_$twiz.track(";
    instrumented
        .match_indices(CALLEE)
        .map(|(start, _)| {
            let rest = &instrumented[start + CALLEE.len()..];
            let (argument, rest) = rest.split_once(',').expect("tracked argument");
            let (filename, rest) = take_json_string(rest);
            let (offset, rest) = skip_comma(rest).split_once(',').expect("offset argument");
            let (hash, _) = take_json_string(rest);
            TrackCall {
                argument: argument.to_string(),
                filename,
                offset: offset.parse().expect("numeric offset"),
                hash,
            }
        })
        .collect()
}

/// The single probe call reporting `value`.
fn probe_for<'a>(calls: &'a [ProbeCall], value: &str) -> &'a ProbeCall {
    let mut matching = calls.iter().filter(|call| call.value == value);
    let call = matching.next().unwrap_or_else(|| panic!("no probe for {value}"));
    assert!(matching.next().is_none(), "more than one probe for {value}");
    call
}

fn fire(collector: &TypeCollector, call: &ProbeCall, value: &Value) {
    collector
        .probe(value, call.offset, &call.filename, &call.options, &call.hash)
        .expect("probe succeeds");
}

fn without_declarations() -> InstrumentOptions {
    InstrumentOptions {
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    }
}

/// Snapshot the collector through its JSON form, the way a run hands it over.
fn snapshot(collector: &TypeCollector) -> CollectedTypeInfo {
    let json = collector.snapshot_json().expect("snapshot serializes");
    CollectedTypeInfo::from_json(&json).expect("snapshot parses")
}

fn apply(source: &str, file: &str, collected: &CollectedTypeInfo, program: Option<&Program>) -> Option<String> {
    let file_info = collected.file(file).expect("file observed");
    assert_eq!(file_info.hash, content_hash(source));
    apply_types_to_file(source, file_info, &ApplyTypesOptions::default(), program).expect("types apply")
}

// =============================================================================
// Parameters
// =============================================================================

#[test]
fn test_simple_parameter_inference() {
    let source = "function greet(c) { return 'hello ' + c; }\ngreet('world');\n";
    let instrumented = instrument(source, "greet.ts", &without_declarations()).unwrap();
    let calls = probe_calls(&instrumented);
    assert_eq!(calls.len(), 1);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "c"), &Value::from("world"));

    assert_eq!(
        apply(source, "greet.ts", &snapshot(&collector), None).as_deref(),
        Some("function greet(c: string) { return 'hello ' + c; }\ngreet('world');\n")
    );
}

#[test]
fn test_function_never_called_gets_no_annotation() {
    let source = "function unused(a) { return a; }\n";
    let instrumented = instrument(source, "unused.ts", &without_declarations()).unwrap();
    assert_eq!(probe_calls(&instrumented).len(), 1);

    let collector = TypeCollector::new();
    assert!(collector.get().is_empty());
    assert!(snapshot(&collector).file("unused.ts").is_none());
}

#[test]
fn test_calls_with_different_types_produce_union() {
    let source = "function show(v) { console.log(v); }\nshow(1);\nshow('x');\nshow(2);\n";
    let instrumented = instrument(source, "show.ts", &without_declarations()).unwrap();
    let calls = probe_calls(&instrumented);

    let collector = TypeCollector::new();
    let site = probe_for(&calls, "v");
    fire(&collector, site, &Value::from(1.0));
    fire(&collector, site, &Value::from("x"));
    fire(&collector, site, &Value::from(2.0));

    assert_eq!(
        apply(source, "show.ts", &snapshot(&collector), None).as_deref(),
        Some("function show(v: number|string) { console.log(v); }\nshow(1);\nshow('x');\nshow(2);\n")
    );
}

#[test]
fn test_optional_parameter_omits_undefined() {
    let source = "function pad(n, width?) { return n; }\n";
    let instrumented = instrument(source, "pad.ts", &without_declarations()).unwrap();
    let calls = probe_calls(&instrumented);
    assert_eq!(calls.len(), 2);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "n"), &Value::from(7.0));
    fire(&collector, probe_for(&calls, "width"), &Value::Undefined);
    fire(&collector, probe_for(&calls, "width"), &Value::from(3.0));

    assert_eq!(
        apply(source, "pad.ts", &snapshot(&collector), None).as_deref(),
        Some("function pad(n: number, width?: number) { return n; }\n")
    );
}

#[test]
fn test_arrow_parameter_gains_parentheses() {
    let source = "const double = x => x * 2;\ndouble(21);\n";
    let instrumented = instrument(source, "double.ts", &without_declarations()).unwrap();
    let calls = probe_calls(&instrumented);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "x"), &Value::from(21.0));

    assert_eq!(
        apply(source, "double.ts", &snapshot(&collector), None).as_deref(),
        Some("const double = (x: number) => x * 2;\ndouble(21);\n")
    );
}

#[test]
fn test_object_parameter() {
    let source = "function area(rect) { return rect.w * rect.h; }\n";
    let instrumented = instrument(source, "area.ts", &without_declarations()).unwrap();
    let calls = probe_calls(&instrumented);

    let collector = TypeCollector::new();
    let rect = ObjectRef::from_entries([("w", Value::from(2.0)), ("h", Value::from(3.0))]);
    fire(&collector, probe_for(&calls, "rect"), &Value::Object(rect));

    assert_eq!(
        apply(source, "area.ts", &snapshot(&collector), None).as_deref(),
        Some("function area(rect: { h: number, w: number }) { return rect.w * rect.h; }\n")
    );
}

// =============================================================================
// Class fields and implicit this
// =============================================================================

#[test]
fn test_class_field_assignment_is_observed() {
    let source = "class User { name; }\n";
    let instrumented = instrument(source, "user.ts", &without_declarations()).unwrap();
    assert!(instrumented.contains("set name(value: any)"));
    let calls = probe_calls(&instrumented);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "value"), &Value::from("Ann"));

    assert_eq!(
        apply(source, "user.ts", &snapshot(&collector), None).as_deref(),
        Some("class User { name: string; }\n")
    );
}

#[test]
fn test_implicit_this_is_annotated() {
    let source = "function greet(name) { return this.prefix + name; }\n";
    let program = Program::from_sources(
        CheckerOptions {
            strict: true,
            ..CheckerOptions::default()
        },
        [("greet.ts", source)],
    );
    let options = InstrumentOptions {
        instrument_implicit_this: true,
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    };
    let instrumented = instrument_with_program(source, "greet.ts", &options, Some(&program)).unwrap();
    let calls = probe_calls(&instrumented);
    assert_eq!(calls.len(), 2);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "this"), &Value::Object(ObjectRef::instance_of("Greeter")));
    fire(&collector, probe_for(&calls, "name"), &Value::from("Ann"));

    assert_eq!(
        apply(source, "greet.ts", &snapshot(&collector), None).as_deref(),
        Some("function greet(this: Greeter, name: string) { return this.prefix + name; }\n")
    );
}

// =============================================================================
// Tracked call arguments
// =============================================================================

fn track_options() -> InstrumentOptions {
    InstrumentOptions {
        instrument_call_expressions: true,
        skip_twiz_declarations: true,
        ..InstrumentOptions::default()
    }
}

#[test]
fn test_tracked_argument_takes_declared_type() {
    let source = "function first(items) { return items[0]; }\nconst names: string[] = ['a'];\nfirst(names);\n";
    let instrumented = instrument(source, "first.ts", &track_options()).unwrap();
    let probes = probe_calls(&instrumented);
    let tracks = track_calls(&instrumented);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].argument, "names");
    assert_eq!(tracks[0].offset as usize, source.rfind("names").unwrap());

    // At run time the array holds mixed values; the declaration is sharper.
    let collector = TypeCollector::new();
    let names = Value::array(vec![Value::from("a"), Value::from(1.0)]);
    let track = &tracks[0];
    let passed = collector.track(names, &track.filename, track.offset, &track.hash);
    fire(&collector, probe_for(&probes, "items"), &passed);

    let collected = snapshot(&collector);
    assert_eq!(
        apply(source, "first.ts", &collected, None).as_deref(),
        Some("function first(items: Array<number|string>) { return items[0]; }\nconst names: string[] = ['a'];\nfirst(names);\n")
    );

    let program = Program::from_sources(CheckerOptions::default(), [("first.ts", source)]);
    assert_eq!(
        apply(source, "first.ts", &collected, Some(&program)).as_deref(),
        Some("function first(items: string[]) { return items[0]; }\nconst names: string[] = ['a'];\nfirst(names);\n")
    );
}

#[test]
fn test_untracked_primitive_keeps_runtime_name() {
    let source = "function inc(n) { return n + 1; }\nconst one = 1;\ninc(one);\n";
    let instrumented = instrument(source, "inc.ts", &track_options()).unwrap();
    let probes = probe_calls(&instrumented);
    let track = &track_calls(&instrumented)[0];

    let collector = TypeCollector::new();
    let passed = collector.track(Value::from(1.0), &track.filename, track.offset, &track.hash);
    fire(&collector, probe_for(&probes, "n"), &passed);

    let program = Program::from_sources(CheckerOptions::default(), [("inc.ts", source)]);
    assert_eq!(
        apply(source, "inc.ts", &snapshot(&collector), Some(&program)).as_deref(),
        Some("function inc(n: number) { return n + 1; }\nconst one = 1;\ninc(one);\n")
    );
}

// =============================================================================
// Projects on disk
// =============================================================================

#[test]
fn test_project_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tsconfig.json"),
        r#"{ "compilerOptions": { "strict": true } }"#,
    )
    .unwrap();
    let source = "function greet(name) { return this.prefix + name; }\n";
    fs::write(dir.path().join("greet.ts"), source).unwrap();

    let compiler = CompilerOptions {
        root_dir: Some(dir.path().to_path_buf()),
        ts_config: Some("tsconfig.json".into()),
    };
    let options = InstrumentOptions {
        instrument_implicit_this: true,
        compiler: compiler.clone(),
        ..InstrumentOptions::default()
    };
    let instrumented = instrument(source, "greet.ts", &options).unwrap();
    let body = instrumented
        .strip_prefix(TWIZ_DECLARATIONS)
        .expect("declarations come first");
    let calls = probe_calls(body);
    assert_eq!(calls.len(), 2);

    let collector = TypeCollector::new();
    fire(&collector, probe_for(&calls, "this"), &Value::Object(ObjectRef::instance_of("Greeter")));
    fire(&collector, probe_for(&calls, "name"), &Value::from("Ann"));
    let collected_path = dir.path().join("collected.json");
    fs::write(&collected_path, collector.snapshot_json().unwrap()).unwrap();

    let collected = typewiz::read_type_info(&collected_path).unwrap();
    apply_types(
        &collected,
        &ApplyTypesOptions {
            prefix: None,
            compiler,
        },
    )
    .unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("greet.ts")).unwrap(),
        "function greet(this: Greeter, name: string) { return this.prefix + name; }\n"
    );
}

#[test]
fn test_edited_source_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = "function f(a) { return a; }\n";
    fs::write(dir.path().join("f.ts"), source).unwrap();

    let instrumented = instrument(source, "f.ts", &without_declarations()).unwrap();
    let collector = TypeCollector::new();
    fire(&collector, probe_for(&probe_calls(&instrumented), "a"), &Value::from(true));

    let edited = "function f(a, b) { return a; }\n";
    fs::write(dir.path().join("f.ts"), edited).unwrap();
    let options = ApplyTypesOptions {
        prefix: None,
        compiler: CompilerOptions {
            root_dir: Some(dir.path().to_path_buf()),
            ts_config: None,
        },
    };
    let err = apply_types(&collector.get(), &options).unwrap_err();
    assert!(matches!(err, typewiz::TypewizError::HashMismatch { .. }));
    assert_eq!(fs::read_to_string(dir.path().join("f.ts")).unwrap(), edited);
}
