use super::*;
use crate::value::ObjectRef;
use std::rc::Rc;

fn names(collector: &TypeCollector, file: &str, offset: u32) -> Vec<TypeDescriptor> {
    collector
        .get()
        .file(file)
        .and_then(|info| info.sites.get(&offset))
        .map(|site| site.types.clone())
        .unwrap_or_default()
}

#[test]
fn test_probe_records_type_per_site() {
    let collector = TypeCollector::new();
    collector.probe(&"World".into(), 16, "greet.ts", "{}", "h1").unwrap();

    let snapshot = collector.get();
    let file = snapshot.file("greet.ts").unwrap();
    assert_eq!(file.hash, "h1");
    assert_eq!(
        file.sites[&16].types,
        vec![TypeDescriptor::Name("string".into())]
    );
}

#[test]
fn test_probe_deduplicates_names_in_observation_order() {
    let collector = TypeCollector::new();
    for value in [Value::from("a"), Value::Number(1.0), Value::from("b")] {
        collector.probe(&value, 4, "a.ts", "{}", "h").unwrap();
    }
    assert_eq!(
        names(&collector, "a.ts", 4),
        vec![
            TypeDescriptor::Name("string".into()),
            TypeDescriptor::Name("number".into()),
        ]
    );
}

#[test]
fn test_probe_keeps_site_options() {
    let collector = TypeCollector::new();
    collector
        .probe(&Value::Number(1.0), 2, "a.ts", r#"{"arrow":true,"parens":[1,2]}"#, "h")
        .unwrap();
    let snapshot = collector.get();
    let site = &snapshot.file("a.ts").unwrap().sites[&2];
    assert!(site.options.arrow);
    assert_eq!(site.options.parens, Some((1, 2)));
}

#[test]
fn test_probe_rejects_invalid_options() {
    let collector = TypeCollector::new();
    let err = collector
        .probe(&Value::Null, 0, "a.ts", "{oops", "h")
        .unwrap_err();
    assert!(matches!(err, ProbeError::InvalidOptions { .. }));
    assert!(collector.get().is_empty());
}

#[test]
fn test_unnamed_value_registers_site_without_types() {
    let collector = TypeCollector::new();
    collector.probe(&Value::array(vec![]), 9, "a.ts", "{}", "h").unwrap();
    let snapshot = collector.get();
    assert!(snapshot.file("a.ts").unwrap().sites[&9].types.is_empty());
}

#[test]
fn test_cyclic_value_is_not_observed() {
    let collector = TypeCollector::new();
    let object = ObjectRef::plain();
    object.set("me", Value::Object(object.clone()));
    collector
        .probe(&Value::Object(object.clone()), 3, "a.ts", "{}", "h")
        .unwrap();
    object.set("me", Value::Null);

    // The file is registered before naming fails.
    let snapshot = collector.get();
    let file = snapshot.file("a.ts").unwrap();
    assert_eq!(file.hash, "h");
    assert!(file.sites.is_empty());
}

#[test]
fn test_host_exception_propagates() {
    let collector = TypeCollector::new();
    let object = ObjectRef::plain();
    object.define_getter("x", Rc::new(|| Err(NamingFailure::Thrown("bad getter".into()))));
    let err = collector
        .probe(&Value::Object(object), 3, "a.ts", "{}", "h")
        .unwrap_err();
    assert_eq!(err, ProbeError::Thrown("bad getter".into()));
}

#[test]
fn test_getter_reentering_collector_is_dropped() {
    let collector = Rc::new(TypeCollector::new());
    let inner = Rc::clone(&collector);
    let object = ObjectRef::plain();
    object.define_getter(
        "x",
        Rc::new(move || {
            inner
                .probe(&Value::Number(1.0), 1, "a.ts", "{}", "h")
                .map_err(|err| NamingFailure::Thrown(err.to_string()))?;
            Ok(Value::Number(2.0))
        }),
    );
    collector
        .probe(&Value::Object(object), 10, "a.ts", "{}", "h")
        .unwrap();

    let snapshot = collector.get();
    let file = snapshot.file("a.ts").unwrap();
    assert_eq!(
        file.sites[&10].types,
        vec![TypeDescriptor::Name("{ x: number }".into())]
    );
    assert!(!file.sites.contains_key(&1));
}

#[test]
fn test_tracked_value_carries_declaration_site() {
    let collector = TypeCollector::new();
    let array = collector.track(Value::array(vec!["x".into()]), "main.ts", 40, "hm");
    collector.probe(&array, 12, "lib.ts", "{}", "hl").unwrap();

    assert_eq!(
        names(&collector, "lib.ts", 12),
        vec![TypeDescriptor::Declared("main.ts".into(), 40, "string[]".into())]
    );
    assert_eq!(collector.get().file("main.ts").unwrap().hash, "hm");
}

#[test]
fn test_track_registers_file_for_primitives_without_tracking() {
    let collector = TypeCollector::new();
    let value = collector.track(Value::Number(3.0), "main.ts", 5, "hm");
    collector.probe(&value, 1, "lib.ts", "{}", "hl").unwrap();

    assert!(collector.get().file("main.ts").is_some());
    assert_eq!(
        names(&collector, "lib.ts", 1),
        vec![TypeDescriptor::Name("number".into())]
    );
}

#[test]
fn test_retracking_overwrites_declaration_site() {
    let collector = TypeCollector::new();
    let object = Value::Object(ObjectRef::instance_of("Foo"));
    collector.track(object.clone(), "main.ts", 1, "h");
    collector.track(object.clone(), "main.ts", 9, "h");
    collector.probe(&object, 0, "lib.ts", "{}", "h").unwrap();
    assert_eq!(
        names(&collector, "lib.ts", 0),
        vec![TypeDescriptor::Declared("main.ts".into(), 9, "Foo".into())]
    );
}

#[test]
fn test_first_hash_wins_and_clear_resets() {
    let collector = TypeCollector::new();
    collector.probe(&Value::Null, 0, "a.ts", "{}", "first").unwrap();
    collector.probe(&Value::Null, 0, "a.ts", "{}", "second").unwrap();
    assert_eq!(collector.get().file("a.ts").unwrap().hash, "first");

    let json = collector.snapshot_json().unwrap();
    assert!(json.contains("\"hash\": \"first\""));

    collector.clear();
    assert!(collector.get().is_empty());
}

#[test]
fn test_tracking_does_not_keep_value_alive() {
    let collector = TypeCollector::new();
    let object = Value::Object(ObjectRef::instance_of("Foo"));
    let handle = object.downgrade().unwrap();
    let passed = collector.track(object, "main.ts", 1, "h");
    assert_eq!(collector.tracked_count(), 1);

    drop(passed);
    assert!(!handle.is_alive());
    assert_eq!(collector.tracked_count(), 0);
}

#[test]
fn test_dead_tracked_values_are_swept() {
    let collector = TypeCollector::new();
    for offset in 0..1000 {
        collector.track(Value::array(vec![Value::Null]), "main.ts", offset, "h");
    }
    let kept = Value::Object(ObjectRef::plain());
    collector.track(kept.clone(), "main.ts", 7, "h");

    assert!(collector.state.borrow().tracked.len() <= TRACKED_SWEEP_MIN + 1);
    assert_eq!(collector.tracked_count(), 1);
    collector.probe(&kept, 0, "lib.ts", "{}", "h").unwrap();
    assert_eq!(
        names(&collector, "lib.ts", 0),
        vec![TypeDescriptor::Declared("main.ts".into(), 7, "{}".into())]
    );
}
