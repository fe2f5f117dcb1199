use super::*;

#[test]
fn test_site_options_omit_false_fields() {
    assert_eq!(SiteOptions::default().to_json(), "{}");
    let options = SiteOptions {
        arrow: true,
        parens: Some((4, 5)),
        ..SiteOptions::default()
    };
    assert_eq!(options.to_json(), r#"{"arrow":true,"parens":[4,5]}"#);
    let this_site = SiteOptions {
        this_type: true,
        this_needs_comma: true,
        ..SiteOptions::default()
    };
    assert_eq!(this_site.to_json(), r#"{"thisType":true,"thisNeedsComma":true}"#);
}

#[test]
fn test_site_options_parse_probe_json() {
    let options = SiteOptions::from_json(r#"{"thisType":true}"#).unwrap();
    assert!(options.this_type);
    assert!(!options.this_needs_comma);
    assert!(SiteOptions::from_json("{not json").is_err());
}

#[test]
fn test_file_record_serializes_hash_and_offset_keys() {
    let mut file = FileTypeInfo::new("abc");
    file.sites.insert(
        15,
        SiteInfo {
            types: vec![
                TypeDescriptor::Name("string".into()),
                TypeDescriptor::Declared("a.ts".into(), 40, "string[]".into()),
            ],
            options: SiteOptions {
                arrow: true,
                ..SiteOptions::default()
            },
        },
    );
    let json = serde_json::to_string(&file).unwrap();
    assert_eq!(
        json,
        r#"{"hash":"abc","15":{"types":["string",["a.ts",40,"string[]"]],"arrow":true}}"#
    );
}

#[test]
fn test_snapshot_parses_wire_format() {
    let json = r#"{
        "src/a.ts": {
            "hash": "h1",
            "16": { "types": ["number", "string"] },
            "3": { "types": [["src/b.ts", 7, "Foo"]], "parens": [2, 3], "arrow": true }
        },
        "src/b.ts": { "hash": "h2" }
    }"#;
    let snapshot = CollectedTypeInfo::from_json(json).unwrap();
    assert_eq!(snapshot.files.len(), 2);

    let a = snapshot.file("src/a.ts").unwrap();
    assert_eq!(a.hash, "h1");
    let offsets: Vec<u32> = a.sites.keys().copied().collect();
    assert_eq!(offsets, vec![3, 16]);
    let site = &a.sites[&3];
    assert_eq!(
        site.types,
        vec![TypeDescriptor::Declared("src/b.ts".into(), 7, "Foo".into())]
    );
    assert_eq!(site.options.parens, Some((2, 3)));
    assert!(site.options.arrow);

    let b = snapshot.file("src/b.ts").unwrap();
    assert!(b.sites.is_empty());
}

#[test]
fn test_snapshot_rejects_malformed_records() {
    assert!(CollectedTypeInfo::from_json(r#"{"a.ts": {"12": {"types": []}}}"#).is_err());
    assert!(CollectedTypeInfo::from_json(r#"{"a.ts": {"hash": "h", "x": {"types": []}}}"#).is_err());
    assert!(CollectedTypeInfo::from_json(r#"{"a.ts": {"hash": "h", "1": {"types": [42]}}}"#).is_err());
}

#[test]
fn test_snapshot_json_keeps_file_order() {
    let mut snapshot = CollectedTypeInfo::default();
    snapshot.files.insert("z.ts".into(), FileTypeInfo::new("1"));
    snapshot.files.insert("a.ts".into(), FileTypeInfo::new("2"));
    let reparsed = CollectedTypeInfo::from_json(&snapshot.to_json_pretty().unwrap()).unwrap();
    let names: Vec<&String> = reparsed.files.keys().collect();
    assert_eq!(names, vec!["z.ts", "a.ts"]);
}
