use super::*;
use typewiz_parser::parse_source;

fn bind(source: &str) -> (typewiz_parser::ParsedFile, BinderState) {
    let file = parse_source("test.ts", source);
    let mut binder = BinderState::new();
    binder.bind_source_file(&file.arena, file.root);
    (file, binder)
}

/// Identifier nodes spelled `name`, in source order.
fn identifiers(file: &typewiz_parser::ParsedFile, name: &str) -> Vec<NodeIndex> {
    let mut found: Vec<NodeIndex> = file
        .arena
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind == SyntaxKind::Identifier)
        .map(|(i, _)| NodeIndex(i as u32))
        .filter(|&idx| file.arena.get_identifier_text(idx) == Some(name))
        .collect();
    found.sort_by_key(|&idx| file.arena.get(idx).map(|n| n.pos));
    found
}

#[test]
fn test_var_hoists_to_function_scope() {
    let (file, binder) = bind("function f() { if (x) { var a = 1; let b = 2; } return a + b; }");
    let uses_a = identifiers(&file, "a");
    let uses_b = identifiers(&file, "b");
    let declared_a = binder.get_node_symbol(uses_a[0]);
    assert!(declared_a.is_some());
    assert_eq!(binder.resolve_identifier(&file.arena, uses_a[1]), declared_a);
    // `b` is block scoped to the `if` block.
    assert!(binder.get_node_symbol(uses_b[0]).is_some());
    assert_eq!(binder.resolve_identifier(&file.arena, uses_b[1]), None);
}

#[test]
fn test_parameters_and_destructuring() {
    let (file, binder) = bind("function f(p, { q, r: [s] }, ...rest) { return p + q + s + rest; }");
    for name in ["p", "q", "s", "rest"] {
        let uses = identifiers(&file, name);
        let symbol = binder
            .resolve_identifier(&file.arena, *uses.last().unwrap())
            .unwrap_or_else(|| panic!("{name} should resolve"));
        let symbol = binder.get_symbol(symbol).unwrap();
        assert!(symbol.has_any_flags(symbol_flags::PARAMETER), "{name}");
    }
    // The property key `r` of the pattern declares nothing.
    assert!(binder.resolve_name(&file.arena, "r", file.root).is_none());
}

#[test]
fn test_declaration_kinds() {
    let (file, binder) = bind(
        "class C {}\ninterface I {}\ntype T = number;\nenum E { A }\nnamespace N {}\nimport D, { x as y } from 'm';\nconst k = 1;",
    );
    let expect = [
        ("C", symbol_flags::CLASS),
        ("I", symbol_flags::INTERFACE),
        ("T", symbol_flags::TYPE_ALIAS),
        ("E", symbol_flags::ENUM),
        ("N", symbol_flags::NAMESPACE),
        ("D", symbol_flags::ALIAS),
        ("y", symbol_flags::ALIAS),
        ("k", symbol_flags::BLOCK_SCOPED_VARIABLE | symbol_flags::CONST),
    ];
    for (name, flags) in expect {
        let id = binder
            .resolve_name(&file.arena, name, file.root)
            .unwrap_or_else(|| panic!("{name} should be declared"));
        assert_eq!(binder.get_symbol(id).unwrap().flags, flags, "{name}");
    }
    assert!(binder.resolve_name(&file.arena, "x", file.root).is_none());
}

#[test]
fn test_inner_scope_shadows_outer() {
    let (file, binder) = bind("let v = 1; function g(v) { return v; } v;");
    let uses = identifiers(&file, "v");
    let outer = binder.get_node_symbol(uses[0]).unwrap();
    let parameter = binder.get_node_symbol(uses[1]).unwrap();
    assert_ne!(outer, parameter);
    assert_eq!(binder.resolve_identifier(&file.arena, uses[2]), Some(parameter));
    assert_eq!(binder.resolve_identifier(&file.arena, uses[3]), Some(outer));
}

#[test]
fn test_catch_and_for_bindings() {
    let (file, binder) = bind("for (let i = 0; i < 1; i++) {} try {} catch (err) { err; }");
    let uses_i = identifiers(&file, "i");
    let declared = binder.get_node_symbol(uses_i[0]);
    assert!(declared.is_some());
    assert_eq!(binder.resolve_identifier(&file.arena, uses_i[1]), declared);
    let uses_err = identifiers(&file, "err");
    assert_eq!(
        binder.resolve_identifier(&file.arena, uses_err[1]),
        binder.get_node_symbol(uses_err[0])
    );
    assert!(binder.resolve_name(&file.arena, "i", file.root).is_none());
}
