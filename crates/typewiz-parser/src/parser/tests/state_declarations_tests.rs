//! Classes, interfaces, modules, imports and exports.

use crate::parser::{ModifierFlags, NodeIndex};
use crate::scanner::SyntaxKind;
use crate::{ParsedFile, parse_source};

fn nodes_of_kind(file: &ParsedFile, kind: SyntaxKind) -> Vec<NodeIndex> {
    file.arena
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind == kind)
        .map(|(i, _)| NodeIndex(i as u32))
        .collect()
}

fn first_of_kind(file: &ParsedFile, kind: SyntaxKind) -> NodeIndex {
    nodes_of_kind(file, kind)
        .first()
        .copied()
        .unwrap_or(NodeIndex::NONE)
}

#[test]
fn test_class_members() {
    let source = r#"
class Greeter<T> extends Base implements I, J {
    greeting: string;
    private readonly id?: number = 1;
    static count!: number;
    #secret = 0;
    [key: string]: any;
    constructor(public name: string) { super(); }
    get value() { return 1; }
    set value(v) {}
    async *items() {}
    static { Greeter.count = 0; }
    greet(this: Greeter) { return this.greeting; }
}
"#;
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);

    let class_idx = first_of_kind(&file, SyntaxKind::ClassDeclaration);
    let class_node = file.arena.get(class_idx).unwrap();
    let class = file.arena.get_class(class_node).unwrap();
    assert_eq!(file.arena.get_identifier_text(class.name), Some("Greeter"));
    assert_eq!(class.heritage_clauses.as_ref().map(|list| list.len()), Some(2));

    let member_kinds: Vec<SyntaxKind> = class
        .members
        .iter()
        .filter_map(|idx| file.arena.kind(idx))
        .collect();
    assert_eq!(
        member_kinds,
        vec![
            SyntaxKind::PropertyDeclaration,
            SyntaxKind::PropertyDeclaration,
            SyntaxKind::PropertyDeclaration,
            SyntaxKind::PropertyDeclaration,
            SyntaxKind::IndexSignature,
            SyntaxKind::Constructor,
            SyntaxKind::GetAccessor,
            SyntaxKind::SetAccessor,
            SyntaxKind::MethodDeclaration,
            SyntaxKind::ClassStaticBlockDeclaration,
            SyntaxKind::MethodDeclaration,
        ]
    );
}

#[test]
fn test_property_modifiers_and_tokens() {
    let source = "class A { private readonly id?: number = 1; static count!: number; }";
    let file = parse_source("test.ts", source);
    let props = nodes_of_kind(&file, SyntaxKind::PropertyDeclaration);
    assert_eq!(props.len(), 2);

    let first = file.arena.get(props[0]).unwrap();
    let data = file.arena.get_property_decl(first).unwrap();
    assert!(data.question_token);
    assert!(data.initializer.is_some());
    assert!(file.arena.has_modifier(first, ModifierFlags::READONLY));
    assert!(file.arena.has_modifier(first, ModifierFlags::PRIVATE));
    // The declaration starts at its first modifier, the name later.
    assert_eq!(file.node_text(props[0]), "private readonly id?: number = 1;");
    assert_eq!(file.node_text(data.name), "id");

    let second = file.arena.get(props[1]).unwrap();
    let data = file.arena.get_property_decl(second).unwrap();
    assert!(data.exclamation_token);
    assert!(file.arena.has_modifier(second, ModifierFlags::STATIC));
}

#[test]
fn test_modifier_keywords_as_member_names() {
    let source = "class A { readonly; static: number; get() {} async = 1; }";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let names: Vec<&str> = nodes_of_kind(&file, SyntaxKind::PropertyDeclaration)
        .into_iter()
        .chain(nodes_of_kind(&file, SyntaxKind::MethodDeclaration))
        .filter_map(|idx| {
            let node = file.arena.get(idx)?;
            let name = file
                .arena
                .get_property_decl(node)
                .map(|d| d.name)
                .or_else(|| file.arena.get_function(node).map(|d| d.name))?;
            file.arena.get_identifier_text(name)
        })
        .collect();
    assert_eq!(names, vec!["readonly", "static", "async", "get"]);
}

#[test]
fn test_constructor_parameter_properties() {
    let file = parse_source("test.ts", "class P { constructor(private readonly x: number, y = 2) {} }");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let params = nodes_of_kind(&file, SyntaxKind::Parameter);
    assert_eq!(params.len(), 2);
    let first = file.arena.get(params[0]).unwrap();
    assert!(file.arena.has_modifier(first, ModifierFlags::PRIVATE | ModifierFlags::READONLY));
}

#[test]
fn test_decorators() {
    let source = "@Component({ selector: 'x' })\nclass C { @Input() name: string; }";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::Decorator).len(), 2);
    let class_idx = first_of_kind(&file, SyntaxKind::ClassDeclaration);
    assert_eq!(file.arena.get(class_idx).unwrap().pos, 0);
}

#[test]
fn test_interface_type_alias_enum() {
    let source = r#"
interface Shape extends Base {
    readonly area: number;
    name?: string,
    scale(factor: number): void
    (call: string): number;
    new (x: number): Shape;
    [index: number]: string;
}
type Pair<T> = [T, T];
const enum Color { Red, Green = 2, "Blue" }
declare enum Empty {}
"#;
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let iface_idx = first_of_kind(&file, SyntaxKind::InterfaceDeclaration);
    let iface = file
        .arena
        .get_interface(file.arena.get(iface_idx).unwrap())
        .unwrap();
    let member_kinds: Vec<SyntaxKind> = iface
        .members
        .iter()
        .filter_map(|idx| file.arena.kind(idx))
        .collect();
    assert_eq!(
        member_kinds,
        vec![
            SyntaxKind::PropertySignature,
            SyntaxKind::PropertySignature,
            SyntaxKind::MethodSignature,
            SyntaxKind::CallSignature,
            SyntaxKind::ConstructSignature,
            SyntaxKind::IndexSignature,
        ]
    );
    assert_eq!(nodes_of_kind(&file, SyntaxKind::TypeAliasDeclaration).len(), 1);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::EnumMember).len(), 3);
    let enums = nodes_of_kind(&file, SyntaxKind::EnumDeclaration);
    assert_eq!(enums.len(), 2);
    let const_enum = file.arena.get(enums[0]).unwrap();
    assert!(file.arena.has_modifier(const_enum, ModifierFlags::CONST));
    let ambient_enum = file.arena.get(enums[1]).unwrap();
    assert!(file.arena.has_modifier(ambient_enum, ModifierFlags::AMBIENT));
}

#[test]
fn test_namespaces() {
    let source = "namespace A.B { export const x = 1; }\ndeclare module \"m\" { }\ndeclare global { interface Window {} }";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    // `A.B` nests two module declarations.
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ModuleDeclaration).len(), 4);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ModuleBlock).len(), 3);
}

#[test]
fn test_imports() {
    let source = r#"
import "side-effect";
import def from "a";
import * as ns from "b";
import { x, y as z, type T } from "c";
import def2, { w } from "d";
import type { Only } from "e";
import fs = require("fs");
import Alias = A.B.C;
"#;
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ImportDeclaration).len(), 6);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ImportEqualsDeclaration).len(), 2);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::NamespaceImport).len(), 1);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ImportSpecifier).len(), 5);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ExternalModuleReference).len(), 1);

    let type_only: Vec<bool> = nodes_of_kind(&file, SyntaxKind::ImportClause)
        .into_iter()
        .map(|idx| {
            file.arena
                .get_import_clause(file.arena.get(idx).unwrap())
                .unwrap()
                .is_type_only
        })
        .collect();
    assert_eq!(type_only, vec![false, false, false, false, true]);
}

#[test]
fn test_exports() {
    let source = r#"
export const a = 1;
export function f() {}
export default class {}
export { a as b, f };
export * from "x";
export * as ns from "y";
export type { T } from "z";
"#;
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ExportDeclaration).len(), 4);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ExportSpecifier).len(), 3);

    let class_idx = first_of_kind(&file, SyntaxKind::ClassDeclaration);
    let class_node = file.arena.get(class_idx).unwrap();
    assert!(file.arena.has_modifier(class_node, ModifierFlags::DEFAULT));
    assert!(file.arena.has_modifier(class_node, ModifierFlags::EXPORT));
}

#[test]
fn test_export_default_expression_and_export_equals() {
    let file = parse_source("test.ts", "export default 42;\nexport = foo;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let assignments = nodes_of_kind(&file, SyntaxKind::ExportAssignment);
    assert_eq!(assignments.len(), 2);
    let second = file
        .arena
        .get_export_assignment(file.arena.get(assignments[1]).unwrap())
        .unwrap();
    assert!(second.is_export_equals);
}
