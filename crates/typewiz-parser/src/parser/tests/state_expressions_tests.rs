//! Expressions, arrow functions and literals.

use crate::parser::{NodeFlags, NodeIndex};
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

/// The expression of the first expression statement.
fn first_expression(file: &ParsedFile) -> NodeIndex {
    let stmt = nodes_of_kind(file, SyntaxKind::ExpressionStatement)[0];
    file.arena
        .get_expression_statement(file.arena.get(stmt).unwrap())
        .unwrap()
        .expression
}

#[test]
fn test_binary_precedence() {
    let file = parse_source("test.ts", "a + b * c ** d ** e;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let top = first_expression(&file);
    let top_data = file
        .arena
        .get_binary_expr(file.arena.get(top).unwrap())
        .unwrap();
    assert_eq!(top_data.operator_token, SyntaxKind::PlusToken);
    assert_eq!(file.node_text(top_data.right), "b * c ** d ** e");

    // `**` groups to the right.
    let power = nodes_of_kind(&file, SyntaxKind::BinaryExpression)
        .into_iter()
        .find(|&idx| file.node_text(idx) == "c ** d ** e")
        .expect("power expression");
    let power_data = file
        .arena
        .get_binary_expr(file.arena.get(power).unwrap())
        .unwrap();
    assert_eq!(file.node_text(power_data.right), "d ** e");
}

#[test]
fn test_shift_operators_are_merged() {
    let file = parse_source("test.ts", "x >>> 2 >= y >> 1;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let operators: Vec<SyntaxKind> = nodes_of_kind(&file, SyntaxKind::BinaryExpression)
        .into_iter()
        .map(|idx| {
            file.arena
                .get_binary_expr(file.arena.get(idx).unwrap())
                .unwrap()
                .operator_token
        })
        .collect();
    assert_eq!(
        operators,
        vec![
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken,
            SyntaxKind::GreaterThanGreaterThanToken,
            SyntaxKind::GreaterThanEqualsToken,
        ]
    );
}

#[test]
fn test_assignment_and_conditional() {
    let file = parse_source("test.ts", "x = a ? b : c ?? d;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let top = first_expression(&file);
    let data = file
        .arena
        .get_binary_expr(file.arena.get(top).unwrap())
        .unwrap();
    assert_eq!(data.operator_token, SyntaxKind::EqualsToken);
    assert_eq!(file.arena.kind(data.right), Some(SyntaxKind::ConditionalExpression));
}

#[test]
fn test_call_and_member_chain() {
    let file = parse_source("test.ts", "a.b[c](d, ...e).f!;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let top = first_expression(&file);
    assert_eq!(file.arena.kind(top), Some(SyntaxKind::NonNullExpression));
    let call = nodes_of_kind(&file, SyntaxKind::CallExpression)[0];
    let call_data = file
        .arena
        .get_call_expr(file.arena.get(call).unwrap())
        .unwrap();
    let args = call_data.arguments.as_ref().unwrap();
    assert_eq!(args.len(), 2);
    assert_eq!(file.arena.kind(args.nodes[1]), Some(SyntaxKind::SpreadElement));
    assert_eq!(file.node_text(call_data.expression), "a.b[c]");
}

#[test]
fn test_optional_chain_flags() {
    let file = parse_source("test.ts", "a?.b?.(c)?.[d];");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let flagged = file
        .arena
        .nodes
        .iter()
        .filter(|node| node.flags.contains(NodeFlags::OPTIONAL_CHAIN))
        .count();
    assert_eq!(flagged, 3);
}

#[test]
fn test_generic_call_and_new() {
    let file = parse_source("test.ts", "f<string>(x); new Map<string, number>(); new Foo;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let call = nodes_of_kind(&file, SyntaxKind::CallExpression)[0];
    let data = file
        .arena
        .get_call_expr(file.arena.get(call).unwrap())
        .unwrap();
    assert_eq!(data.type_arguments.as_ref().map(|l| l.len()), Some(1));

    let news = nodes_of_kind(&file, SyntaxKind::NewExpression);
    assert_eq!(news.len(), 2);
    let bare = file
        .arena
        .get_call_expr(file.arena.get(news[1]).unwrap())
        .unwrap();
    assert!(bare.arguments.is_none());
}

#[test]
fn test_less_than_is_not_type_arguments() {
    let file = parse_source("test.ts", "if (a < b) { c > d; }");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert!(nodes_of_kind(&file, SyntaxKind::CallExpression).is_empty());
    assert_eq!(nodes_of_kind(&file, SyntaxKind::BinaryExpression).len(), 2);
}

#[test]
fn test_arrow_functions() {
    let source = "const f = x => x + 1;\nconst g = async (a: number, b?: string): Promise<void> => { await a; };\nconst h = async y => y;";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let arrows = nodes_of_kind(&file, SyntaxKind::ArrowFunction);
    assert_eq!(arrows.len(), 3);

    let f = file.arena.get_function(file.arena.get(arrows[0]).unwrap()).unwrap();
    assert!(!f.parenthesized_parameters);
    assert!(!f.is_async);
    assert_eq!(file.arena.kind(f.body), Some(SyntaxKind::BinaryExpression));
    assert_eq!(file.node_text(arrows[0]), "x => x + 1");

    let g = file.arena.get_function(file.arena.get(arrows[1]).unwrap()).unwrap();
    assert!(g.parenthesized_parameters);
    assert!(g.is_async);
    assert_eq!(g.parameters.len(), 2);
    assert!(g.type_annotation.is_some());
    assert_eq!(file.arena.kind(g.body), Some(SyntaxKind::Block));

    let h = file.arena.get_function(file.arena.get(arrows[2]).unwrap()).unwrap();
    assert!(h.is_async);
    assert!(!h.parenthesized_parameters);
    assert_eq!(file.node_text(arrows[2]), "async y => y");
}

#[test]
fn test_parenthesized_expression_is_not_arrow() {
    let file = parse_source("test.ts", "(a, b); (c); async(d);");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert!(nodes_of_kind(&file, SyntaxKind::ArrowFunction).is_empty());
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ParenthesizedExpression).len(), 2);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::CallExpression).len(), 1);
}

#[test]
fn test_immediately_invoked_async_arrow() {
    let source = "(async (x)=>x+5)(10);";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let arrow = nodes_of_kind(&file, SyntaxKind::ArrowFunction)[0];
    let data = file.arena.get_function(file.arena.get(arrow).unwrap()).unwrap();
    assert_eq!(file.node_text(data.body), "x+5");
    let param = data.parameters.nodes[0];
    assert_eq!(file.node_text(param), "x");
}

#[test]
fn test_object_literal_members() {
    let source = "o = { a: 1, b, c = 2, ...d, [e]: 3, 'f': 4, m() {}, get g() { return 1; }, async n() {}, *gen() {} };";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let object = nodes_of_kind(&file, SyntaxKind::ObjectLiteralExpression)[0];
    let data = file
        .arena
        .get_literal_expr(file.arena.get(object).unwrap())
        .unwrap();
    let kinds: Vec<SyntaxKind> = data
        .elements
        .iter()
        .filter_map(|idx| file.arena.kind(idx))
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::PropertyAssignment,
            SyntaxKind::ShorthandPropertyAssignment,
            SyntaxKind::ShorthandPropertyAssignment,
            SyntaxKind::SpreadAssignment,
            SyntaxKind::PropertyAssignment,
            SyntaxKind::PropertyAssignment,
            SyntaxKind::MethodDeclaration,
            SyntaxKind::GetAccessor,
            SyntaxKind::MethodDeclaration,
            SyntaxKind::MethodDeclaration,
        ]
    );
}

#[test]
fn test_template_literals() {
    let source = "s = `a${b}c${d + 1}e`; t = tag`x${y}`; u = `plain`;";
    let file = parse_source("test.ts", source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let templates = nodes_of_kind(&file, SyntaxKind::TemplateExpression);
    assert_eq!(templates.len(), 2);
    let first = file
        .arena
        .get_template_expr(file.arena.get(templates[0]).unwrap())
        .unwrap();
    assert_eq!(first.template_spans.len(), 2);
    assert_eq!(file.node_text(templates[0]), "`a${b}c${d + 1}e`");
    assert_eq!(nodes_of_kind(&file, SyntaxKind::TaggedTemplateExpression).len(), 1);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::NoSubstitutionTemplateLiteral).len(), 1);
}

#[test]
fn test_regular_expression_literal() {
    let file = parse_source("test.ts", "r = /ab+c/gi.test(s) / 2;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let regex = nodes_of_kind(&file, SyntaxKind::RegularExpressionLiteral)[0];
    assert_eq!(file.node_text(regex), "/ab+c/gi");
}

#[test]
fn test_type_assertions() {
    let file = parse_source("test.ts", "x = <any>y; z = y as string; w = y satisfies T;");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::TypeAssertionExpression).len(), 1);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::AsExpression).len(), 1);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::SatisfiesExpression).len(), 1);
}

#[test]
fn test_const_assertion() {
    let file = parse_source(
        "test.ts",
        "const x = [1] as const;\nconst y = (a) => a as const;\nconst z = <const>['b'];",
    );
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let assertions = nodes_of_kind(&file, SyntaxKind::AsExpression);
    assert_eq!(assertions.len(), 2);
    let data = file
        .arena
        .get_type_assertion(file.arena.get(assertions[0]).unwrap())
        .unwrap();
    assert_eq!(file.arena.kind(data.type_node), Some(SyntaxKind::ConstKeyword));
    assert_eq!(file.node_text(assertions[0]), "[1] as const");
    assert_eq!(file.node_text(assertions[1]), "a as const");

    let angle = nodes_of_kind(&file, SyntaxKind::TypeAssertionExpression)[0];
    let data = file.arena.get_type_assertion(file.arena.get(angle).unwrap()).unwrap();
    assert_eq!(file.arena.kind(data.type_node), Some(SyntaxKind::ConstKeyword));
}

#[test]
fn test_function_and_class_expressions() {
    let file = parse_source(
        "test.ts",
        "a = function named(x) {}; b = async function () {}; c = class extends B {};",
    );
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let functions = nodes_of_kind(&file, SyntaxKind::FunctionExpression);
    assert_eq!(functions.len(), 2);
    let second = file
        .arena
        .get_function(file.arena.get(functions[1]).unwrap())
        .unwrap();
    assert!(second.is_async);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::ClassExpression).len(), 1);
}

#[test]
fn test_import_call_and_meta_properties() {
    let file = parse_source("test.ts", "import('x'); import.meta.url; function F() { new.target; }");
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::MetaProperty).len(), 2);
    assert_eq!(nodes_of_kind(&file, SyntaxKind::CallExpression).len(), 1);
}

#[test]
fn test_deep_nesting_reports_instead_of_overflowing() {
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let source = format!("x = {}1{};", "(".repeat(1500), ")".repeat(1500));
            let file = parse_source("test.ts", &source);
            file.diagnostics.iter().any(|d| d.code == 1450)
        })
        .unwrap();
    assert!(handle.join().unwrap());
}
