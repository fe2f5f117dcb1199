//! Source instrumentation.
//!
//! The instrumenter walks the syntax tree of a file and records, as
//! [`Replacement`]s over the original offsets, every probe call needed to
//! observe the values of untyped parameters, class fields and implicit
//! `this`. Nothing in the original text is moved: probes are inserted at
//! the start of function bodies, field declarations become accessor pairs,
//! and call arguments are wrapped in place.
//!
//! Probe calls follow one wire format:
//!
//! ```text
//! $_$twiz(<value>,<offset>,<file name JSON>,<options JSON as a JSON string>,<hash JSON>)
//! $_$twiz.track(<argument>,<file name JSON>,<argument offset>,<hash JSON>)
//! ```

use crate::compiler_helper::{CompilerOptions, Program};
use crate::error::Result;
use tracing::{debug, warn};
use typewiz_checker::this_container;
use typewiz_common::diagnostics::diagnostic_codes;
use typewiz_common::{Replacement, apply_replacements, content_hash};
use typewiz_parser::{ModifierFlags, Node, NodeIndex, ParsedFile, SyntaxKind, parse_source};
use typewiz_runtime::SiteOptions;

/// Ambient declaration of the probe API, prepended to instrumented files.
pub const TWIZ_DECLARATIONS: &str = "declare function $_$twiz(value: any, offset: number, filename: string, opts: string, hash: string): void;
declare namespace $_$twiz {
    function track<T>(value: T, filename: string, offset: number, hash: string): T;
    function track(value: any, filename: string, offset: number, hash: string): any;
}
";

/// Backing field name prefix for instrumented class properties.
pub const PRIVATE_FIELD_PREFIX: &str = "_twiz_private_";

/// Priority of the `)` closing an expression-bodied arrow probe, so that it
/// stays inside anything else inserted at the end of the body.
const ARROW_CLOSE_PRIORITY: i32 = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentOptions {
    /// Wrap call arguments so their declaration site can be resolved later.
    pub instrument_call_expressions: bool,
    /// Probe `this` in functions where the checker reports it as implicitly
    /// `any`. Needs a tsconfig.
    pub instrument_implicit_this: bool,
    /// Leave out the ambient `$_$twiz` declaration.
    pub skip_twiz_declarations: bool,
    pub compiler: CompilerOptions,
}

/// Instrument one file. A program is loaded from `options.compiler` when
/// implicit `this` instrumentation is requested.
pub fn instrument(source: &str, filename: &str, options: &InstrumentOptions) -> Result<String> {
    let program = if options.instrument_implicit_this {
        Program::from_options(&options.compiler)?
    } else {
        None
    };
    instrument_with_program(source, filename, options, program.as_ref())
}

/// Instrument one file against an already loaded program, which is only
/// consulted for implicit `this` diagnostics.
pub fn instrument_with_program(
    source: &str,
    filename: &str,
    options: &InstrumentOptions,
    program: Option<&Program>,
) -> Result<String> {
    let this_diagnostics = match program {
        Some(program) if options.instrument_implicit_this => {
            if program.source_file(filename).is_some_and(|file| &*file.text != source) {
                warn!(filename, "program text differs from the source being instrumented");
            }
            program
                .semantic_diagnostics(filename)?
                .into_iter()
                .filter(|diag| diag.code == diagnostic_codes::THIS_IMPLICITLY_HAS_TYPE_ANY)
                .map(|diag| diag.start)
                .collect()
        }
        _ => Vec::new(),
    };

    let file = parse_source(filename, source);
    if !file.diagnostics.is_empty() {
        warn!(
            filename,
            errors = file.diagnostics.len(),
            "instrumenting a file with syntax errors"
        );
    }

    let mut instrumenter = Instrumenter::new(&file, filename, source, options, this_diagnostics);
    instrumenter.visit_source_file();
    let mut replacements = instrumenter.replacements;

    if !replacements.is_empty() && !options.skip_twiz_declarations {
        replacements.push(Replacement::insert(declaration_offset(source), TWIZ_DECLARATIONS));
    }
    debug!(filename, edits = replacements.len(), "instrumented file");
    Ok(apply_replacements(source, replacements))
}

/// Offset for the ambient declaration: after a `#!` line, otherwise 0.
fn declaration_offset(source: &str) -> u32 {
    if !source.starts_with("#!") {
        return 0;
    }
    source
        .find('\n')
        .map_or(source.len(), |newline| newline + 1) as u32
}

fn json_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

// =============================================================================
// Visitor
// =============================================================================

struct Instrumenter<'a> {
    file: &'a ParsedFile,
    options: &'a InstrumentOptions,
    filename_json: String,
    hash_json: String,
    /// Start offsets of "`this` implicitly has type `any`" diagnostics.
    this_diagnostics: Vec<u32>,
    replacements: Vec<Replacement>,
}

impl<'a> Instrumenter<'a> {
    fn new(
        file: &'a ParsedFile,
        filename: &str,
        source: &str,
        options: &'a InstrumentOptions,
        this_diagnostics: Vec<u32>,
    ) -> Self {
        Self {
            file,
            options,
            filename_json: json_string(filename),
            hash_json: json_string(&content_hash(source)),
            this_diagnostics,
            replacements: Vec::new(),
        }
    }

    fn visit_source_file(&mut self) {
        let file = self.file;
        let arena = &file.arena;
        let mut stack = vec![file.root];
        while let Some(idx) = stack.pop() {
            let Some(node) = arena.get(idx) else {
                continue;
            };
            match node.kind {
                SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::ArrowFunction => self.visit_function(idx, node),
                SyntaxKind::PropertyDeclaration => self.visit_property_declaration(node),
                SyntaxKind::CallExpression if self.options.instrument_call_expressions => {
                    self.visit_call_expression(node);
                }
                _ => {}
            }
            stack.extend(arena.get_children(idx));
        }
    }

    fn probe_call(&self, value: &str, offset: u32, options: &SiteOptions) -> String {
        format!(
            "$_$twiz({value},{offset},{},{},{})",
            self.filename_json,
            json_string(&options.to_json()),
            self.hash_json
        )
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn visit_function(&mut self, idx: NodeIndex, node: &Node) {
        let file = self.file;
        let arena = &file.arena;
        let Some(function) = arena.get_function(node) else {
            return;
        };
        let Some(body) = arena.get(function.body) else {
            return;
        };
        let is_arrow = node.kind == SyntaxKind::ArrowFunction;
        let is_block = body.kind == SyntaxKind::Block;

        if !is_arrow && is_block && self.has_implicit_this(idx, function.body) {
            let options = SiteOptions {
                this_type: true,
                this_needs_comma: !function.parameters.is_empty(),
                ..SiteOptions::default()
            };
            let probe = self.probe_call("this", function.parameters.pos, &options);
            debug!(offset = function.parameters.pos, "probe implicit this");
            self.replacements
                .push(Replacement::insert(body.pos + 1, format!("{probe};")));
        }

        let parens = if is_arrow && !function.parenthesized_parameters {
            function
                .parameters
                .first()
                .and_then(|param| arena.get(param))
                .map(|param| (param.pos, param.end))
        } else {
            None
        };

        for param_idx in function.parameters.iter() {
            let Some(param) = arena.get(param_idx).and_then(|n| arena.get_parameter(n)) else {
                continue;
            };
            if param.type_annotation.is_some() || param.initializer.is_some() {
                continue;
            }
            let Some(name) = arena.get(param.name) else {
                continue;
            };
            let name_text = file.node_text(param.name);
            if name_text == "this" {
                continue;
            }
            let offset = name.end + u32::from(param.question_token);
            let options = SiteOptions {
                arrow: is_arrow,
                parens,
                ..SiteOptions::default()
            };
            let probe = self.probe_call(name_text, offset, &options);
            debug!(offset, parameter = name_text, "probe parameter");
            if is_block {
                self.replacements
                    .push(Replacement::insert(body.pos + 1, format!("{probe};")));
            } else {
                self.replacements
                    .push(Replacement::insert(body.pos, format!("({probe},")));
                self.replacements.push(Replacement::insert_with_priority(
                    body.end,
                    ")",
                    ARROW_CLOSE_PRIORITY,
                ));
            }
        }
    }

    /// Whether an implicit-`this` diagnostic lies in one of the body's
    /// statements and refers to this function's own `this`.
    fn has_implicit_this(&self, function: NodeIndex, body: NodeIndex) -> bool {
        let arena = &self.file.arena;
        let Some(block) = arena.get(body).and_then(|n| arena.get_block(n)) else {
            return false;
        };
        self.this_diagnostics.iter().any(|&start| {
            let in_statement = block
                .statements
                .iter()
                .filter_map(|statement| arena.get(statement))
                .any(|statement| statement.pos <= start && start <= statement.end);
            in_statement
                && this_container(arena, arena.find_innermost_node_at(self.file.root, start))
                    == function
        })
    }

    // =========================================================================
    // Class fields
    // =========================================================================

    /// Turn `name;` into an accessor pair over `_twiz_private_name` whose
    /// setter probes the assigned value.
    fn visit_property_declaration(&mut self, node: &Node) {
        let file = self.file;
        let arena = &file.arena;
        let Some(property) = arena.get_property_decl(node) else {
            return;
        };
        let Some(name_node) = arena.get(property.name) else {
            return;
        };
        if name_node.kind != SyntaxKind::Identifier
            || property.type_annotation.is_some()
            || property.initializer.is_some()
        {
            return;
        }
        let flags = arena.modifier_flags(property.modifiers.as_ref());
        if flags.intersects(
            ModifierFlags::DECORATOR | ModifierFlags::STATIC | ModifierFlags::AMBIENT | ModifierFlags::ABSTRACT,
        ) {
            return;
        }
        let Some(name) = arena.get_identifier_text(property.name) else {
            return;
        };
        if name.starts_with(PRIVATE_FIELD_PREFIX) {
            return;
        }

        // A definite assignment `!` moves to the annotation site; the backing
        // field has no type for it to assert.
        let definite = property
            .exclamation_token
            .then(|| file.text.get(name_node.end as usize..node.end as usize))
            .flatten()
            .and_then(|rest| rest.find('!'))
            .map(|at| name_node.end + at as u32);
        if let Some(bang) = definite {
            self.replacements.push(Replacement::delete(bang, bang + 1));
        }
        let offset = match definite {
            Some(bang) => bang + 1,
            None => name_node.end + u32::from(property.question_token),
        };
        let probe = self.probe_call("value", offset, &SiteOptions::default());
        debug!(offset, field = name, "probe class field");
        let preamble = format!(
            "get {name}() {{ return this.{PRIVATE_FIELD_PREFIX}{name}; }} \
             set {name}(value: any) {{ {probe}; this.{PRIVATE_FIELD_PREFIX}{name} = value; }} "
        );

        // The backing field is assigned from the setter.
        for modifier in property.modifiers.iter().flat_map(|list| list.iter()) {
            if let Some(modifier) = arena.get(modifier) {
                if modifier.kind == SyntaxKind::ReadonlyKeyword {
                    self.replacements
                        .push(Replacement::delete(modifier.pos, modifier.end));
                }
            }
        }

        if node.pos == name_node.pos {
            self.replacements.push(Replacement::insert(
                node.pos,
                format!("{preamble}{PRIVATE_FIELD_PREFIX}"),
            ));
        } else {
            self.replacements
                .push(Replacement::insert(name_node.pos, PRIVATE_FIELD_PREFIX));
            self.replacements.push(Replacement::insert(node.pos, preamble));
        }
    }

    // =========================================================================
    // Call arguments
    // =========================================================================

    fn visit_call_expression(&mut self, node: &Node) {
        let file = self.file;
        let arena = &file.arena;
        let Some(call) = arena.get_call_expr(node) else {
            return;
        };
        if file.node_text(call.expression) == "require.context" {
            return;
        }
        for arg_idx in call.arguments.iter().flat_map(|list| list.iter()) {
            let Some(arg) = arena.get(arg_idx) else {
                continue;
            };
            if matches!(
                arg.kind,
                SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::SpreadElement
            ) {
                continue;
            }
            self.replacements
                .push(Replacement::insert(arg.pos, "$_$twiz.track("));
            self.replacements.push(Replacement::insert(
                arg.end,
                format!(",{},{},{})", self.filename_json, arg.pos, self.hash_json),
            ));
        }
    }
}

#[cfg(test)]
#[path = "tests/instrument_tests.rs"]
mod tests;
