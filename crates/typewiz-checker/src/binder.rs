//! Name binding: lexical scopes and the symbols declared in them.
//!
//! `var` declarations and parameters bind to the nearest function (or file)
//! scope; `let`, `const`, classes, enums, interfaces and type aliases bind to
//! the nearest block. A function body shares its function's scope.

use rustc_hash::FxHashMap;
use tracing::trace;
use typewiz_parser::{NodeArena, NodeData, NodeFlags, NodeIndex, SyntaxKind};

pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const FUNCTION_SCOPED_VARIABLE: u32 = 1 << 0;
    pub const BLOCK_SCOPED_VARIABLE: u32 = 1 << 1;
    pub const PARAMETER: u32 = 1 << 2;
    pub const FUNCTION: u32 = 1 << 3;
    pub const CLASS: u32 = 1 << 4;
    pub const INTERFACE: u32 = 1 << 5;
    pub const TYPE_ALIAS: u32 = 1 << 6;
    pub const ENUM: u32 = 1 << 7;
    pub const NAMESPACE: u32 = 1 << 8;
    pub const ALIAS: u32 = 1 << 9;
    pub const CONST: u32 = 1 << 10;

    pub const VARIABLE: u32 = FUNCTION_SCOPED_VARIABLE | BLOCK_SCOPED_VARIABLE;
    pub const VALUE: u32 = VARIABLE | PARAMETER | FUNCTION | CLASS | ENUM | NAMESPACE | ALIAS;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub flags: u32,
    /// Declaring nodes: variable declarations, parameters, binding elements,
    /// function/class/enum/interface/type-alias declarations, import
    /// specifiers.
    pub declarations: Vec<NodeIndex>,
}

impl Symbol {
    #[must_use]
    pub const fn has_any_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }

    #[must_use]
    pub fn value_declaration(&self) -> NodeIndex {
        self.declarations.first().copied().unwrap_or(NodeIndex::NONE)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub container: NodeIndex,
    pub symbols: FxHashMap<String, SymbolId>,
}

#[derive(Debug, Default)]
pub struct BinderState {
    pub symbols: Vec<Symbol>,
    pub scopes: Vec<Scope>,
    /// Scope owned by a container node.
    pub node_scopes: FxHashMap<NodeIndex, ScopeId>,
    /// Symbol declared by a declaration node or its name identifier.
    pub node_symbols: FxHashMap<NodeIndex, SymbolId>,
    scope_stack: Vec<ScopeId>,
    function_scope_stack: Vec<ScopeId>,
}

impl BinderState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Symbol declared by `node` (a declaration or its name).
    #[must_use]
    pub fn get_node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    // =========================================================================
    // Binding
    // =========================================================================

    pub fn bind_source_file(&mut self, arena: &NodeArena, root: NodeIndex) {
        let scope = self.enter_scope(root, true);
        let statements = arena
            .get(root)
            .and_then(|node| arena.get_source_file(node))
            .map(|data| data.statements.nodes.clone())
            .unwrap_or_default();
        for statement in statements {
            self.bind_node(arena, statement);
        }
        self.exit_scope(scope, true);
        trace!(
            symbols = self.symbols.len(),
            scopes = self.scopes.len(),
            "bound source file"
        );
    }

    fn enter_scope(&mut self, container: NodeIndex, is_function: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: self.scope_stack.last().copied(),
            container,
            symbols: FxHashMap::default(),
        });
        self.node_scopes.insert(container, id);
        self.scope_stack.push(id);
        if is_function {
            self.function_scope_stack.push(id);
        }
        id
    }

    fn exit_scope(&mut self, id: ScopeId, is_function: bool) {
        debug_assert_eq!(self.scope_stack.last(), Some(&id));
        self.scope_stack.pop();
        if is_function {
            self.function_scope_stack.pop();
        }
    }

    fn declare(&mut self, scope: ScopeId, name: &str, flags: u32, declaration: NodeIndex, name_node: NodeIndex) {
        let Some(scope_data) = self.scopes.get(scope.0 as usize) else {
            return;
        };
        let id = if let Some(&existing) = scope_data.symbols.get(name) {
            if let Some(symbol) = self.symbols.get_mut(existing.0 as usize) {
                symbol.flags |= flags;
                symbol.declarations.push(declaration);
            }
            existing
        } else {
            let id = SymbolId(self.symbols.len() as u32);
            self.symbols.push(Symbol {
                name: name.to_string(),
                flags,
                declarations: vec![declaration],
            });
            if let Some(scope_data) = self.scopes.get_mut(scope.0 as usize) {
                scope_data.symbols.insert(name.to_string(), id);
            }
            id
        };
        self.node_symbols.insert(declaration, id);
        if name_node.is_some() {
            self.node_symbols.insert(name_node, id);
        }
    }

    fn declare_block_scoped(&mut self, arena: &NodeArena, name: NodeIndex, flags: u32, declaration: NodeIndex) {
        let Some(text) = arena.get_identifier_text(name) else {
            return;
        };
        if let Some(&scope) = self.scope_stack.last() {
            self.declare(scope, text, flags, declaration, name);
        }
    }

    fn declare_function_scoped(&mut self, arena: &NodeArena, name: NodeIndex, flags: u32, declaration: NodeIndex) {
        let Some(text) = arena.get_identifier_text(name) else {
            return;
        };
        if let Some(&scope) = self.function_scope_stack.last() {
            self.declare(scope, text, flags, declaration, name);
        }
    }

    /// Bind every identifier of a (possibly destructuring) name.
    fn bind_binding_name(&mut self, arena: &NodeArena, name: NodeIndex, declaration: NodeIndex, flags: u32, block_scoped: bool) {
        let Some(node) = arena.get(name) else {
            return;
        };
        match node.kind {
            SyntaxKind::Identifier => {
                if block_scoped {
                    self.declare_block_scoped(arena, name, flags, declaration);
                } else {
                    self.declare_function_scoped(arena, name, flags, declaration);
                }
            }
            SyntaxKind::ObjectBindingPattern | SyntaxKind::ArrayBindingPattern => {
                let elements = arena
                    .get_binding_pattern(node)
                    .map(|data| data.elements.nodes.clone())
                    .unwrap_or_default();
                for element in elements {
                    let Some(element_node) = arena.get(element) else {
                        continue;
                    };
                    if let Some(data) = arena.get_binding_element(element_node) {
                        let (inner, initializer) = (data.name, data.initializer);
                        self.bind_binding_name(arena, inner, element, flags, block_scoped);
                        self.bind_node(arena, initializer);
                    }
                }
            }
            _ => {}
        }
    }

    fn bind_children(&mut self, arena: &NodeArena, idx: NodeIndex) {
        for child in arena.get_children(idx) {
            self.bind_node(arena, child);
        }
    }

    pub(crate) fn bind_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            SyntaxKind::VariableDeclarationList => {
                let block_scoped = node.flags.intersects(NodeFlags::LET | NodeFlags::CONST | NodeFlags::USING);
                let mut flags = if block_scoped {
                    symbol_flags::BLOCK_SCOPED_VARIABLE
                } else {
                    symbol_flags::FUNCTION_SCOPED_VARIABLE
                };
                if node.flags.contains(NodeFlags::CONST) {
                    flags |= symbol_flags::CONST;
                }
                let declarations = arena
                    .get_variable_decl_list(node)
                    .map(|data| data.declarations.nodes.clone())
                    .unwrap_or_default();
                for declaration in declarations {
                    let Some(decl) = arena.get(declaration).and_then(|n| arena.get_variable_declaration(n)) else {
                        continue;
                    };
                    let (name, initializer) = (decl.name, decl.initializer);
                    self.bind_binding_name(arena, name, declaration, flags, block_scoped);
                    self.bind_node(arena, initializer);
                }
            }
            SyntaxKind::FunctionDeclaration => {
                if let Some(data) = arena.get_function(node) {
                    self.declare_block_scoped(arena, data.name, symbol_flags::FUNCTION, idx);
                }
                self.bind_function_like(arena, idx);
            }
            SyntaxKind::FunctionExpression
            | SyntaxKind::ArrowFunction
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor => self.bind_function_like(arena, idx),
            SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => {
                if node.kind == SyntaxKind::ClassDeclaration {
                    if let Some(data) = arena.get_class(node) {
                        self.declare_block_scoped(arena, data.name, symbol_flags::CLASS, idx);
                    }
                }
                self.bind_children(arena, idx);
            }
            SyntaxKind::InterfaceDeclaration => {
                if let Some(data) = arena.get_interface(node) {
                    self.declare_block_scoped(arena, data.name, symbol_flags::INTERFACE, idx);
                }
            }
            SyntaxKind::TypeAliasDeclaration => {
                if let Some(data) = arena.get_type_alias(node) {
                    self.declare_block_scoped(arena, data.name, symbol_flags::TYPE_ALIAS, idx);
                }
            }
            SyntaxKind::EnumDeclaration => {
                if let Some(data) = arena.get_enum(node) {
                    self.declare_block_scoped(arena, data.name, symbol_flags::ENUM, idx);
                }
                self.bind_children(arena, idx);
            }
            SyntaxKind::ModuleDeclaration => {
                if let Some(data) = arena.get_module(node) {
                    if arena.kind(data.name) == Some(SyntaxKind::Identifier) {
                        self.declare_block_scoped(arena, data.name, symbol_flags::NAMESPACE, idx);
                    }
                    let body = data.body;
                    let scope = self.enter_scope(idx, true);
                    self.bind_node(arena, body);
                    self.exit_scope(scope, true);
                }
            }
            SyntaxKind::ImportClause | SyntaxKind::NamespaceImport | SyntaxKind::ImportSpecifier => {
                let name = match &node.data {
                    NodeData::ImportClause(data) => data.name,
                    NodeData::Specifier(data) => data.name,
                    _ => NodeIndex::NONE,
                };
                self.declare_block_scoped(arena, name, symbol_flags::ALIAS, idx);
                self.bind_children(arena, idx);
            }
            SyntaxKind::ImportEqualsDeclaration => {
                if let Some(data) = arena.get_import_equals(node) {
                    self.declare_block_scoped(arena, data.name, symbol_flags::ALIAS, idx);
                }
            }
            SyntaxKind::Block
            | SyntaxKind::ModuleBlock
            | SyntaxKind::CaseBlock
            | SyntaxKind::ClassStaticBlockDeclaration
            | SyntaxKind::ForStatement
            | SyntaxKind::ForInStatement
            | SyntaxKind::ForOfStatement
            | SyntaxKind::CatchClause => {
                let scope = self.enter_scope(idx, false);
                if node.kind == SyntaxKind::CatchClause {
                    if let Some(data) = arena.get_catch_clause(node) {
                        let (variable, block) = (data.variable_declaration, data.block);
                        if let Some(decl) = arena.get(variable).and_then(|n| arena.get_variable_declaration(n)) {
                            let name = decl.name;
                            self.bind_binding_name(arena, name, variable, symbol_flags::BLOCK_SCOPED_VARIABLE, true);
                        }
                        self.bind_block_statements(arena, block);
                    }
                } else {
                    self.bind_children(arena, idx);
                }
                self.exit_scope(scope, false);
            }
            _ => self.bind_children(arena, idx),
        }
    }

    /// Statements of a block bound into the current scope.
    fn bind_block_statements(&mut self, arena: &NodeArena, block: NodeIndex) {
        let statements = arena
            .get(block)
            .and_then(|node| arena.get_block(node))
            .map(|data| data.statements.nodes.clone())
            .unwrap_or_default();
        for statement in statements {
            self.bind_node(arena, statement);
        }
    }

    fn bind_function_like(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(data) = arena.get(idx).and_then(|node| arena.get_function(node)) else {
            return;
        };
        let parameters = data.parameters.nodes.clone();
        let body = data.body;
        let name = data.name;
        let is_named_expression = arena.kind(idx) == Some(SyntaxKind::FunctionExpression) && name.is_some();

        let scope = self.enter_scope(idx, true);
        if is_named_expression {
            self.declare_block_scoped(arena, name, symbol_flags::FUNCTION, idx);
        }
        for parameter in parameters {
            let Some(param) = arena.get(parameter).and_then(|n| arena.get_parameter(n)) else {
                continue;
            };
            let (param_name, initializer) = (param.name, param.initializer);
            if arena.get_identifier_text(param_name) == Some("this") {
                continue;
            }
            self.bind_binding_name(arena, param_name, parameter, symbol_flags::PARAMETER, false);
            self.bind_node(arena, initializer);
        }
        match arena.kind(body) {
            Some(SyntaxKind::Block) => self.bind_block_statements(arena, body),
            Some(_) => self.bind_node(arena, body),
            None => {}
        }
        self.exit_scope(scope, true);
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve `name` as seen from `location`, walking outwards through the
    /// scopes of enclosing containers.
    #[must_use]
    pub fn resolve_name(&self, arena: &NodeArena, name: &str, location: NodeIndex) -> Option<SymbolId> {
        let mut current = location;
        while current.is_some() {
            if let Some(scope) = self.node_scopes.get(&current) {
                if let Some(&symbol) = self.scopes.get(scope.0 as usize).and_then(|s| s.symbols.get(name)) {
                    return Some(symbol);
                }
            }
            current = arena.parent_of(current);
        }
        None
    }

    /// Resolve an identifier node to its symbol.
    #[must_use]
    pub fn resolve_identifier(&self, arena: &NodeArena, identifier: NodeIndex) -> Option<SymbolId> {
        if let Some(symbol) = self.get_node_symbol(identifier) {
            return Some(symbol);
        }
        let text = arena.get_identifier_text(identifier)?;
        self.resolve_name(arena, text, identifier)
    }
}

#[cfg(test)]
#[path = "tests/binder_tests.rs"]
mod tests;
