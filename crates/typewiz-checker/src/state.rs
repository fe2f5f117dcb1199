//! Checker state: one bound source file plus the diagnostics and caches built
//! while checking it.

use crate::binder::BinderState;
use crate::context::{CheckerContext, CheckerOptions};
use tracing::debug;
use typewiz_common::Diagnostic;
use typewiz_common::diagnostics::diagnostic_codes;
use typewiz_parser::{NodeArena, NodeIndex, ParsedFile, SyntaxKind};

pub struct CheckerState<'a> {
    pub file: &'a ParsedFile,
    pub binder: &'a BinderState,
    pub ctx: CheckerContext,
}

impl<'a> CheckerState<'a> {
    #[must_use]
    pub fn new(file: &'a ParsedFile, binder: &'a BinderState, options: CheckerOptions) -> Self {
        Self {
            file,
            binder,
            ctx: CheckerContext::new(options),
        }
    }

    /// Run the semantic checks and collect their diagnostics into
    /// `ctx.diagnostics`, sorted by start offset.
    pub fn check_source_file(&mut self) {
        if self.ctx.options.reports_implicit_this() {
            self.check_implicit_this();
        }
        self.ctx.diagnostics.sort_by_key(|diag| diag.start);
        debug!(
            file = %self.file.file_name,
            diagnostics = self.ctx.diagnostics.len(),
            "checked source file"
        );
    }

    // =========================================================================
    // Implicit `this`
    // =========================================================================

    fn check_implicit_this(&mut self) {
        let arena = &self.file.arena;
        let this_nodes: Vec<NodeIndex> = arena
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == SyntaxKind::ThisKeyword)
            .map(|(i, _)| NodeIndex(i as u32))
            .collect();

        for idx in this_nodes {
            if !self.this_is_implicitly_any(idx) {
                continue;
            }
            let Some(node) = arena.get(idx) else {
                continue;
            };
            self.ctx.diagnostics.push(Diagnostic::from_code(
                diagnostic_codes::THIS_IMPLICITLY_HAS_TYPE_ANY,
                &self.file.file_name,
                node.pos,
                node.width(),
                &[],
            ));
        }
    }

    #[must_use]
    pub fn this_container(&self, idx: NodeIndex) -> NodeIndex {
        this_container(&self.file.arena, idx)
    }

    /// `this` inside a plain function that neither declares a `this`
    /// parameter nor is an object literal method.
    fn this_is_implicitly_any(&self, idx: NodeIndex) -> bool {
        let arena = &self.file.arena;
        let container = self.this_container(idx);
        let Some(container_node) = arena.get(container) else {
            return false;
        };
        match container_node.kind {
            SyntaxKind::FunctionDeclaration => !self.has_this_parameter(container),
            SyntaxKind::FunctionExpression => {
                !self.has_this_parameter(container) && !self.is_object_literal_member(container)
            }
            _ => false,
        }
    }

    pub(crate) fn has_this_parameter(&self, function: NodeIndex) -> bool {
        let arena = &self.file.arena;
        arena
            .get(function)
            .and_then(|node| arena.get_function(node))
            .and_then(|data| data.parameters.first())
            .and_then(|first| arena.get(first).and_then(|n| arena.get_parameter(n)))
            .is_some_and(|param| arena.get_identifier_text(param.name) == Some("this"))
    }

    /// Function expression used as the value of an object literal property.
    fn is_object_literal_member(&self, function: NodeIndex) -> bool {
        let arena = &self.file.arena;
        let mut parent = arena.parent_of(function);
        while arena.kind(parent) == Some(SyntaxKind::ParenthesizedExpression) {
            parent = arena.parent_of(parent);
        }
        arena.kind(parent) == Some(SyntaxKind::PropertyAssignment)
            && arena.kind(arena.parent_of(parent)) == Some(SyntaxKind::ObjectLiteralExpression)
    }
}

/// Container that determines the meaning of `this` at `idx`: the nearest
/// enclosing non-arrow function, class, namespace or the source file.
#[must_use]
pub fn this_container(arena: &NodeArena, idx: NodeIndex) -> NodeIndex {
    arena.find_ancestor(idx, |node| match node.kind {
        SyntaxKind::ArrowFunction => false,
        kind => {
            kind.is_function_like()
                || matches!(
                    kind,
                    SyntaxKind::ClassDeclaration
                        | SyntaxKind::ClassExpression
                        | SyntaxKind::ModuleDeclaration
                        | SyntaxKind::SourceFile
                )
        }
    })
}
