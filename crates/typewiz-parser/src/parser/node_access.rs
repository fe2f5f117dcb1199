//! NodeArena access methods and child traversal.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use crate::scanner::SyntaxKind;

macro_rules! data_accessors {
    ($($(#[$doc:meta])* $name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            #[must_use]
            pub fn $name<'n>(&self, node: &'n Node) -> Option<&'n $ty> {
                match &node.data {
                    NodeData::$variant(data) => Some(data),
                    _ => None,
                }
            }
        )*
    };
}

impl NodeArena {
    /// Get a node by index
    #[inline]
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(|node| node.kind)
    }

    #[inline]
    #[must_use]
    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |node| node.parent)
    }

    data_accessors! {
        get_identifier => Identifier(IdentifierData),
        get_literal => Literal(LiteralData),
        get_qualified_name => QualifiedName(QualifiedNameData),
        get_type_parameter => TypeParameter(TypeParameterData),
        get_parameter => Parameter(ParameterData),
        /// Function-like payload shared by declarations, expressions, arrows,
        /// methods, constructors and accessors.
        get_function => Function(FunctionData),
        get_property_decl => PropertyDecl(PropertyDeclData),
        get_signature => Signature(SignatureData),
        get_index_signature => IndexSignature(IndexSignatureData),
        get_class => Class(ClassData),
        get_interface => Interface(InterfaceData),
        get_type_alias => TypeAlias(TypeAliasData),
        get_enum => Enum(EnumData),
        get_enum_member => EnumMember(EnumMemberData),
        get_module => Module(ModuleData),
        get_heritage_clause => HeritageClause(HeritageData),
        get_expr_type_args => ExprWithTypeArgs(ExprWithTypeArgsData),
        get_block => Block(BlockData),
        get_variable => Variable(VariableData),
        get_variable_decl_list => VariableDeclList(VariableDeclListData),
        get_variable_declaration => VariableDeclaration(VariableDeclarationData),
        get_expression_statement => ExprStatement(ExprStatementData),
        get_if_statement => If(IfStatementData),
        get_loop => Loop(LoopData),
        get_for_in_of => ForInOf(ForInOfData),
        get_jump_data => Jump(JumpData),
        get_labeled_statement => Labeled(LabeledData),
        get_with_statement => With(WithData),
        get_switch => Switch(SwitchData),
        get_case_clause => CaseClause(CaseClauseData),
        get_try => Try(TryData),
        get_catch_clause => CatchClause(CatchClauseData),
        get_import_decl => ImportDecl(ImportDeclData),
        get_import_clause => ImportClause(ImportClauseData),
        get_named_imports => NamedImports(NamedImportsData),
        get_specifier => Specifier(SpecifierData),
        get_export_decl => ExportDecl(ExportDeclData),
        get_export_assignment => ExportAssignment(ExportAssignmentData),
        get_import_equals => ImportEquals(ImportEqualsData),
        get_binary_expr => BinaryExpr(BinaryExprData),
        get_unary_expr => UnaryExpr(UnaryExprData),
        get_unary_expr_ex => UnaryExprEx(UnaryExprDataEx),
        get_call_expr => Call(CallExprData),
        get_access_expr => Access(AccessExprData),
        get_conditional_expr => Conditional(ConditionalExprData),
        get_type_assertion => TypeAssertion(TypeAssertionData),
        get_literal_expr => LiteralExpr(LiteralExprData),
        get_property_assignment => PropertyAssignment(PropertyAssignmentData),
        get_shorthand_property => ShorthandProperty(ShorthandPropertyData),
        get_template_expr => TemplateExpr(TemplateExprData),
        get_template_span => TemplateSpan(TemplateSpanData),
        get_tagged_template => TaggedTemplate(TaggedTemplateData),
        get_meta_property => MetaProperty(MetaPropertyData),
        get_binding_pattern => BindingPattern(BindingPatternData),
        get_binding_element => BindingElement(BindingElementData),
        get_type_ref => TypeRef(TypeRefData),
        get_composite_type => CompositeType(CompositeTypeData),
        get_array_type => ArrayType(ArrayTypeData),
        get_tuple_type => TupleType(TupleTypeData),
        get_wrapped_type => WrappedType(WrappedTypeData),
        get_type_operator => TypeOperator(TypeOperatorData),
        get_indexed_access_type => IndexedAccessType(IndexedAccessTypeData),
        get_conditional_type => ConditionalType(ConditionalTypeData),
        get_infer_type => InferType(InferTypeData),
        get_type_query => TypeQuery(TypeQueryData),
        get_type_literal => TypeLiteral(TypeLiteralData),
        get_mapped_type => MappedType(MappedTypeData),
        get_literal_type => LiteralType(LiteralTypeData),
        get_named_tuple_member => NamedTupleMember(NamedTupleMemberData),
        get_type_predicate => TypePredicate(TypePredicateData),
        get_import_type => ImportType(ImportTypeData),
        get_source_file => SourceFile(SourceFileData),
    }

    /// Text of an identifier or private identifier node.
    #[must_use]
    pub fn get_identifier_text(&self, index: NodeIndex) -> Option<&str> {
        self.get(index)
            .and_then(|node| self.get_identifier(node))
            .map(|data| data.escaped_text.as_str())
    }

    /// Static text of a property name: identifiers, string and numeric
    /// literals. Computed names have none.
    #[must_use]
    pub fn get_property_name_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        match node.kind {
            SyntaxKind::Identifier | SyntaxKind::PrivateIdentifier => {
                self.get_identifier(node).map(|data| data.escaped_text.as_str())
            }
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral => {
                self.get_literal(node).map(|data| data.text.as_str())
            }
            _ => None,
        }
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    #[must_use]
    pub fn modifier_flags(&self, modifiers: Option<&NodeList>) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        if let Some(list) = modifiers {
            for modifier in list.iter() {
                if let Some(node) = self.get(modifier) {
                    flags |= ModifierFlags::from_kind(node.kind);
                }
            }
        }
        flags
    }

    /// Modifiers list of a declaration node, if it can carry one.
    #[must_use]
    pub fn get_modifiers<'n>(&self, node: &'n Node) -> Option<&'n NodeList> {
        match &node.data {
            NodeData::Function(data) => data.modifiers.as_ref(),
            NodeData::Parameter(data) => data.modifiers.as_ref(),
            NodeData::PropertyDecl(data) => data.modifiers.as_ref(),
            NodeData::Signature(data) => data.modifiers.as_ref(),
            NodeData::IndexSignature(data) => data.modifiers.as_ref(),
            NodeData::Class(data) => data.modifiers.as_ref(),
            NodeData::Interface(data) => data.modifiers.as_ref(),
            NodeData::TypeAlias(data) => data.modifiers.as_ref(),
            NodeData::Enum(data) => data.modifiers.as_ref(),
            NodeData::Module(data) => data.modifiers.as_ref(),
            NodeData::Variable(data) => data.modifiers.as_ref(),
            NodeData::ImportDecl(data) => data.modifiers.as_ref(),
            NodeData::ExportDecl(data) => data.modifiers.as_ref(),
            NodeData::ExportAssignment(data) => data.modifiers.as_ref(),
            NodeData::ImportEquals(data) => data.modifiers.as_ref(),
            NodeData::TypeParameter(data) => data.modifiers.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_modifier(&self, node: &Node, flag: ModifierFlags) -> bool {
        self.modifier_flags(self.get_modifiers(node)).intersects(flag)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Nearest ancestor (excluding `index` itself) satisfying `predicate`.
    #[must_use]
    pub fn find_ancestor(&self, index: NodeIndex, predicate: impl Fn(&Node) -> bool) -> NodeIndex {
        let mut current = self.parent_of(index);
        while let Some(node) = self.get(current) {
            if predicate(node) {
                return current;
            }
            current = node.parent;
        }
        NodeIndex::NONE
    }

    /// Direct children of a node in source order.
    #[must_use]
    pub fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.get(index) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        fn one(idx: NodeIndex, out: &mut Vec<NodeIndex>) {
            if idx.is_some() {
                out.push(idx);
            }
        }
        fn list(list: &NodeList, out: &mut Vec<NodeIndex>) {
            out.extend(list.iter());
        }
        fn opt(opt_list: &Option<NodeList>, out: &mut Vec<NodeIndex>) {
            if let Some(list) = opt_list {
                out.extend(list.iter());
            }
        }

        match &node.data {
            NodeData::None | NodeData::Identifier(_) | NodeData::Literal(_) => {}
            NodeData::QualifiedName(d) => {
                one(d.left, &mut out);
                one(d.right, &mut out);
            }
            NodeData::TypeParameter(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                one(d.constraint, &mut out);
                one(d.default, &mut out);
            }
            NodeData::Parameter(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                one(d.type_annotation, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::Function(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                opt(&d.type_parameters, &mut out);
                list(&d.parameters, &mut out);
                one(d.type_annotation, &mut out);
                one(d.body, &mut out);
            }
            NodeData::PropertyDecl(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                one(d.type_annotation, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::Signature(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                opt(&d.type_parameters, &mut out);
                list(&d.parameters, &mut out);
                one(d.type_annotation, &mut out);
            }
            NodeData::IndexSignature(d) => {
                opt(&d.modifiers, &mut out);
                list(&d.parameters, &mut out);
                one(d.type_annotation, &mut out);
            }
            NodeData::Class(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                opt(&d.type_parameters, &mut out);
                opt(&d.heritage_clauses, &mut out);
                list(&d.members, &mut out);
            }
            NodeData::Interface(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                opt(&d.type_parameters, &mut out);
                opt(&d.heritage_clauses, &mut out);
                list(&d.members, &mut out);
            }
            NodeData::TypeAlias(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                opt(&d.type_parameters, &mut out);
                one(d.type_node, &mut out);
            }
            NodeData::Enum(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                list(&d.members, &mut out);
            }
            NodeData::EnumMember(d) => {
                one(d.name, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::Module(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                one(d.body, &mut out);
            }
            NodeData::HeritageClause(d) => list(&d.types, &mut out),
            NodeData::ExprWithTypeArgs(d) => {
                one(d.expression, &mut out);
                opt(&d.type_arguments, &mut out);
            }
            NodeData::Block(d) => list(&d.statements, &mut out),
            NodeData::Variable(d) => {
                opt(&d.modifiers, &mut out);
                one(d.declaration_list, &mut out);
            }
            NodeData::VariableDeclList(d) => list(&d.declarations, &mut out),
            NodeData::VariableDeclaration(d) => {
                one(d.name, &mut out);
                one(d.type_annotation, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::ExprStatement(d) => one(d.expression, &mut out),
            NodeData::If(d) => {
                one(d.expression, &mut out);
                one(d.then_statement, &mut out);
                one(d.else_statement, &mut out);
            }
            NodeData::Loop(d) => {
                if node.kind == SyntaxKind::DoStatement {
                    one(d.statement, &mut out);
                    one(d.condition, &mut out);
                } else {
                    one(d.initializer, &mut out);
                    one(d.condition, &mut out);
                    one(d.incrementor, &mut out);
                    one(d.statement, &mut out);
                }
            }
            NodeData::ForInOf(d) => {
                one(d.initializer, &mut out);
                one(d.expression, &mut out);
                one(d.statement, &mut out);
            }
            NodeData::Jump(d) => one(d.label, &mut out),
            NodeData::Labeled(d) => {
                one(d.label, &mut out);
                one(d.statement, &mut out);
            }
            NodeData::With(d) => {
                one(d.expression, &mut out);
                one(d.statement, &mut out);
            }
            NodeData::Switch(d) => {
                one(d.expression, &mut out);
                one(d.case_block, &mut out);
            }
            NodeData::CaseClause(d) => {
                one(d.expression, &mut out);
                list(&d.statements, &mut out);
            }
            NodeData::Try(d) => {
                one(d.try_block, &mut out);
                one(d.catch_clause, &mut out);
                one(d.finally_block, &mut out);
            }
            NodeData::CatchClause(d) => {
                one(d.variable_declaration, &mut out);
                one(d.block, &mut out);
            }
            NodeData::ImportDecl(d) => {
                opt(&d.modifiers, &mut out);
                one(d.import_clause, &mut out);
                one(d.module_specifier, &mut out);
            }
            NodeData::ImportClause(d) => {
                one(d.name, &mut out);
                one(d.named_bindings, &mut out);
            }
            NodeData::NamedImports(d) => list(&d.elements, &mut out),
            NodeData::Specifier(d) => {
                one(d.property_name, &mut out);
                one(d.name, &mut out);
            }
            NodeData::ExportDecl(d) => {
                opt(&d.modifiers, &mut out);
                one(d.export_clause, &mut out);
                one(d.module_specifier, &mut out);
            }
            NodeData::ExportAssignment(d) => {
                opt(&d.modifiers, &mut out);
                one(d.expression, &mut out);
            }
            NodeData::ImportEquals(d) => {
                opt(&d.modifiers, &mut out);
                one(d.name, &mut out);
                one(d.module_reference, &mut out);
            }
            NodeData::BinaryExpr(d) => {
                one(d.left, &mut out);
                one(d.right, &mut out);
            }
            NodeData::UnaryExpr(d) => one(d.operand, &mut out),
            NodeData::UnaryExprEx(d) => one(d.expression, &mut out),
            NodeData::Call(d) => {
                one(d.expression, &mut out);
                opt(&d.type_arguments, &mut out);
                opt(&d.arguments, &mut out);
            }
            NodeData::Access(d) => {
                one(d.expression, &mut out);
                one(d.name_or_argument, &mut out);
            }
            NodeData::Conditional(d) => {
                one(d.condition, &mut out);
                one(d.when_true, &mut out);
                one(d.when_false, &mut out);
            }
            NodeData::TypeAssertion(d) => {
                if node.kind == SyntaxKind::TypeAssertionExpression {
                    one(d.type_node, &mut out);
                    one(d.expression, &mut out);
                } else {
                    one(d.expression, &mut out);
                    one(d.type_node, &mut out);
                }
            }
            NodeData::LiteralExpr(d) => list(&d.elements, &mut out),
            NodeData::PropertyAssignment(d) => {
                one(d.name, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::ShorthandProperty(d) => {
                one(d.name, &mut out);
                one(d.object_assignment_initializer, &mut out);
            }
            NodeData::TemplateExpr(d) => {
                one(d.head, &mut out);
                list(&d.template_spans, &mut out);
            }
            NodeData::TemplateSpan(d) => {
                one(d.expression, &mut out);
                one(d.literal, &mut out);
            }
            NodeData::TaggedTemplate(d) => {
                one(d.tag, &mut out);
                opt(&d.type_arguments, &mut out);
                one(d.template, &mut out);
            }
            NodeData::MetaProperty(d) => one(d.name, &mut out),
            NodeData::BindingPattern(d) => list(&d.elements, &mut out),
            NodeData::BindingElement(d) => {
                one(d.property_name, &mut out);
                one(d.name, &mut out);
                one(d.initializer, &mut out);
            }
            NodeData::TypeRef(d) => {
                one(d.type_name, &mut out);
                opt(&d.type_arguments, &mut out);
            }
            NodeData::CompositeType(d) => list(&d.types, &mut out),
            NodeData::ArrayType(d) => one(d.element_type, &mut out),
            NodeData::TupleType(d) => list(&d.elements, &mut out),
            NodeData::WrappedType(d) => one(d.type_node, &mut out),
            NodeData::TypeOperator(d) => one(d.type_node, &mut out),
            NodeData::IndexedAccessType(d) => {
                one(d.object_type, &mut out);
                one(d.index_type, &mut out);
            }
            NodeData::ConditionalType(d) => {
                one(d.check_type, &mut out);
                one(d.extends_type, &mut out);
                one(d.true_type, &mut out);
                one(d.false_type, &mut out);
            }
            NodeData::InferType(d) => one(d.type_parameter, &mut out),
            NodeData::TypeQuery(d) => {
                one(d.expr_name, &mut out);
                opt(&d.type_arguments, &mut out);
            }
            NodeData::TypeLiteral(d) => list(&d.members, &mut out),
            NodeData::MappedType(d) => {
                one(d.type_parameter, &mut out);
                one(d.name_type, &mut out);
                one(d.type_node, &mut out);
            }
            NodeData::LiteralType(d) => one(d.literal, &mut out),
            NodeData::NamedTupleMember(d) => {
                one(d.name, &mut out);
                one(d.type_node, &mut out);
            }
            NodeData::TypePredicate(d) => {
                one(d.parameter_name, &mut out);
                one(d.type_node, &mut out);
            }
            NodeData::ImportType(d) => {
                one(d.argument, &mut out);
                one(d.qualifier, &mut out);
                opt(&d.type_arguments, &mut out);
            }
            NodeData::SourceFile(d) => list(&d.statements, &mut out),
        }
        out
    }

    /// Deepest node whose range contains `offset`, starting at `root`.
    #[must_use]
    pub fn find_innermost_node_at(&self, root: NodeIndex, offset: u32) -> NodeIndex {
        let mut current = root;
        'descend: loop {
            for child in self.get_children(current) {
                if let Some(node) = self.get(child) {
                    if node.pos <= offset && offset < node.end {
                        current = child;
                        continue 'descend;
                    }
                }
            }
            return current;
        }
    }
}
