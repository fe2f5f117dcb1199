//! Node storage.
//!
//! Every node carries its kind, source range, parent and a [`NodeData`]
//! payload. Payload structs are shared between kinds with the same shape, e.g.
//! [`FunctionData`] serves declarations, expressions, arrows, methods,
//! constructors and accessors.

use super::base::{NodeIndex, NodeList};
use crate::scanner::SyntaxKind;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u16 {
        const LET = 1 << 0;
        const CONST = 1 << 1;
        const OPTIONAL_CHAIN = 1 << 2;
        const THIS_NODE_HAS_ERROR = 1 << 3;
        const USING = 1 << 4;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModifierFlags: u32 {
        const EXPORT = 1 << 0;
        const AMBIENT = 1 << 1;
        const PUBLIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PROTECTED = 1 << 4;
        const STATIC = 1 << 5;
        const READONLY = 1 << 6;
        const ACCESSOR = 1 << 7;
        const ABSTRACT = 1 << 8;
        const ASYNC = 1 << 9;
        const DEFAULT = 1 << 10;
        const CONST = 1 << 11;
        const OVERRIDE = 1 << 12;
        const IN = 1 << 13;
        const OUT = 1 << 14;
        const DECORATOR = 1 << 15;
    }
}

impl ModifierFlags {
    #[must_use]
    pub fn from_kind(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::ExportKeyword => Self::EXPORT,
            SyntaxKind::DeclareKeyword => Self::AMBIENT,
            SyntaxKind::PublicKeyword => Self::PUBLIC,
            SyntaxKind::PrivateKeyword => Self::PRIVATE,
            SyntaxKind::ProtectedKeyword => Self::PROTECTED,
            SyntaxKind::StaticKeyword => Self::STATIC,
            SyntaxKind::ReadonlyKeyword => Self::READONLY,
            SyntaxKind::AccessorKeyword => Self::ACCESSOR,
            SyntaxKind::AbstractKeyword => Self::ABSTRACT,
            SyntaxKind::AsyncKeyword => Self::ASYNC,
            SyntaxKind::DefaultKeyword => Self::DEFAULT,
            SyntaxKind::ConstKeyword => Self::CONST,
            SyntaxKind::OverrideKeyword => Self::OVERRIDE,
            SyntaxKind::InKeyword => Self::IN,
            SyntaxKind::OutKeyword => Self::OUT,
            SyntaxKind::Decorator => Self::DECORATOR,
            _ => Self::empty(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: SyntaxKind,
    pub flags: NodeFlags,
    /// Start of the node's first token.
    pub pos: u32,
    /// End of the node's last token.
    pub end: u32,
    pub parent: NodeIndex,
    pub data: NodeData,
}

impl Node {
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.end - self.pos
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, offset: u32) -> bool {
        self.pos <= offset && offset < self.end
    }
}

#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Clone, Debug, Default)]
pub enum NodeData {
    #[default]
    None,
    Identifier(IdentifierData),
    Literal(LiteralData),
    QualifiedName(QualifiedNameData),
    TypeParameter(TypeParameterData),
    Parameter(ParameterData),
    Function(FunctionData),
    PropertyDecl(PropertyDeclData),
    Signature(SignatureData),
    IndexSignature(IndexSignatureData),
    Class(ClassData),
    Interface(InterfaceData),
    TypeAlias(TypeAliasData),
    Enum(EnumData),
    EnumMember(EnumMemberData),
    Module(ModuleData),
    HeritageClause(HeritageData),
    ExprWithTypeArgs(ExprWithTypeArgsData),
    Block(BlockData),
    Variable(VariableData),
    VariableDeclList(VariableDeclListData),
    VariableDeclaration(VariableDeclarationData),
    ExprStatement(ExprStatementData),
    If(IfStatementData),
    Loop(LoopData),
    ForInOf(ForInOfData),
    Jump(JumpData),
    Labeled(LabeledData),
    With(WithData),
    Switch(SwitchData),
    CaseClause(CaseClauseData),
    Try(TryData),
    CatchClause(CatchClauseData),
    ImportDecl(ImportDeclData),
    ImportClause(ImportClauseData),
    NamedImports(NamedImportsData),
    Specifier(SpecifierData),
    ExportDecl(ExportDeclData),
    ExportAssignment(ExportAssignmentData),
    ImportEquals(ImportEqualsData),
    BinaryExpr(BinaryExprData),
    UnaryExpr(UnaryExprData),
    UnaryExprEx(UnaryExprDataEx),
    Call(CallExprData),
    Access(AccessExprData),
    Conditional(ConditionalExprData),
    TypeAssertion(TypeAssertionData),
    LiteralExpr(LiteralExprData),
    PropertyAssignment(PropertyAssignmentData),
    ShorthandProperty(ShorthandPropertyData),
    TemplateExpr(TemplateExprData),
    TemplateSpan(TemplateSpanData),
    TaggedTemplate(TaggedTemplateData),
    MetaProperty(MetaPropertyData),
    BindingPattern(BindingPatternData),
    BindingElement(BindingElementData),
    TypeRef(TypeRefData),
    CompositeType(CompositeTypeData),
    ArrayType(ArrayTypeData),
    TupleType(TupleTypeData),
    WrappedType(WrappedTypeData),
    TypeOperator(TypeOperatorData),
    IndexedAccessType(IndexedAccessTypeData),
    ConditionalType(ConditionalTypeData),
    InferType(InferTypeData),
    TypeQuery(TypeQueryData),
    TypeLiteral(TypeLiteralData),
    MappedType(MappedTypeData),
    LiteralType(LiteralTypeData),
    NamedTupleMember(NamedTupleMemberData),
    TypePredicate(TypePredicateData),
    ImportType(ImportTypeData),
    SourceFile(SourceFileData),
}

/// Identifier and private identifier.
#[derive(Clone, Debug)]
pub struct IdentifierData {
    pub escaped_text: String,
}

/// String, numeric, bigint, regex and template literal chunks (cooked text).
#[derive(Clone, Debug)]
pub struct LiteralData {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct QualifiedNameData {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeParameterData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub constraint: NodeIndex,
    pub default: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ParameterData {
    pub modifiers: Option<NodeList>,
    pub dot_dot_dot_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Function declarations and expressions, arrows, methods, constructors and
/// accessors.
#[derive(Clone, Debug)]
pub struct FunctionData {
    pub modifiers: Option<NodeList>,
    pub is_async: bool,
    pub asterisk_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_parameters: Option<NodeList>,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
    pub body: NodeIndex,
    /// False only for an arrow function written `x => ...`.
    pub parenthesized_parameters: bool,
}

/// Class property declarations and interface/type-literal property signatures.
#[derive(Clone, Debug)]
pub struct PropertyDeclData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub question_token: bool,
    pub exclamation_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Method, call and construct signatures, and function/constructor types.
#[derive(Clone, Debug)]
pub struct SignatureData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_parameters: Option<NodeList>,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IndexSignatureData {
    pub modifiers: Option<NodeList>,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ClassData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub heritage_clauses: Option<NodeList>,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct InterfaceData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub heritage_clauses: Option<NodeList>,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct TypeAliasData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct EnumData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct EnumMemberData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ModuleData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct HeritageData {
    pub token: SyntaxKind,
    pub types: NodeList,
}

#[derive(Clone, Debug)]
pub struct ExprWithTypeArgsData {
    pub expression: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

/// Block, module block, case block and class static block.
#[derive(Clone, Debug)]
pub struct BlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct VariableData {
    pub modifiers: Option<NodeList>,
    pub declaration_list: NodeIndex,
}

/// `let`/`const` are recorded in the node's [`NodeFlags`].
#[derive(Clone, Debug)]
pub struct VariableDeclListData {
    pub declarations: NodeList,
}

#[derive(Clone, Debug)]
pub struct VariableDeclarationData {
    pub name: NodeIndex,
    pub exclamation_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Expression, return and throw statements.
#[derive(Clone, Debug)]
pub struct ExprStatementData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IfStatementData {
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

/// `for`, `while` and `do` loops.
#[derive(Clone, Debug)]
pub struct LoopData {
    pub initializer: NodeIndex,
    pub condition: NodeIndex,
    pub incrementor: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ForInOfData {
    pub await_modifier: bool,
    pub initializer: NodeIndex,
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct JumpData {
    pub label: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LabeledData {
    pub label: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct WithData {
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct SwitchData {
    pub expression: NodeIndex,
    pub case_block: NodeIndex,
}

/// `case` and `default` clauses; `expression` is NONE for `default`.
#[derive(Clone, Debug)]
pub struct CaseClauseData {
    pub expression: NodeIndex,
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct TryData {
    pub try_block: NodeIndex,
    pub catch_clause: NodeIndex,
    pub finally_block: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CatchClauseData {
    pub variable_declaration: NodeIndex,
    pub block: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ImportDeclData {
    pub modifiers: Option<NodeList>,
    pub import_clause: NodeIndex,
    pub module_specifier: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ImportClauseData {
    pub is_type_only: bool,
    pub name: NodeIndex,
    pub named_bindings: NodeIndex,
}

/// Named imports and named exports.
#[derive(Clone, Debug)]
pub struct NamedImportsData {
    pub elements: NodeList,
}

/// Import/export specifiers and namespace imports/exports.
#[derive(Clone, Debug)]
pub struct SpecifierData {
    pub is_type_only: bool,
    pub property_name: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ExportDeclData {
    pub modifiers: Option<NodeList>,
    pub is_type_only: bool,
    pub export_clause: NodeIndex,
    pub module_specifier: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ExportAssignmentData {
    pub modifiers: Option<NodeList>,
    pub is_export_equals: bool,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ImportEqualsData {
    pub modifiers: Option<NodeList>,
    pub is_type_only: bool,
    pub name: NodeIndex,
    pub module_reference: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct BinaryExprData {
    pub left: NodeIndex,
    pub operator_token: SyntaxKind,
    pub right: NodeIndex,
}

/// Prefix and postfix unary expressions.
#[derive(Clone, Debug)]
pub struct UnaryExprData {
    pub operator: SyntaxKind,
    pub operand: NodeIndex,
}

/// Single-operand wrappers: parenthesized, `delete`, `typeof`, `void`,
/// `await`, `yield`, spread, non-null, computed property names, decorators
/// and external module references.
#[derive(Clone, Debug)]
pub struct UnaryExprDataEx {
    pub expression: NodeIndex,
    pub asterisk_token: bool,
}

/// Call and `new` expressions. `arguments` is `None` for `new X` without
/// parentheses.
#[derive(Clone, Debug)]
pub struct CallExprData {
    pub expression: NodeIndex,
    pub type_arguments: Option<NodeList>,
    pub arguments: Option<NodeList>,
}

/// Property and element access.
#[derive(Clone, Debug)]
pub struct AccessExprData {
    pub expression: NodeIndex,
    pub name_or_argument: NodeIndex,
    pub question_dot_token: bool,
}

#[derive(Clone, Debug)]
pub struct ConditionalExprData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

/// `as`, `satisfies` and `<T>expr`.
#[derive(Clone, Debug)]
pub struct TypeAssertionData {
    pub expression: NodeIndex,
    pub type_node: NodeIndex,
}

/// Array and object literals.
#[derive(Clone, Debug)]
pub struct LiteralExprData {
    pub elements: NodeList,
    pub multi_line: bool,
}

#[derive(Clone, Debug)]
pub struct PropertyAssignmentData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ShorthandPropertyData {
    pub name: NodeIndex,
    pub object_assignment_initializer: NodeIndex,
}

/// Template expressions and template literal types.
#[derive(Clone, Debug)]
pub struct TemplateExprData {
    pub head: NodeIndex,
    pub template_spans: NodeList,
}

#[derive(Clone, Debug)]
pub struct TemplateSpanData {
    pub expression: NodeIndex,
    pub literal: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TaggedTemplateData {
    pub tag: NodeIndex,
    pub type_arguments: Option<NodeList>,
    pub template: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct MetaPropertyData {
    pub keyword_token: SyntaxKind,
    pub name: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct BindingPatternData {
    pub elements: NodeList,
}

#[derive(Clone, Debug)]
pub struct BindingElementData {
    pub dot_dot_dot_token: bool,
    pub property_name: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeRefData {
    pub type_name: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

/// Union and intersection types.
#[derive(Clone, Debug)]
pub struct CompositeTypeData {
    pub types: NodeList,
}

#[derive(Clone, Debug)]
pub struct ArrayTypeData {
    pub element_type: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TupleTypeData {
    pub elements: NodeList,
}

/// Parenthesized, optional (`T?`) and rest (`...T`) types.
#[derive(Clone, Debug)]
pub struct WrappedTypeData {
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeOperatorData {
    pub operator: SyntaxKind,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IndexedAccessTypeData {
    pub object_type: NodeIndex,
    pub index_type: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ConditionalTypeData {
    pub check_type: NodeIndex,
    pub extends_type: NodeIndex,
    pub true_type: NodeIndex,
    pub false_type: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct InferTypeData {
    pub type_parameter: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeQueryData {
    pub expr_name: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

#[derive(Clone, Debug)]
pub struct TypeLiteralData {
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct MappedTypeData {
    /// `readonly`, `+` or `-` when present.
    pub readonly_token: Option<SyntaxKind>,
    pub type_parameter: NodeIndex,
    pub name_type: NodeIndex,
    pub question_token: Option<SyntaxKind>,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct LiteralTypeData {
    pub literal: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct NamedTupleMemberData {
    pub dot_dot_dot_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypePredicateData {
    pub asserts_modifier: bool,
    pub parameter_name: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ImportTypeData {
    pub is_type_of: bool,
    pub argument: NodeIndex,
    pub qualifier: NodeIndex,
    pub type_arguments: Option<NodeList>,
}

#[derive(Clone, Debug)]
pub struct SourceFileData {
    pub statements: NodeList,
    pub file_name: String,
    pub text: Arc<str>,
}
