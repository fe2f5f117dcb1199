//! Checker types and their TypeScript-style display.
//!
//! The model only covers what a declaration-level checker can know without a
//! solver: primitives and literals, arrays and tuples, object shapes,
//! signatures, and named references. Type syntax without a structural model
//! (mapped, conditional, indexed access, ...) is kept as its source text.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Number,
    String,
    Boolean,
    BigInt,
    Symbol,
    /// The `object` keyword type.
    NonPrimitive,
    StringLiteral(String),
    /// Numeric literal, kept in its source spelling.
    NumberLiteral(String),
    BooleanLiteral(bool),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Object(Vec<PropertyType>),
    Function(Box<FunctionType>),
    Reference {
        name: String,
        type_arguments: Vec<Type>,
    },
    /// `typeof C` for class and enum values.
    TypeOf(String),
    /// Type syntax displayed verbatim.
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyType {
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub parameters: Vec<ParameterType>,
    pub return_type: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterType {
    pub name: String,
    pub optional: bool,
    pub rest: bool,
    pub ty: Type,
}

impl Type {
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Type {
        Type::Reference {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    #[must_use]
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    #[inline]
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// Literal types widened to their primitive, as for mutable locations.
    #[must_use]
    pub fn widen(self) -> Type {
        match self {
            Type::StringLiteral(_) => Type::String,
            Type::NumberLiteral(_) => Type::Number,
            Type::BooleanLiteral(_) => Type::Boolean,
            Type::Union(members) => Type::union(members.into_iter().map(Type::widen).collect()),
            other => other,
        }
    }

    /// Normalized union: nested unions flattened, duplicates and `never`
    /// removed, `true | false` folded to `boolean`, and `any` absorbing all.
    #[must_use]
    pub fn union(types: Vec<Type>) -> Type {
        let mut members: Vec<Type> = Vec::with_capacity(types.len());
        let mut pending = types;
        pending.reverse();
        while let Some(ty) = pending.pop() {
            match ty {
                Type::Any => return Type::Any,
                Type::Never => {}
                Type::Union(inner) => pending.extend(inner.into_iter().rev()),
                other => {
                    if !members.contains(&other) {
                        members.push(other);
                    }
                }
            }
        }

        let true_at = members.iter().position(|t| *t == Type::BooleanLiteral(true));
        let false_at = members.iter().position(|t| *t == Type::BooleanLiteral(false));
        if let (Some(t), Some(f)) = (true_at, false_at) {
            let first = t.min(f);
            members[first] = Type::Boolean;
            members.retain(|m| !matches!(m, Type::BooleanLiteral(_)));
            dedup_in_place(&mut members);
        }
        if members.contains(&Type::Boolean) {
            members.retain(|m| !matches!(m, Type::BooleanLiteral(_)));
        }

        match members.len() {
            0 => Type::Never,
            1 => members.pop().unwrap_or(Type::Never),
            _ => Type::Union(members),
        }
    }

    /// Constituents of a union, or the type itself.
    #[must_use]
    pub fn constituents(&self) -> &[Type] {
        match self {
            Type::Union(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    /// Whether the display of this type needs parentheses as an array
    /// element or union member.
    fn needs_parens_in_postfix(&self) -> bool {
        matches!(
            self,
            Type::Union(_) | Type::Intersection(_) | Type::Function(_) | Type::TypeOf(_)
        )
    }
}

fn dedup_in_place(members: &mut Vec<Type>) {
    let mut seen: Vec<Type> = Vec::with_capacity(members.len());
    members.retain(|m| {
        if seen.contains(m) {
            false
        } else {
            seen.push(m.clone());
            true
        }
    });
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' || c == '#' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[Type], separator: &str, parens: bool) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if parens && ty.needs_parens_in_postfix() {
            write!(f, "({ty})")?;
        } else {
            write!(f, "{ty}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Unknown => f.write_str("unknown"),
            Type::Never => f.write_str("never"),
            Type::Void => f.write_str("void"),
            Type::Undefined => f.write_str("undefined"),
            Type::Null => f.write_str("null"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::Boolean => f.write_str("boolean"),
            Type::BigInt => f.write_str("bigint"),
            Type::Symbol => f.write_str("symbol"),
            Type::NonPrimitive => f.write_str("object"),
            Type::StringLiteral(text) => write_quoted(f, text),
            Type::NumberLiteral(text) => f.write_str(text),
            Type::BooleanLiteral(value) => write!(f, "{value}"),
            Type::Array(element) => {
                if element.needs_parens_in_postfix() {
                    write!(f, "({element})[]")
                } else {
                    write!(f, "{element}[]")
                }
            }
            Type::Tuple(elements) => {
                f.write_str("[")?;
                write_joined(f, elements, ", ", false)?;
                f.write_str("]")
            }
            Type::Union(members) => write_joined(f, members, " | ", true),
            Type::Intersection(members) => write_joined(f, members, " & ", true),
            Type::Object(properties) => {
                if properties.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for property in properties {
                    if property.readonly {
                        f.write_str("readonly ")?;
                    }
                    if is_identifier_name(&property.name) {
                        f.write_str(&property.name)?;
                    } else {
                        write_quoted(f, &property.name)?;
                    }
                    if property.optional {
                        f.write_str("?")?;
                    }
                    write!(f, ": {}; ", property.ty)?;
                }
                f.write_str("}")
            }
            Type::Function(function) => write!(f, "{function}"),
            Type::Reference {
                name,
                type_arguments,
            } => {
                f.write_str(name)?;
                if !type_arguments.is_empty() {
                    f.write_str("<")?;
                    write_joined(f, type_arguments, ", ", false)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::TypeOf(name) => write!(f, "typeof {name}"),
            Type::Text(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if parameter.rest {
                f.write_str("...")?;
            }
            f.write_str(&parameter.name)?;
            if parameter.optional {
                f.write_str("?")?;
            }
            write!(f, ": {}", parameter.ty)?;
        }
        write!(f, ") => {}", self.return_type)
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
