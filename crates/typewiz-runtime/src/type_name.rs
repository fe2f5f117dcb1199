//! Runtime type naming.
//!
//! [`TypeNamer::type_name`] turns a runtime [`Value`] into the TypeScript
//! type text that describes it, e.g. `string`, `number[]`,
//! `Array<number|string>`, `{ bar: number, foo: string }` or
//! `(a: any,b: any) => any`. The rendering is what gets written into
//! source, so its exact spacing is part of the observation format.

use crate::value::{ArrayRef, FunctionRef, ObjectRef, Value};
use indexmap::IndexSet;
use std::cell::Cell;
use typewiz_common::limits::MAX_TYPE_NAME_DEPTH;

/// Why a value could not be named.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NamingFailure {
    /// Naming was entered again while a naming of the same namer was in
    /// progress, typically from inside a getter.
    #[error("type naming re-entered while already running")]
    Reentrant,
    /// The value nests deeper than the naming depth limit. Cyclic values
    /// always end here.
    #[error("value nests deeper than the type naming depth limit")]
    DepthExceeded,
    /// Host code run while inspecting the value (a getter) threw.
    #[error("exception while inspecting value: {0}")]
    Thrown(String),
}

impl NamingFailure {
    /// Failures that mean "nothing observed" rather than a host error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, NamingFailure::Reentrant | NamingFailure::DepthExceeded)
    }
}

/// Names runtime values. Only one top-level naming may be in progress per
/// namer at a time.
#[derive(Debug, Default)]
pub struct TypeNamer {
    running: Cell<bool>,
}

/// Clears the running flag when the outermost naming unwinds.
struct RunningLatch<'a>(&'a Cell<bool>);

impl Drop for RunningLatch<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl TypeNamer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Name `value`. `Ok(None)` means the value carries no usable type
    /// (an empty array, or an array of such values).
    pub fn type_name(&self, value: &Value) -> Result<Option<String>, NamingFailure> {
        if self.running.get() {
            return Err(NamingFailure::Reentrant);
        }
        self.running.set(true);
        let _latch = RunningLatch(&self.running);
        name_value(value, 0)
    }
}

fn name_value(value: &Value, depth: u32) -> Result<Option<String>, NamingFailure> {
    if depth >= MAX_TYPE_NAME_DEPTH {
        return Err(NamingFailure::DepthExceeded);
    }
    let name = match value {
        Value::Null => "null".to_string(),
        Value::Undefined | Value::Number(_) | Value::String(_) | Value::Boolean(_) => {
            value.type_of().to_string()
        }
        Value::BigInt(_) => "BigInt".to_string(),
        Value::Symbol(_) => "Symbol".to_string(),
        Value::Array(array) => return name_array(array, depth),
        Value::Function(function) => function_signature(function),
        Value::Object(object) => match object.constructor_name() {
            Some("Object") => name_plain_object(object, depth)?,
            Some(constructor) => constructor.to_string(),
            None => value.type_of().to_string(),
        },
    };
    Ok(Some(name))
}

fn name_array(array: &ArrayRef, depth: u32) -> Result<Option<String>, NamingFailure> {
    let mut names: IndexSet<String> = IndexSet::new();
    for element in array.elements() {
        if let Some(name) = name_value(&element, depth + 1)? {
            names.insert(name);
        }
    }
    Ok(match names.len() {
        0 => None,
        1 => names.pop().map(|name| format!("{name}[]")),
        _ => {
            let mut names: Vec<String> = names.into_iter().collect();
            names.sort();
            Some(format!("Array<{}>", names.join("|")))
        }
    })
}

fn name_plain_object(object: &ObjectRef, depth: u32) -> Result<String, NamingFailure> {
    let mut keys = object.keys();
    if keys.is_empty() {
        return Ok("{}".to_string());
    }
    keys.sort();
    let mut members = Vec::with_capacity(keys.len());
    for key in keys {
        let value = object.get(&key)?;
        let name = name_value(&value, depth + 1)?.unwrap_or_else(|| "any".to_string());
        members.push(format!("{}: {name}", escape_key(&key)));
    }
    Ok(format!("{{ {} }}", members.join(", ")))
}

fn escape_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
    if bare {
        key.to_string()
    } else {
        serde_json::to_string(key).unwrap_or_else(|_| format!("{key:?}"))
    }
}

// =============================================================================
// Function signatures
// =============================================================================

/// Signature of a function value from its source text. Only the parameter
/// list shape is recovered; every parameter and the result are `any`.
fn function_signature(function: &FunctionRef) -> String {
    let Some(source) = function.source() else {
        return "Function".to_string();
    };
    let head = source.split("=>").next().unwrap_or(source);
    let list = match head.find('(') {
        Some(open) => {
            let rest = &head[open + 1..];
            rest.find(')').map_or("", |close| &rest[..close])
        }
        None => head,
    };
    let list = list.replace('(', "");
    let parameters: Vec<String> = list
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(describe_parameter)
        .collect();
    format!("({}) => any", parameters.join(","))
}

fn describe_parameter(parameter: &str) -> String {
    let name = parameter.split('=').next().unwrap_or(parameter).trim();
    if name.contains('[') {
        let naked = name.replace(['[', ']'], "");
        return format!("{}Array: any", naked.trim());
    }
    if name.contains('{') {
        let naked = name.replace(['{', '}'], "");
        let naked = naked.trim();
        return format!("{naked}Object: {{{naked}: any}}");
    }
    if name.contains("...") {
        return format!("{name}Array: any[]");
    }
    format!("{name}: any")
}

#[cfg(test)]
#[path = "tests/type_name_tests.rs"]
mod tests;
