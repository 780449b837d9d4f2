//! Zero-value payloads for scaffolding example calls.

use serde_json::{Map, Value};

use super::{Interface, Type};

/// The generated zero value of a type.
///
/// An alias missing from the interface produces `null` in its place rather
/// than an error; every such alias name is listed in `unresolved` so callers
/// can decide whether that matters.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub value: Value,
    pub unresolved: Vec<String>,
}

impl DefaultValue {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Interface {
    /// Zero value for `ty`, resolving aliases against this interface.
    ///
    /// The alias graph must be free of cycles that do not pass through an
    /// array; [`Interface::validate`] checks this.
    pub fn default_value(&self, ty: &Type) -> DefaultValue {
        let mut unresolved = Vec::new();
        let value = zero_value(self, ty, &mut unresolved);
        DefaultValue { value, unresolved }
    }
}

fn zero_value(interface: &Interface, ty: &Type, unresolved: &mut Vec<String>) -> Value {
    match ty {
        Type::Bool => Value::Bool(false),
        Type::Int => Value::from(0),
        Type::Float => Value::from(0.0),
        Type::String => Value::String(String::new()),
        Type::Array(_) => Value::Array(Vec::new()),
        Type::Struct(fields) => {
            let mut object = Map::new();
            for field in fields {
                object.insert(field.name.clone(), zero_value(interface, &field.ty, unresolved));
            }
            Value::Object(object)
        }
        Type::Alias(name) => match interface.alias(name) {
            Some(alias) => zero_value(interface, &alias.ty, unresolved),
            None => {
                unresolved.push(name.clone());
                Value::Null
            }
        },
    }
}
