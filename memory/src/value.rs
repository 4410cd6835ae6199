use std::fmt;

use serde::{Deserialize, Serialize};

use crate::heap::{Heap, Object};

/// Index of an object slot in the heap arena. A handle never dangles: once
/// the slot is swept, every lookup through the handle returns `None`.
pub type Handle = u32;

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Int(i64),
    Float(f64),
    Bool(bool),
    Object(Handle),
}

impl Value {
    // --- Checkers ---

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    pub fn is_obj(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    // --- Accessors ---

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Truthiness rule: nil and false are falsy, everything else is truthy.
    /// Zero, empty strings, and empty containers are all truthy.
    #[inline]
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    #[inline]
    pub fn is_falsey(&self) -> bool {
        !self.truthy()
    }

    // --- Rendering ---

    /// Human-facing rendering. Strings and atoms show their raw text;
    /// container elements are rendered in debug form so nested strings stay
    /// delimited. Total: a stale handle renders as `<invalid>`.
    pub fn to_display_string(&self, heap: &Heap) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(handle) => match heap.get(*handle) {
                Some(Object::Str { text, .. }) => text.clone(),
                Some(Object::Atom { text, .. }) => text.clone(),
                Some(_) => self.to_debug_string(heap),
                None => "<invalid>".to_string(),
            },
        }
    }

    /// Diagnostic rendering: strings quoted and escaped, atoms bare, floats
    /// always with a decimal point, lists `[..]`, tables `{k: v, ..}` with
    /// keys sorted, tuples `(..)`. A container that reaches itself again
    /// renders the inner occurrence as `...`, so cycles terminate.
    pub fn to_debug_string(&self, heap: &Heap) -> String {
        self.debug_render(heap, &mut Vec::new())
    }

    fn debug_render(&self, heap: &Heap, visited: &mut Vec<Handle>) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format!("{:?}", n),
            Value::Bool(b) => b.to_string(),
            Value::Object(handle) => {
                let object = match heap.get(*handle) {
                    Some(object) => object,
                    None => return "<invalid>".to_string(),
                };
                match object {
                    Object::Str { text, .. } => format!("{:?}", text),
                    Object::Atom { text, .. } => text.clone(),
                    _ if visited.contains(handle) => "...".to_string(),
                    Object::List(elements) => {
                        visited.push(*handle);
                        let inner: Vec<String> = elements
                            .iter()
                            .map(|v| v.debug_render(heap, visited))
                            .collect();
                        visited.pop();
                        format!("[{}]", inner.join(", "))
                    }
                    Object::Table(map) => {
                        // Sorted keys keep the rendering deterministic.
                        visited.push(*handle);
                        let mut keys: Vec<&String> = map.keys().collect();
                        keys.sort();
                        let inner: Vec<String> = keys
                            .iter()
                            .map(|k| format!("{}: {}", k, map[*k].debug_render(heap, visited)))
                            .collect();
                        visited.pop();
                        format!("{{{}}}", inner.join(", "))
                    }
                    Object::Tuple(values) => {
                        visited.push(*handle);
                        let inner: Vec<String> = values
                            .iter()
                            .map(|v| v.debug_render(heap, visited))
                            .collect();
                        visited.pop();
                        format!("({})", inner.join(", "))
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Float(n) => write!(f, "Float({:?})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Object(handle) => write!(f, "Object({})", handle),
        }
    }
}
