//! Selective-overwrite state population.
//!
//! A response object is walked key by key. Each destination field declares a
//! [`MergePolicy`] deciding whether the server value may replace what the
//! state already holds. Keys with no destination field are ignored, and
//! fields missing from the response are left untouched.

use serde_json::{Map, Number, Value};

use super::error::EngineError;
use super::normalize::json_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Server-reported values, always replaced
    AlwaysOverwrite,
    /// User-settable values, replaced when forced or when the user set them
    OverwriteIfPresent,
    /// Adopted from the server only on create and import
    OverwriteIfForced,
}

impl MergePolicy {
    fn allows(self, force: bool, has_value: bool) -> bool {
        match self {
            MergePolicy::AlwaysOverwrite => true,
            MergePolicy::OverwriteIfPresent => force || has_value,
            MergePolicy::OverwriteIfForced => force,
        }
    }
}

/// Implemented by every state struct the populator writes into
pub trait Populate {
    /// Routes one response key to its destination field. Unknown keys are ignored.
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator)
        -> Result<(), EngineError>;
}

#[derive(Debug, Clone)]
pub struct Populator {
    force: bool,
    path: String,
}

impl Populator {
    /// `force` is set on create and import, when the state starts out empty
    pub fn new(force: bool) -> Self {
        Self {
            force,
            path: String::new(),
        }
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    fn field_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn nested(&self, path: String, force: bool) -> Populator {
        Populator { force, path }
    }

    fn mismatch(&self, key: &str, expected: &'static str, actual: &Value) -> EngineError {
        EngineError::malformed(self.field_path(key), expected, json_type(actual))
    }

    fn assign<T>(&self, dst: &mut Option<T>, value: Option<T>, policy: MergePolicy) {
        if policy.allows(self.force, dst.is_some()) {
            *dst = value;
        }
    }

    /// Populates every key of `object` into `dst`
    pub fn populate<T: Populate>(
        &self,
        dst: &mut T,
        object: &Map<String, Value>,
    ) -> Result<(), EngineError> {
        for (key, value) in object {
            dst.populate_field(key, value, self)?;
        }
        Ok(())
    }

    pub fn string(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<String>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => return Err(self.mismatch(key, "string", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }

    /// Integral JSON numbers only. Fractional or out-of-range numbers are malformed.
    pub fn integer(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<i64>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::Number(n) => Some(narrow(n).ok_or_else(|| {
                EngineError::malformed(self.field_path(key), "integer", format!("number {}", n))
            })?),
            other => return Err(self.mismatch(key, "integer", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }

    pub fn float(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<f64>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64(),
            other => return Err(self.mismatch(key, "number", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }

    pub fn boolean(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<bool>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::Bool(b) => Some(*b),
            other => return Err(self.mismatch(key, "bool", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }

    pub fn strings(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<Vec<String>>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::Array(items) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::String(s) => Ok(s.clone()),
                        other => Err(self.mismatch(&format!("{}[{}]", key, i), "string", other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => return Err(self.mismatch(key, "list", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }

    /// Recurses into a nested object, allocating it when the policy allows a write.
    /// A null object only clears `dst` when forced or when it holds server values.
    pub fn object<T: Populate + Default>(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<T>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        match value {
            Value::Null => {
                if self.force || policy == MergePolicy::AlwaysOverwrite {
                    *dst = None;
                }
                Ok(())
            }
            Value::Object(map) => {
                if dst.is_none() {
                    if !policy.allows(self.force, false) {
                        return Ok(());
                    }
                    *dst = Some(T::default());
                }
                match dst.as_mut() {
                    Some(inner) => self
                        .nested(self.field_path(key), self.force)
                        .populate(inner, map),
                    None => Ok(()),
                }
            }
            other => Err(self.mismatch(key, "object", other)),
        }
    }

    /// Rebuilds a list of objects. New elements have no prior state, so they are populated with force.
    pub fn list<T: Populate + Default>(
        &self,
        key: &str,
        value: &Value,
        dst: &mut Option<Vec<T>>,
        policy: MergePolicy,
    ) -> Result<(), EngineError> {
        let decoded = match value {
            Value::Null => None,
            Value::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let element_key = format!("{}[{}]", key, i);
                    let Value::Object(map) = item else {
                        return Err(self.mismatch(&element_key, "object", item));
                    };
                    let mut element = T::default();
                    self.nested(self.field_path(&element_key), true)
                        .populate(&mut element, map)?;
                    elements.push(element);
                }
                Some(elements)
            }
            other => return Err(self.mismatch(key, "list", other)),
        };
        self.assign(dst, decoded, policy);
        Ok(())
    }
}

fn narrow(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
