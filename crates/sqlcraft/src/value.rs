//! Literal values and parameter typing.
//!
//! [`Value`] is the closed set of scalars that can be bound to a statement or
//! rendered as a SQL literal. [`ValueRef`] is the shared cell behind
//! reference-bound parameters, read at execution time rather than bind time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A scalar carried through parameter binding and literal quoting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    Json(serde_json::Value),
}

/// Storage kind reported to the driver when a parameter is bound.
///
/// Booleans, integers, byte blobs and NULL each get their own kind;
/// everything else (floats included) is bound as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Null,
    Bool,
    Int,
    Str,
    Lob,
}

impl Value {
    /// The storage kind used when no explicit type accompanies a bind call.
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Null => ParamType::Null,
            Value::Bool(_) => ParamType::Bool,
            Value::Int(_) => ParamType::Int,
            Value::Bytes(_) => ParamType::Lob,
            Value::Float(_) | Value::Text(_) | Value::Timestamp(_) | Value::Json(_) => {
                ParamType::Str
            }
        }
    }

    /// Whether the value renders as a bare numeric literal.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Render a value as a standalone SQL literal.
///
/// This is the manual fallback used when a driver exposes no native quoting:
/// numeric literals pass through unquoted, strings are wrapped in single
/// quotes with embedded quotes doubled and NUL, LF, CR, backslash and ctrl-Z
/// backslash-escaped.
pub fn quote_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => quote_str(s),
        Value::Bytes(b) => {
            let mut out = String::with_capacity(b.len() * 2 + 3);
            out.push_str("X'");
            for byte in b {
                out.push_str(&format!("{byte:02X}"));
            }
            out.push('\'');
            out
        }
        Value::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
        Value::Json(j) => quote_str(&j.to_string()),
    }
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Shared mutable cell for reference-bound parameters.
///
/// The driver reads the cell when the statement executes, so updating it
/// between bind and execution changes what is sent.
#[derive(Debug, Clone)]
pub struct ValueRef(Arc<Mutex<Value>>);

impl ValueRef {
    pub fn new(value: impl Into<Value>) -> Self {
        ValueRef(Arc::new(Mutex::new(value.into())))
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.0.lock().unwrap() = value.into();
    }

    pub fn get(&self) -> Value {
        self.0.lock().unwrap().clone()
    }
}

/// Identifier of a statement parameter: a `:name` placeholder or a 1-based
/// positional index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamId {
    Name(String),
    Index(usize),
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamId::Name(name) => f.write_str(name),
            ParamId::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ParamId {
    fn from(name: &str) -> Self {
        ParamId::Name(name.to_string())
    }
}

impl From<String> for ParamId {
    fn from(name: String) -> Self {
        ParamId::Name(name)
    }
}

impl From<usize> for ParamId {
    fn from(index: usize) -> Self {
        ParamId::Index(index)
    }
}

/// Named parameter mapping used for bulk execution and pending builder
/// parameters.
pub type ParamMap = BTreeMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_type_inference() {
        assert_eq!(Value::Null.param_type(), ParamType::Null);
        assert_eq!(Value::Bool(true).param_type(), ParamType::Bool);
        assert_eq!(Value::Int(7).param_type(), ParamType::Int);
        assert_eq!(Value::Float(1.5).param_type(), ParamType::Str);
        assert_eq!(Value::Text("x".into()).param_type(), ParamType::Str);
        assert_eq!(Value::Bytes(vec![1]).param_type(), ParamType::Lob);
    }

    #[test]
    fn quote_plain_string() {
        assert_eq!(quote_literal(&Value::from("abc")), "'abc'");
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote_literal(&Value::from("O'Brien")), "'O''Brien'");
    }

    #[test]
    fn quote_escapes_control_characters() {
        assert_eq!(
            quote_literal(&Value::from("a\\b\nc\rd\0e\u{1a}f")),
            "'a\\\\b\\nc\\rd\\0e\\Zf'"
        );
    }

    #[test]
    fn numeric_literals_pass_through() {
        assert_eq!(quote_literal(&Value::Int(-3)), "-3");
        assert_eq!(quote_literal(&Value::Float(2.5)), "2.5");
    }

    #[test]
    fn null_and_bool_literals() {
        assert_eq!(quote_literal(&Value::Null), "NULL");
        assert_eq!(quote_literal(&Value::Bool(true)), "1");
        assert_eq!(quote_literal(&Value::Bool(false)), "0");
    }

    #[test]
    fn bytes_render_as_hex() {
        assert_eq!(quote_literal(&Value::Bytes(vec![0xAB, 0x01])), "X'AB01'");
    }

    #[test]
    fn value_ref_reads_latest() {
        let cell = ValueRef::new(1i64);
        cell.set("later");
        assert_eq!(cell.get(), Value::Text("later".into()));
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }
}
