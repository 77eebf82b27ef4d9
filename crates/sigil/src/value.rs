// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The dynamic [`Value`] type that flows through every stage of sigil:
//! template contexts, helper arguments and results, and evaluation
//! intermediates are all a `Value`.
//!
//! `Value` is a single tagged sum type (no raw payload pointers, no
//! branch-by-branch manual destruction); every variant owns its payload and
//! copies are deep. Arrays grow on out-of-bounds index, `Null` promotes in
//! place to `Array`/`Object` on first indexed write, and `Object` preserves
//! insertion order so `for`-loops over an object are deterministic.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// The engine's dynamic polymorphic datum.
#[derive(Clone, Default)]
pub enum Value {
    /// The absence of a value; also the default for out-of-range access.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Double(f64),
    /// A UTF-8 string, plus whether it is already escaped and must not be
    /// re-escaped on output (see [`crate::escaper`]).
    String {
        /// The string payload.
        text: String,
        /// `true` for strings produced by the `rawHtml` built-in (or
        /// otherwise explicitly marked safe); such strings bypass the
        /// escaper at render time.
        safe: bool,
    },
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An ordered string-keyed mapping; iteration order is insertion order.
    Object(Vec<(String, Value)>),
    /// An opaque embedder payload, round-tripped via [`Value::from_value`]
    /// and [`Value::to_value`].
    UserType(Arc<dyn Any + Send + Sync>, &'static str),
}

/// The tag of a [`Value`], returned by [`Value::type_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueType {
    /// See [`Value::Null`].
    Null,
    /// See [`Value::Bool`].
    Bool,
    /// See [`Value::Int`].
    Int,
    /// See [`Value::Double`].
    Double,
    /// See [`Value::String`].
    String,
    /// See [`Value::Array`].
    Array,
    /// See [`Value::Object`].
    Object,
    /// See [`Value::UserType`].
    UserType,
}

impl Value {
    /// Builds the default-constructed value for a given tag, mirroring the
    /// original engine's tagged-constructor family (`Value(Value::Bool)`,
    /// `Value(Value::Array)`, ...).
    pub fn of_type(ty: ValueType) -> Self {
        match ty {
            ValueType::Null => Value::Null,
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Double => Value::Double(0.0),
            ValueType::String => Value::string(String::new()),
            ValueType::Array => Value::Array(Vec::new()),
            ValueType::Object => Value::Object(Vec::new()),
            ValueType::UserType => Value::Null,
        }
    }

    /// Builds a plain (escapable) string value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::String {
            text: text.into(),
            safe: false,
        }
    }

    /// Builds a string value flagged as already-escaped; the evaluator and
    /// escaper will not touch its contents.
    pub fn safe_string(text: impl Into<String>) -> Self {
        Value::String {
            text: text.into(),
            safe: true,
        }
    }

    /// Stores an embedder payload under `UserType`, tagged by the Rust type
    /// name of `T`.
    pub fn from_value<T: Any + Send + Sync>(value: T) -> Self {
        Value::UserType(Arc::new(value), std::any::type_name::<T>())
    }

    /// Retrieves an embedder payload previously stored with
    /// [`Value::from_value`]. Fails with [`Error::WrongType`] if this is not
    /// a `UserType` carrying exactly `T`.
    pub fn to_value<T: Any + Send + Sync + Clone>(&self) -> Result<T> {
        match self {
            Value::UserType(payload, _) => {
                payload
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or(Error::WrongType {
                        expected: std::any::type_name::<T>(),
                        found: "user-type(mismatched tag)",
                    })
            }
            other => Err(Error::WrongType {
                expected: std::any::type_name::<T>(),
                found: other.type_name(),
            }),
        }
    }

    /// The tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::String { .. } => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
            Value::UserType(..) => ValueType::UserType,
        }
    }

    /// A human-readable name for the tag, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String { .. } => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::UserType(..) => "user-type",
        }
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for [`Value::Array`].
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// `true` for [`Value::Object`].
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// `true` for [`Value::String`] carrying the safe flag.
    pub fn is_safe_string(&self) -> bool {
        matches!(self, Value::String { safe: true, .. })
    }

    /// `size() == 0`.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Length for `Array`/`Object`/`String`, `0` for `Null`, `1` otherwise.
    pub fn size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Array(items) => items.len(),
            Value::Object(members) => members.len(),
            Value::String { text, .. } => text.chars().count(),
            _ => 1,
        }
    }

    /// `Null` -> false; `Bool` -> itself; numerics -> `v != 0`; `String` ->
    /// `true` iff the content is exactly `"true"` or a non-zero numeric
    /// literal; `Array`/`Object` -> `size() > 0`.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::String { text, .. } => {
                text == "true" || text.parse::<f64>().map(|n| n != 0.0).unwrap_or(false)
            }
            Value::Array(items) => !items.is_empty(),
            Value::Object(members) => !members.is_empty(),
            Value::UserType(..) => true,
        }
    }

    /// Truncating conversion to `i64`.
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(i) => *i,
            Value::Double(d) => *d as i64,
            Value::String { text, .. } => text.trim().parse::<i64>().unwrap_or(0),
            Value::Array(items) => items.len() as i64,
            Value::Object(members) => members.len() as i64,
            Value::UserType(..) => 0,
        }
    }

    /// Conversion to `f64`.
    pub fn to_double(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => *i as f64,
            Value::Double(d) => *d,
            Value::String { text, .. } => text.trim().parse::<f64>().unwrap_or(0.0),
            Value::Array(items) => items.len() as f64,
            Value::Object(members) => members.len() as f64,
            Value::UserType(..) => 0.0,
        }
    }

    /// `Null` -> `""`; `Bool` -> `"true"/"false"`; `Int` -> decimal; `Double`
    /// -> shortest round-tripping decimal form; `String` -> the payload
    /// verbatim; `Array`/`Object`/`UserType` -> a deterministic debug form
    /// (no stable format is required beyond determinism).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => format_double(*d),
            Value::String { text, .. } => text.clone(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_display_string).collect();
                format!("[{}]", parts.join(","))
            }
            Value::Object(members) => {
                let parts: Vec<String> = members
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, v.to_display_string()))
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
            Value::UserType(_, tag) => format!("<user-type {tag}>"),
        }
    }

    /// Looks up `key` on an `Object` value.
    pub fn has_member(&self, key: &str) -> bool {
        match self {
            Value::Object(members) => members.iter().any(|(k, _)| k == key),
            _ => false,
        }
    }

    /// Returns the value stored under `key` on an `Object`, if any.
    pub fn member(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Array element at `index`, or `None` out of bounds / not an array.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Appends to an `Array`; promotes `Null` to `Array` first.
    pub fn append(&mut self, v: Value) {
        if matches!(self, Value::Null) {
            *self = Value::Array(Vec::new());
        }
        if let Value::Array(items) = self {
            items.push(v);
        }
    }

    /// Indexed write into an `Array`; promotes `Null` to `Array`, and grows
    /// the array (filling gaps with `Null`) if `index` is beyond its current
    /// length.
    pub fn set_index(&mut self, index: usize, v: Value) {
        if matches!(self, Value::Null) {
            *self = Value::Array(Vec::new());
        }
        if let Value::Array(items) = self {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items[index] = v;
        }
    }

    /// Keyed write into an `Object`; promotes `Null` to `Object`, and
    /// overwrites an existing key in place (insertion order preserved)
    /// rather than moving it to the end.
    pub fn set_member(&mut self, key: impl Into<String>, v: Value) {
        if matches!(self, Value::Null) {
            *self = Value::Object(Vec::new());
        }
        if let Value::Object(members) = self {
            let key = key.into();
            if let Some(slot) = members.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = v;
            } else {
                members.push((key, v));
            }
        }
    }

    /// Iterates element values: array elements in order, or object *values*
    /// (not keys) in insertion order. Anything else yields no elements.
    pub fn iter_values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::Array(items) => Box::new(items.iter()),
            Value::Object(members) => Box::new(members.iter().map(|(_, v)| v)),
            _ => Box::new(std::iter::empty()),
        }
    }
}

fn format_double(d: f64) -> String {
    if d == d.trunc() && d.abs() < 1e15 {
        format!("{:.0}", d)
    } else {
        let s = format!("{}", d);
        s
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<std::collections::HashMap<String, T>> for Value {
    fn from(map: std::collections::HashMap<String, T>) -> Self {
        Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Arithmetic operators over `+ - * /` and comparisons over
/// `== != < <= > >=`, per the numeric-promotion and string-concatenation
/// rules below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`: numeric addition, or string concatenation when either side is a
    /// string (the non-string side is stringified via [`Value::to_display_string`]).
    Add,
    /// `-`: numeric subtraction.
    Sub,
    /// `*`: numeric multiplication.
    Mul,
    /// `/`: numeric division; integer division by zero yields `Null`,
    /// double division by zero follows IEEE 754.
    Div,
    /// `==`.
    Eq,
    /// `!=`.
    Ne,
    /// `>=`.
    Ge,
    /// `>`.
    Gt,
    /// `<=`.
    Le,
    /// `<`.
    Lt,
}

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::Double(_) | Value::Bool(_))
}

fn promote(a: &Value, b: &Value) -> (f64, f64, bool) {
    let use_double = matches!(a, Value::Double(_)) || matches!(b, Value::Double(_));
    (a.to_double(), b.to_double(), use_double)
}

impl Value {
    /// Applies `op` to `self` and `rhs` following the numeric-promotion and
    /// string-concatenation rules: `Double` wins promotion if either side is
    /// `Double`, else both sides are treated as `Int`. Comparisons between
    /// unlike non-numeric types are `false` for (in)equality and ordered by
    /// `(tag ordinal, display string)` otherwise, so ordering is
    /// deterministic without being semantically meaningful.
    pub fn apply_binary_op(&self, op: BinaryOp, rhs: &Value) -> Value {
        if op == BinaryOp::Add {
            if let (Value::String { text: a, .. }, Value::String { text: b, .. }) = (self, rhs) {
                return Value::string(format!("{a}{b}"));
            }
            if matches!(self, Value::String { .. }) || matches!(rhs, Value::String { .. }) {
                return Value::string(format!(
                    "{}{}",
                    self.to_display_string(),
                    rhs.to_display_string()
                ));
            }
        }

        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) && !is_numeric(self) && !is_numeric(rhs) {
            let equal = values_structurally_equal(self, rhs);
            return Value::Bool(if op == BinaryOp::Eq { equal } else { !equal });
        }

        if matches!(
            op,
            BinaryOp::Ge | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Lt
        ) && !(is_numeric(self) && is_numeric(rhs))
        {
            let ordering = (self.value_type(), self.to_display_string())
                .cmp(&(rhs.value_type(), rhs.to_display_string()));
            let result = match op {
                BinaryOp::Ge => ordering.is_ge(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Lt => ordering.is_lt(),
                _ => unreachable!(),
            };
            return Value::Bool(result);
        }

        if !is_numeric(self) || !is_numeric(rhs) {
            return Value::Null;
        }

        let (a, b, use_double) = promote(self, rhs);
        match op {
            BinaryOp::Add => numeric_result(a + b, use_double),
            BinaryOp::Sub => numeric_result(a - b, use_double),
            BinaryOp::Mul => numeric_result(a * b, use_double),
            BinaryOp::Div => {
                if use_double {
                    Value::Double(a / b)
                } else if b == 0.0 {
                    Value::Null
                } else {
                    Value::Int((a as i64) / (b as i64))
                }
            }
            BinaryOp::Eq => Value::Bool(a == b),
            BinaryOp::Ne => Value::Bool(a != b),
            BinaryOp::Ge => Value::Bool(a >= b),
            BinaryOp::Gt => Value::Bool(a > b),
            BinaryOp::Le => Value::Bool(a <= b),
            BinaryOp::Lt => Value::Bool(a < b),
        }
    }
}

fn numeric_result(v: f64, use_double: bool) -> Value {
    if use_double {
        Value::Double(v)
    } else {
        Value::Int(v as i64)
    }
}

fn values_structurally_equal(a: &Value, b: &Value) -> bool {
    if a.value_type() != b.value_type() {
        return false;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String { text: x, .. }, Value::String { text: y, .. }) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|(a, b)| values_structurally_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    y.iter()
                        .find(|(k2, _)| k2 == k)
                        .map(|(_, v2)| values_structurally_equal(v, v2))
                        .unwrap_or(false)
                })
        }
        _ => false,
    }
}
