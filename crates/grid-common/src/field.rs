//! Attribute schema and value types.
//!
//! A feature source describes its attributes with a [`FieldDef`] schema and
//! hands out raw [`FieldValue`]s. The renderer resolves each selected field to
//! a [`ScalarKind`] once, then coerces every value of that field into an
//! [`AttributeValue`] for the grid's attribute records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Attribute record attached to a feature in the grid output.
pub type AttributeRecord = BTreeMap<String, AttributeValue>;

/// Field type as reported by a feature source schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Real,
    String,
    /// Any other source type (dates, booleans, lists...). Rendered as text.
    Other(String),
}

/// One entry of a feature source schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A raw attribute value as stored by a feature source.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// The closed set of scalar kinds written into attribute records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Real,
    Text,
}

impl From<&FieldType> for ScalarKind {
    fn from(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Integer => ScalarKind::Integer,
            FieldType::Real => ScalarKind::Real,
            FieldType::String | FieldType::Other(_) => ScalarKind::Text,
        }
    }
}

impl ScalarKind {
    /// Coerce a raw source value of field `field` into this kind.
    ///
    /// Reals are truncated toward zero when read as integers. Strings must
    /// parse cleanly; anything can be read as text.
    pub fn coerce(self, field: &str, value: &FieldValue) -> GridResult<AttributeValue> {
        let mismatch = || GridError::InvalidAttribute {
            field: field.to_string(),
            expected: self,
            value: value.to_string(),
        };

        match self {
            ScalarKind::Integer => match value {
                FieldValue::Integer(v) => Ok(AttributeValue::Integer(*v)),
                FieldValue::Real(v) if v.is_finite() => Ok(AttributeValue::Integer(v.trunc() as i64)),
                FieldValue::Real(_) => Err(mismatch()),
                FieldValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(AttributeValue::Integer)
                    .map_err(|_| mismatch()),
                FieldValue::Boolean(b) => Ok(AttributeValue::Integer(i64::from(*b))),
            },
            ScalarKind::Real => match value {
                FieldValue::Integer(v) => Ok(AttributeValue::Real(*v as f64)),
                FieldValue::Real(v) => Ok(AttributeValue::Real(*v)),
                FieldValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(AttributeValue::Real)
                    .map_err(|_| mismatch()),
                FieldValue::Boolean(b) => Ok(AttributeValue::Real(if *b { 1.0 } else { 0.0 })),
            },
            ScalarKind::Text => Ok(AttributeValue::Text(value.to_string())),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Integer => "integer",
            ScalarKind::Real => "real",
            ScalarKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A typed scalar in an attribute record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    /// Interpret this value as a feature identifier.
    ///
    /// Integers are taken as-is, finite reals are truncated and text must
    /// parse as an integer.
    pub fn as_feature_id(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            AttributeValue::Real(v) if v.is_finite() => Some(v.trunc() as i64),
            AttributeValue::Real(_) => None,
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Real(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Real(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}
