// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Values flowing between filters

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::dom::Element;
use crate::error::{Error, Result};

/// Dynamic value produced by a filter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Elements matched by a CSS path
    Nodes(Vec<Element>),
    /// Value reached by a JSON path
    Json(JsonValue),
    Text(String),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
    /// Tuple produced by multi-selector filters
    List(Vec<Value>),
    /// Explicit "no value" marker, usually set as a default
    NotAvailable,
}

impl Value {
    /// Whether this value carries nothing usable
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Nodes(nodes) => nodes.is_empty(),
            Value::Json(JsonValue::Null) => true,
            Value::Json(JsonValue::String(s)) => s.trim().is_empty(),
            Value::Text(s) => s.trim().is_empty(),
            Value::List(items) => items.iter().all(Value::is_empty),
            Value::NotAvailable => true,
            _ => false,
        }
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, Value::NotAvailable)
    }

    /// Raw text of the value
    ///
    /// Elements contribute their stripped text pieces joined by one space.
    pub fn text(&self) -> String {
        match self {
            Value::Nodes(nodes) => nodes
                .iter()
                .map(|n| {
                    n.text_pieces()
                        .iter()
                        .map(|t| t.trim())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join(" "),
            Value::Json(JsonValue::String(s)) => s.clone(),
            Value::Json(JsonValue::Null) => String::new(),
            Value::Json(other) => other.to_string(),
            Value::Text(s) => s.clone(),
            Value::Decimal(d) => d.to_string(),
            Value::Date(d) => d.to_string(),
            Value::DateTime(dt) => dt.to_string(),
            Value::Time(t) => t.to_string(),
            Value::Duration(d) => d.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::text)
                .collect::<Vec<_>>()
                .join(" "),
            Value::NotAvailable => String::new(),
        }
    }

    /// Elements of a node-list value
    pub fn as_nodes(&self) -> Option<&[Element]> {
        match self {
            Value::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Name of the variant, for conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nodes(_) => "nodes",
            Value::Json(_) => "json",
            Value::Text(_) => "text",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
            Value::NotAvailable => "not available",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::Json(v)
    }
}

impl From<Vec<Element>> for Value {
    fn from(nodes: Vec<Element>) -> Self {
        Value::Nodes(nodes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::NotAvailable)
    }
}

/// Typed conversion out of a [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::NotAvailable => Err(Error::conversion("not available", "String")),
            other => Ok(other.text()),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Json(JsonValue::Number(n)) => {
                Decimal::from_str(&n.to_string()).map_err(|_| Error::conversion(n.to_string(), "Decimal"))
            }
            Value::Text(_) | Value::Json(JsonValue::String(_)) => {
                let text = value.text();
                Decimal::from_str(text.trim()).map_err(|_| Error::conversion(text, "Decimal"))
            }
            other => Err(Error::conversion(other.type_name(), "Decimal")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            other => Err(Error::conversion(other.text(), "NaiveDate")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(Error::conversion(other.text(), "NaiveDateTime")),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(t) => Ok(t),
            Value::DateTime(dt) => Ok(dt.time()),
            other => Err(Error::conversion(other.text(), "NaiveTime")),
        }
    }
}

impl FromValue for TimeDelta {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(Error::conversion(other.text(), "TimeDelta")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(JsonValue::Number(ref n)) => n
                .as_i64()
                .ok_or_else(|| Error::conversion(n.to_string(), "i64")),
            Value::Decimal(d) if d.fract().is_zero() => {
                i64::from_str(&d.trunc().to_string()).map_err(|_| Error::conversion(d.to_string(), "i64"))
            }
            Value::NotAvailable => Err(Error::conversion("not available", "i64")),
            other => {
                let text = other.text();
                text.trim()
                    .parse()
                    .map_err(|_| Error::conversion(text, "i64"))
            }
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(JsonValue::Bool(b)) => Ok(b),
            other => match other.text().trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                text => Err(Error::conversion(text, "bool")),
            },
        }
    }
}

impl FromValue for JsonValue {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(s) => Ok(JsonValue::String(s)),
            Value::NotAvailable => Ok(JsonValue::Null),
            other => Err(Error::conversion(other.type_name(), "serde_json::Value")),
        }
    }
}

impl FromValue for Vec<Element> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Nodes(nodes) => Ok(nodes),
            other => Err(Error::conversion(other.type_name(), "Vec<Element>")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::NotAvailable | Value::Json(JsonValue::Null) => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Json(JsonValue::Array(items)) => items
                .into_iter()
                .map(|v| T::from_value(Value::Json(v)))
                .collect(),
            other => Ok(vec![T::from_value(other)?]),
        }
    }
}

/// Name → value bag scoped to one extraction pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    values: HashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::Nodes(vec![]).is_empty());
        assert!(Value::Text("  ".into()).is_empty());
        assert!(Value::NotAvailable.is_empty());
        assert!(Value::Json(JsonValue::Null).is_empty());
        assert!(!Value::Decimal(Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_typed_conversions() {
        assert_eq!(Decimal::from_value(Value::from(" 12.50 ")).unwrap(), dec("12.50"));
        assert_eq!(
            Decimal::from_value(Value::Json(serde_json::json!(3.25))).unwrap(),
            dec("3.25")
        );
        assert_eq!(i64::from_value(Value::from("42")).unwrap(), 42);
        assert!(bool::from_value(Value::Json(serde_json::json!(true))).unwrap());

        let none: Option<Decimal> = FromValue::from_value(Value::NotAvailable).unwrap();
        assert_eq!(none, None);

        assert!(String::from_value(Value::NotAvailable).is_err());
        assert!(NaiveDate::from_value(Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_list_conversion() {
        let list = Value::List(vec![Value::from("a"), Value::from("b")]);
        let out: Vec<String> = FromValue::from_value(list).unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn test_env() {
        let env = Env::new().with("subid", "0042");
        assert_eq!(env.get("subid"), Some(&Value::from("0042")));
        assert!(!env.contains("other"));
    }
}
