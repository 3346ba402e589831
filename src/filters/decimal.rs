// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Exact decimal amounts

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use super::{filter_common, CleanText, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

lazy_static! {
    static ref NOT_NUMERIC: Regex = Regex::new(r"[^\d\-.]").unwrap();
}

/// Grouping and decimal separators expected in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separators {
    /// `1.234,56`
    Continental,
    /// `1,234.56`
    Us,
    /// Text left as is before stripping
    Raw,
}

type SignFn = dyn Fn(&str) -> i8 + Send + Sync;

/// Cleaned text parsed as an exact [`Decimal`]
///
/// Never goes through floating point.
pub struct CleanDecimal {
    selector: Selector,
    cleaner: CleanText,
    separators: Separators,
    sign: Option<Arc<SignFn>>,
    default: Option<Value>,
}

impl CleanDecimal {
    /// Continental notation: `.` groups thousands, `,` is the decimal mark
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            cleaner: CleanText::new("."),
            separators: Separators::Continental,
            sign: None,
            default: None,
        }
    }

    /// US notation: `,` groups thousands, `.` is the decimal mark
    pub fn us(mut self) -> Self {
        self.separators = Separators::Us;
        self
    }

    /// Keep `.` and `,` untouched (only non-numeric characters are dropped)
    pub fn raw(mut self) -> Self {
        self.separators = Separators::Raw;
        self
    }

    /// Sign computed from the cleaned text; the result is `|value| * sign`
    pub fn sign<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> i8 + Send + Sync + 'static,
    {
        self.sign = Some(Arc::new(f));
        self
    }

    /// Parse one piece of text
    pub fn parse(&self, text: &str) -> Result<Decimal> {
        let normalised = match self.separators {
            Separators::Continental => text.replace('.', "").replace(',', "."),
            Separators::Us => text.replace(',', ""),
            Separators::Raw => text.to_string(),
        };
        let digits = NOT_NUMERIC.replace_all(&normalised, "");
        let value =
            Decimal::from_str(&digits).map_err(|_| Error::conversion(text, "Decimal"))?;

        Ok(match &self.sign {
            Some(sign) => value.abs() * Decimal::from(sign(text)),
            None => value,
        })
    }
}

impl Filter for CleanDecimal {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let decimal = match value {
            Value::Decimal(d) => d,
            Value::Json(JsonValue::Number(n)) => {
                Decimal::from_str(&n.to_string()).map_err(|_| Error::conversion(n.to_string(), "Decimal"))?
            }
            other => self.parse(&self.cleaner.clean_value(&other))?,
        };
        Ok(Value::Decimal(decimal))
    }
}

impl fmt::Debug for CleanDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanDecimal")
            .field("selector", &self.selector)
            .field("separators", &self.separators)
            .field("sign", &self.sign.is_some())
            .finish()
    }
}

filter_common!(CleanDecimal);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, Node};
    use crate::filters::FilterExt;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_continental_amounts() {
        let f = CleanDecimal::new(".");
        assert_eq!(f.parse("1.234,56 €").unwrap(), dec("1234.56"));
        assert_eq!(f.parse("-800,00").unwrap(), dec("-800.00"));
        assert_eq!(f.parse("229,90").unwrap(), dec("229.90"));
    }

    #[test]
    fn test_exact_decimal_digits() {
        let f = CleanDecimal::new(".");
        let amount = f.parse("0,10").unwrap() + f.parse("0,20").unwrap();
        assert_eq!(amount, dec("0.30"));
        assert_eq!(f.parse("12 345 678 901 234,99").unwrap().to_string(), "12345678901234.99");
    }

    #[test]
    fn test_us_notation() {
        let f = CleanDecimal::new(".").us();
        assert_eq!(f.parse("$1,234.56").unwrap(), dec("1234.56"));
    }

    #[test]
    fn test_sign_function() {
        let f = CleanDecimal::new(".").sign(|t| if t.contains("DB") { -1 } else { 1 });
        assert_eq!(f.parse("12,00 DB").unwrap(), dec("-12.00"));
        assert_eq!(f.parse("-12,00 CR").unwrap(), dec("12.00"));
    }

    #[test]
    fn test_from_nodes_and_default() {
        let node = Node::Element(
            parse_html("<p class='amount'>blah: <span>229,90</span></p><p class='empty'>n/a</p>")
                .unwrap()
                .root(),
        );

        let amount: Decimal = CleanDecimal::new(CleanText::new("p.amount"))
            .extract_from(&node)
            .unwrap();
        assert_eq!(amount, dec("229.90"));

        let err = CleanDecimal::new("p.empty").apply(&Context::new(&node)).unwrap_err();
        assert!(err.is_extraction());

        let fallback: Decimal = CleanDecimal::new("p.empty")
            .default(Decimal::ZERO)
            .extract_from(&node)
            .unwrap();
        assert_eq!(fallback, Decimal::ZERO);
    }
}
