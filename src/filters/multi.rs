// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Filters combining several selectors, and environment lookup

use std::sync::Arc;

use tracing::trace;

use super::text::clean_text;
use super::{filter_common, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

/// Selector evaluating every selector against the same node into a `Value::List`
fn all_of(selectors: Vec<Selector>) -> Selector {
    let selectors = Arc::new(selectors);
    Selector::func(move |ctx| {
        selectors
            .iter()
            .map(|s| match s.select(ctx)? {
                Value::Nodes(nodes) if nodes.is_empty() => {
                    Err(Error::not_found(s.describe(), ctx.node.describe()))
                }
                value => Ok(value),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    })
}

fn item_text(value: &Value) -> String {
    match value {
        Value::Nodes(nodes) => nodes
            .iter()
            .map(|n| clean_text(&Value::Nodes(vec![n.clone()]).text()))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.text(),
    }
}

/// `{}` placeholders filled with the text of each selector, in order
#[derive(Debug)]
pub struct Format {
    format: String,
    selector: Selector,
    default: Option<Value>,
}

impl Format {
    pub fn new<I, S>(format: impl Into<String>, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        Self {
            format: format.into(),
            selector: all_of(selectors.into_iter().map(Into::into).collect()),
            default: None,
        }
    }
}

impl Filter for Format {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let values = match value {
            Value::List(items) => items,
            other => vec![other],
        };

        let pieces: Vec<&str> = self.format.split("{}").collect();
        if pieces.len() - 1 != values.len() {
            return Err(Error::Config(format!(
                "format {:?} expects {} values, got {}",
                self.format,
                pieces.len() - 1,
                values.len()
            )));
        }

        let mut out = String::from(pieces[0]);
        for (value, piece) in values.iter().zip(&pieces[1..]) {
            out.push_str(&item_text(value));
            out.push_str(piece);
        }
        Ok(Value::Text(out))
    }
}

/// Cleaned text of every selected node joined by a separator
#[derive(Debug)]
pub struct Join {
    separator: String,
    selector: Selector,
    default: Option<Value>,
}

impl Join {
    pub fn new(separator: impl Into<String>, selector: impl Into<Selector>) -> Self {
        Self {
            separator: separator.into(),
            selector: selector.into(),
            default: None,
        }
    }
}

impl Filter for Join {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let parts: Vec<String> = match value {
            Value::Nodes(nodes) => nodes
                .into_iter()
                .map(|n| clean_text(&Value::Nodes(vec![n]).text()))
                .collect(),
            Value::List(items) => items.iter().map(|v| clean_text(&v.text())).collect(),
            other => vec![clean_text(&other.text())],
        };
        Ok(Value::Text(parts.join(&self.separator)))
    }
}

/// First selector yielding a non-empty value
#[derive(Debug)]
pub struct Coalesce {
    selectors: Vec<Selector>,
    default: Option<Value>,
}

impl Coalesce {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            default: None,
        }
    }
}

impl Filter for Coalesce {
    fn selector(&self) -> &Selector {
        static NOTHING: Selector = Selector::Value(Value::NotAvailable);
        self.selectors.first().unwrap_or(&NOTHING)
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        Ok(value)
    }

    fn apply(&self, ctx: &Context<'_>) -> Result<Value> {
        for selector in &self.selectors {
            match selector.select(ctx) {
                Ok(value) if !value.is_empty() => return Ok(value),
                Ok(_) => {}
                Err(e) if e.is_extraction() => trace!("coalesce skips {:?}: {}", selector, e),
                Err(e) => return Err(e),
            }
        }

        match &self.default {
            Some(default) => Ok(default.clone()),
            None => Err(Error::not_found(
                self.selectors
                    .iter()
                    .map(Selector::describe)
                    .collect::<Vec<_>>()
                    .join(" | "),
                ctx.node.describe(),
            )),
        }
    }
}

/// Value of a named environment entry; no default
#[derive(Debug)]
pub struct FromEnv {
    selector: Selector,
}

impl FromEnv {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            selector: Selector::func(move |ctx| {
                ctx.env
                    .and_then(|env| env.get(&name))
                    .cloned()
                    .ok_or_else(|| Error::MissingEnv(name.clone()))
            }),
        }
    }
}

impl Filter for FromEnv {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        Ok(value)
    }
}

impl From<FromEnv> for Selector {
    fn from(filter: FromEnv) -> Self {
        Selector::Filter(Arc::new(filter))
    }
}

filter_common!(Format, Join, Coalesce);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, Node};
    use crate::filters::{CleanDecimal, CleanText, Env, FilterExt};
    use rust_decimal::Decimal;

    fn node() -> Node {
        Node::Element(
            parse_html(
                "<ul><li> Rent </li><li>Salary\n Feb</li></ul>\
                 <span class='ref'>42</span><span class='code'>FR76</span><i class='blank'> </i>",
            )
            .unwrap()
            .root(),
        )
    }

    #[test]
    fn test_format() {
        let f = Format::new("{}-{}", [CleanText::new("span.code"), CleanText::new("span.ref")]);
        let v: String = f.extract_from(&node()).unwrap();
        assert_eq!(v, "FR76-42");

        let bad = Format::new("{}", ["span.code", "span.ref"]);
        assert!(bad.apply(&Context::new(&node())).is_err());
    }

    #[test]
    fn test_format_missing_part() {
        let node = node();
        let err = Format::new("ref {}", ["span.missing"])
            .apply(&Context::new(&node))
            .unwrap_err();
        assert!(err.is_extraction());

        let v: String = Format::new("ref {} / {}", ["span.ref", "span.missing"])
            .default("n/a")
            .extract_from(&node)
            .unwrap();
        assert_eq!(v, "n/a");
    }

    #[test]
    fn test_join() {
        let v: String = Join::new(", ", "li").extract_from(&node()).unwrap();
        assert_eq!(v, "Rent, Salary Feb");
    }

    #[test]
    fn test_coalesce() {
        let node = node();
        let v: String = Coalesce::new([CleanText::new("i.blank"), CleanText::new("span.code")])
            .extract_from(&node)
            .unwrap();
        assert_eq!(v, "FR76");

        let v: String = Coalesce::new(["b.none", "span.ref"]).extract_from(&node).unwrap();
        assert_eq!(v, "42");

        let err = Coalesce::new([CleanText::new("b.none"), CleanText::new("i.blank")])
            .apply(&Context::new(&node))
            .unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn test_env_lookup() {
        let node = node();
        let env = Env::new().with("balance", "1.234,50");
        let ctx = Context::new(&node).with_env(&env);

        let balance: Decimal = CleanDecimal::new(FromEnv::new("balance")).extract(&ctx).unwrap();
        assert_eq!(balance, "1234.50".parse::<Decimal>().unwrap());

        let err = FromEnv::new("missing").apply(&ctx).unwrap_err();
        assert!(matches!(err, Error::MissingEnv(ref n) if n == "missing"));

        let err = CleanDecimal::new(FromEnv::new("missing"))
            .default(Decimal::ZERO)
            .apply(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::MissingEnv(_)));
    }
}
