// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Extraction combinators
//!
//! A filter pulls one typed [`Value`] out of a [`Node`]. Every filter has a
//! [`Selector`] (a path, another filter, a function or a literal) that is
//! evaluated first; the filter then transforms the selected value.
//!
//! ```no_run
//! use pagewalk::filters::{CleanDecimal, CleanText, Context, FilterExt, TableCell};
//! # fn demo(row: pagewalk::dom::Node) -> pagewalk::Result<()> {
//! let label = CleanText::new("td.label");
//! let amount = CleanDecimal::new(CleanText::new("td.amount")).default(rust_decimal::Decimal::ZERO);
//!
//! let ctx = Context::new(&row);
//! let label: String = label.extract(&ctx)?;
//! let amount: rust_decimal::Decimal = amount.extract(&ctx)?;
//! # Ok(()) }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::dom::{json_path, Node};
use crate::error::{Error, Result};

mod attr;
mod date;
mod decimal;
mod map;
mod multi;
mod regexp;
mod table;
mod text;
mod value;

pub use attr::{Attr, Link};
pub use date::{Date, DateTime, Duration, Time};
pub use decimal::CleanDecimal;
pub use map::Map;
pub use multi::{Coalesce, Format, FromEnv, Join};
pub use regexp::Regexp;
pub use table::{Columns, Table, TableCell, TableRow};
pub use text::{clean_text, CleanText};
pub use value::{Env, FromValue, Value};

/// Everything an extraction can read
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub node: &'a Node,
    pub env: Option<&'a Env>,
    pub columns: Option<&'a Columns>,
}

impl<'a> Context<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            env: None,
            columns: None,
        }
    }

    pub fn with_env(mut self, env: &'a Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_columns(mut self, columns: &'a Columns) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Same environment and columns, different node
    pub fn for_node<'b>(&self, node: &'b Node) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            node,
            env: self.env,
            columns: self.columns,
        }
    }
}

type SelectFn = dyn Fn(&Context<'_>) -> Result<Value> + Send + Sync;

/// Where a filter takes its input from
#[derive(Clone)]
pub enum Selector {
    /// CSS selector for HTML nodes, slash path for JSON, `"."` for the node itself
    Path(String),
    /// Nested filter
    Filter(Arc<dyn Filter>),
    /// User function
    Func(Arc<SelectFn>),
    /// Literal value, returned unchanged
    Value(Value),
}

impl Selector {
    /// Wrap a closure
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Selector::Func(Arc::new(f))
    }

    /// Evaluate against the context node
    pub fn select(&self, ctx: &Context<'_>) -> Result<Value> {
        match self {
            Selector::Path(path) => select_path(path, ctx.node),
            Selector::Filter(filter) => filter.apply(ctx),
            Selector::Func(f) => f(ctx),
            Selector::Value(v) => Ok(v.clone()),
        }
    }

    /// Printable form for error messages
    pub fn describe(&self) -> String {
        match self {
            Selector::Path(path) => path.clone(),
            Selector::Filter(filter) => format!("{:?}", filter),
            Selector::Func(_) => "<function>".to_string(),
            Selector::Value(v) => format!("{:?}", v),
        }
    }
}

fn select_path(path: &str, node: &Node) -> Result<Value> {
    let path = path.trim();
    match node {
        Node::Element(element) if path == "." => Ok(Value::Nodes(vec![element.clone()])),
        Node::Element(element) => Ok(Value::Nodes(element.query(path)?)),
        Node::Json(value) => json_path(value, path)
            .map(|v| Value::Json(v.clone()))
            .ok_or_else(|| Error::not_found(path, node.describe())),
        Node::Text(text) if path == "." => Ok(Value::Text(text.clone())),
        Node::Text(_) => Err(Error::not_found(path, node.describe())),
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Path(path) => write!(f, "{:?}", path),
            Selector::Filter(filter) => write!(f, "{:?}", filter),
            Selector::Func(_) => write!(f, "<function>"),
            Selector::Value(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for Selector {
    fn from(path: &str) -> Self {
        Selector::Path(path.to_string())
    }
}

impl From<String> for Selector {
    fn from(path: String) -> Self {
        Selector::Path(path)
    }
}

impl From<Value> for Selector {
    fn from(value: Value) -> Self {
        Selector::Value(value)
    }
}

impl From<Arc<dyn Filter>> for Selector {
    fn from(filter: Arc<dyn Filter>) -> Self {
        Selector::Filter(filter)
    }
}

/// An extraction combinator
pub trait Filter: fmt::Debug + Send + Sync {
    /// Where the input comes from
    fn selector(&self) -> &Selector;

    /// Value returned when extraction fails, if configured
    fn default_value(&self) -> Option<&Value> {
        None
    }

    /// Transform the selected value
    fn filter(&self, value: Value, ctx: &Context<'_>) -> Result<Value>;

    /// Select, then filter, falling back on the default on extraction errors
    fn apply(&self, ctx: &Context<'_>) -> Result<Value> {
        let result = self.selector().select(ctx).and_then(|selected| {
            if matches!(&selected, Value::Nodes(nodes) if nodes.is_empty()) {
                return Err(Error::not_found(self.selector().describe(), ctx.node.describe()));
            }
            self.filter(selected, ctx)
        });

        match result {
            Err(e) if e.is_extraction() => match self.default_value() {
                Some(default) => {
                    trace!("{:?} falls back on its default: {}", self, e);
                    Ok(default.clone())
                }
                None => Err(e),
            },
            other => other,
        }
    }
}

/// Typed helpers available on every filter
pub trait FilterExt: Filter {
    /// Apply and convert the result
    fn extract<T: FromValue>(&self, ctx: &Context<'_>) -> Result<T> {
        T::from_value(self.apply(ctx)?)
    }

    /// Apply against a bare node
    fn extract_from<T: FromValue>(&self, node: &Node) -> Result<T> {
        self.extract(&Context::new(node))
    }
}

impl<F: Filter + ?Sized> FilterExt for F {}

/// Builder setter for the `default` field and `Selector` conversion
macro_rules! filter_common {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $ty {
                /// Value returned instead of an extraction error
                pub fn default(mut self, value: impl Into<$crate::filters::Value>) -> Self {
                    self.default = Some(value.into());
                    self
                }
            }

            impl From<$ty> for $crate::filters::Selector {
                fn from(filter: $ty) -> Self {
                    $crate::filters::Selector::Filter(std::sync::Arc::new(filter))
                }
            }
        )+
    };
}

pub(crate) use filter_common;
