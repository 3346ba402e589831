// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Text cleaning

use lazy_static::lazy_static;
use regex::Regex;

use super::{filter_common, Context, Filter, Selector, Value};
use crate::dom::Element;
use crate::error::Result;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"[\s\u{a0}\t]+").unwrap();
    static ref INLINE_WHITESPACE: Regex = Regex::new(r"[\t\r\f\x0b \u{a0}]+").unwrap();
}

/// Collapse whitespace runs (NBSP and tabs included) to one space and trim
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Cleaned text of the selected nodes
///
/// Each element contributes its stripped text pieces joined by a space;
/// elements are then joined by a space too, and the result is cleaned.
#[derive(Debug)]
pub struct CleanText {
    selector: Selector,
    symbols: String,
    replace: Vec<(String, String)>,
    children: bool,
    newlines: bool,
    default: Option<Value>,
}

impl CleanText {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            symbols: String::new(),
            replace: Vec::new(),
            children: true,
            newlines: true,
            default: None,
        }
    }

    /// Characters deleted after cleaning
    pub fn symbols(mut self, symbols: impl Into<String>) -> Self {
        self.symbols = symbols.into();
        self
    }

    /// Substring replacement applied last
    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replace.push((from.into(), to.into()));
        self
    }

    /// Only the element's own text nodes, not its descendants'
    pub fn own_text(mut self) -> Self {
        self.children = false;
        self
    }

    /// Keep line breaks instead of folding them into spaces
    pub fn keep_newlines(mut self) -> Self {
        self.newlines = false;
        self
    }

    fn clean(&self, text: &str) -> String {
        if self.newlines {
            clean_text(text)
        } else {
            INLINE_WHITESPACE.replace_all(text, " ").trim().to_string()
        }
    }

    fn element_text(&self, element: &Element) -> String {
        let pieces = if self.children {
            element.text_pieces()
        } else {
            element.own_text_pieces()
        };
        let joined = pieces.iter().map(|p| p.trim()).collect::<Vec<_>>().join(" ");
        self.clean(&joined)
    }

    /// Clean an already selected value
    pub(super) fn clean_value(&self, value: &Value) -> String {
        let raw = match value {
            Value::Nodes(nodes) => nodes
                .iter()
                .map(|n| self.element_text(n))
                .collect::<Vec<_>>()
                .join(" "),
            Value::List(items) => items
                .iter()
                .map(|v| self.clean_value(v))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.text(),
        };

        let mut text = self.clean(&raw);
        for symbol in self.symbols.chars() {
            text = text.replace(symbol, "");
        }
        for (from, to) in &self.replace {
            text = text.replace(from.as_str(), to);
        }
        text
    }
}

impl Filter for CleanText {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        Ok(Value::Text(self.clean_value(&value)))
    }
}

filter_common!(CleanText);
