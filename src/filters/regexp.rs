// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Regular expression extraction

use regex::Regex;

use super::{filter_common, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

/// Regular expression searched in the text of the selected value
///
/// Returns the first capture group that took part in the match (the whole
/// match when the pattern has no group), or the expansion of a template
/// such as `"${3}-${2}-${1}"`.
#[derive(Debug)]
pub struct Regexp {
    selector: Selector,
    regex: Regex,
    template: Option<String>,
    nth: usize,
    default: Option<Value>,
}

impl Regexp {
    pub fn new(selector: impl Into<Selector>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid pattern {:?}: {}", pattern, e)))?;
        Ok(Self {
            selector: selector.into(),
            regex,
            template: None,
            nth: 0,
            default: None,
        })
    }

    /// Expand this template (`$1`, `${name}`) instead of returning a group
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Use the n-th match (0-based) instead of the first
    pub fn nth(mut self, nth: usize) -> Self {
        self.nth = nth;
        self
    }
}

impl Filter for Regexp {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, _ctx: &Context<'_>) -> Result<Value> {
        let text = value.text();
        let caps = self
            .regex
            .captures_iter(&text)
            .nth(self.nth)
            .ok_or_else(|| Error::NoMatch {
                pattern: self.regex.as_str().to_string(),
                text: text.clone(),
            })?;

        let out = match &self.template {
            Some(template) => {
                let mut dst = String::new();
                caps.expand(template, &mut dst);
                dst
            }
            None => caps
                .iter()
                .skip(1)
                .flatten()
                .next()
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        };
        Ok(Value::Text(out))
    }
}

filter_common!(Regexp);
