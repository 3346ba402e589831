// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL dispatch table
//!
//! Ordered `(pattern, page factory)` bindings. Patterns are anchored at both
//! ends and tried in declaration order; the first full match wins. Patterns
//! starting with `/` are relative to the site's base URL.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::page::{Page, PageData};
use crate::dom::DocumentKind;
use crate::error::{Error, Result};
use crate::http::Response;

type Factory = Arc<dyn Fn(PageData) -> Arc<dyn Page> + Send + Sync>;

struct PendingBinding {
    pattern: Option<String>,
    kind: DocumentKind,
    factory: Factory,
}

/// Bindings as declared by a site module, compiled into a [`UrlDispatcher`]
#[derive(Default)]
pub struct PatternSet {
    bindings: Vec<PendingBinding>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a pattern to a page factory
    pub fn bind<P, F>(mut self, kind: DocumentKind, pattern: &str, factory: F) -> Self
    where
        P: Page,
        F: Fn(PageData) -> P + Send + Sync + 'static,
    {
        self.bindings.push(PendingBinding {
            pattern: Some(pattern.to_string()),
            kind,
            factory: Arc::new(move |data| Arc::new(factory(data)) as Arc<dyn Page>),
        });
        self
    }

    /// Bind an HTML page
    pub fn html<P, F>(self, pattern: &str, factory: F) -> Self
    where
        P: Page,
        F: Fn(PageData) -> P + Send + Sync + 'static,
    {
        self.bind(DocumentKind::Html, pattern, factory)
    }

    /// Bind a JSON page
    pub fn json<P, F>(self, pattern: &str, factory: F) -> Self
    where
        P: Page,
        F: Fn(PageData) -> P + Send + Sync + 'static,
    {
        self.bind(DocumentKind::Json, pattern, factory)
    }

    /// Bind a page whose body is kept as text
    pub fn raw<P, F>(self, pattern: &str, factory: F) -> Self
    where
        P: Page,
        F: Fn(PageData) -> P + Send + Sync + 'static,
    {
        self.bind(DocumentKind::Raw, pattern, factory)
    }

    /// Binding without pattern, accepted only through the page's `is_here`
    pub fn fallback<P, F>(mut self, kind: DocumentKind, factory: F) -> Self
    where
        P: Page,
        F: Fn(PageData) -> P + Send + Sync + 'static,
    {
        self.bindings.push(PendingBinding {
            pattern: None,
            kind,
            factory: Arc::new(move |data| Arc::new(factory(data)) as Arc<dyn Page>),
        });
        self
    }

    /// Compile every pattern
    pub fn compile(self, base_url: Option<&Url>) -> Result<UrlDispatcher> {
        let base = base_url.map(|u| u.as_str().trim_end_matches('/').to_string());

        let bindings = self
            .bindings
            .into_iter()
            .map(|pending| {
                let regex = match pending.pattern {
                    Some(ref pattern) => Some(compile_pattern(pattern, base.as_deref())?),
                    None => None,
                };
                Ok(Binding {
                    source: pending.pattern,
                    regex,
                    kind: pending.kind,
                    factory: pending.factory,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(UrlDispatcher { bindings })
    }
}

fn compile_pattern(pattern: &str, base: Option<&str>) -> Result<Regex> {
    let full = if pattern.starts_with('/') {
        let base = base.ok_or_else(|| {
            Error::Config(format!("Relative pattern '{}' needs a base URL", pattern))
        })?;
        format!("^(?:{}{})$", regex::escape(base), pattern)
    } else {
        format!("^(?:{})$", pattern)
    };

    Regex::new(&full).map_err(|e| Error::Config(format!("Invalid URL pattern '{}': {}", pattern, e)))
}

struct Binding {
    source: Option<String>,
    regex: Option<Regex>,
    kind: DocumentKind,
    factory: Factory,
}

/// A pattern match: which binding, and its captures
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchMatch {
    /// Index of the binding in declaration order
    pub binding: usize,
    /// Positional captures
    pub groups: Vec<Option<String>>,
    /// Named captures
    pub params: HashMap<String, String>,
}

/// Outcome of resolving a response against the table
pub enum Resolution {
    /// A page accepted the response
    Page(Arc<dyn Page>),
    /// Some pattern matched but every candidate page rejected it in `is_here`
    Rejected,
    /// No pattern matched and no fallback page accepted it
    Unmatched,
}

/// Immutable, ordered dispatch table
pub struct UrlDispatcher {
    bindings: Vec<Binding>,
}

impl UrlDispatcher {
    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Pattern source of a binding
    pub fn pattern(&self, binding: usize) -> Option<&str> {
        self.bindings.get(binding).and_then(|b| b.source.as_deref())
    }

    /// First binding whose pattern matches the whole URL
    pub fn dispatch(&self, url: &str) -> Option<DispatchMatch> {
        self.matches(url).next()
    }

    /// Every matching binding, in declaration order
    pub fn matches<'a>(&'a self, url: &'a str) -> impl Iterator<Item = DispatchMatch> + 'a {
        self.bindings.iter().enumerate().filter_map(move |(index, binding)| {
            let regex = binding.regex.as_ref()?;
            let caps = regex.captures(url)?;

            let groups = caps
                .iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect();
            let params = regex
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                .collect();

            Some(DispatchMatch {
                binding: index,
                groups,
                params,
            })
        })
    }

    /// Build the page for a response
    ///
    /// Pattern matches are tried first, then fallback bindings. A candidate
    /// whose `is_here` is false is skipped.
    pub fn resolve(&self, response: &Response) -> Result<Resolution> {
        let url = strip_fragment(&response.url);
        let mut documents: HashMap<DocumentKind, PageData> = HashMap::new();
        let mut rejected = false;

        let candidates = self
            .matches(&url)
            .map(|m| (m.binding, m.groups, m.params))
            .chain(
                self.bindings
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.regex.is_none())
                    .map(|(i, _)| (i, Vec::new(), HashMap::new())),
            )
            .collect::<Vec<_>>();

        for (index, groups, params) in candidates {
            let binding = &self.bindings[index];
            let data = match documents.get(&binding.kind) {
                Some(data) => data.clone(),
                None => {
                    let data = PageData::from_response(binding.kind, response)?;
                    documents.insert(binding.kind, data.clone());
                    data
                }
            };

            let page = (binding.factory)(data.with_captures(groups, params));
            if page.is_here() {
                debug!(
                    "Handle {} with binding #{} ({})",
                    url,
                    index,
                    binding.source.as_deref().unwrap_or("fallback")
                );
                return Ok(Resolution::Page(page));
            }

            debug!("Binding #{} matched {} but the page is not here", index, url);
            if binding.regex.is_some() {
                rejected = true;
            }
        }

        Ok(if rejected {
            Resolution::Rejected
        } else {
            Resolution::Unmatched
        })
    }
}

impl fmt::Debug for UrlDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| b.source.as_deref().unwrap_or("<fallback>")))
            .finish()
    }
}

fn strip_fragment(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}
