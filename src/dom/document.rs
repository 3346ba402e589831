// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation
//!
//! A page owns exactly one parsed [`Document`]: an HTML tree, a JSON value or
//! raw text. Filters run against a [`Node`] taken from it.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use url::Url;

use super::element::Element;
use super::node::{NodeId, Tree};
use super::parser::parse_html_with_url;
use crate::error::{Error, Result};

/// Parsed HTML document
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    tree: Arc<Tree>,
}

impl HtmlDocument {
    pub(crate) fn new(tree: Arc<Tree>) -> Self {
        Self { tree }
    }

    /// Handle on the document node
    pub fn root(&self) -> Element {
        Element::new(self.tree.clone(), NodeId::ROOT)
    }

    /// URL the document was fetched from
    pub fn url(&self) -> Option<&Url> {
        self.tree.url()
    }

    /// Text of the first `<title>`, trimmed
    pub fn title(&self) -> Option<String> {
        self.root()
            .query_first("title")
            .ok()
            .flatten()
            .map(|t| t.text_content().trim().to_string())
    }

    /// Shortcut for `root().query(selector)`
    pub fn query(&self, selector: &str) -> Result<Vec<Element>> {
        self.root().query(selector)
    }

    /// Shortcut for `root().query_first(selector)`
    pub fn query_first(&self, selector: &str) -> Result<Option<Element>> {
        self.root().query_first(selector)
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }
}

/// How a response body is turned into a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentKind {
    #[default]
    Html,
    Json,
    Raw,
}

/// A parsed response body
#[derive(Debug, Clone)]
pub enum Document {
    Html(HtmlDocument),
    Json(Arc<JsonValue>),
    Raw(Arc<str>),
}

impl Document {
    /// Parse a body according to its kind
    pub fn parse(kind: DocumentKind, body: &str, url: Option<Url>) -> Result<Self> {
        Ok(match kind {
            DocumentKind::Html => Document::Html(parse_html_with_url(body, url)?),
            DocumentKind::Json => Document::Json(Arc::new(serde_json::from_str(body)?)),
            DocumentKind::Raw => Document::Raw(Arc::from(body)),
        })
    }

    /// Kind of this document
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Html(_) => DocumentKind::Html,
            Document::Json(_) => DocumentKind::Json,
            Document::Raw(_) => DocumentKind::Raw,
        }
    }

    pub fn as_html(&self) -> Option<&HtmlDocument> {
        match self {
            Document::Html(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Document::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Document::Raw(text) => Some(text),
            _ => None,
        }
    }

    /// Node to start an extraction from
    pub fn root(&self) -> Node {
        match self {
            Document::Html(doc) => Node::Element(doc.root()),
            Document::Json(value) => Node::Json(JsonValue::clone(value)),
            Document::Raw(text) => Node::Text(text.to_string()),
        }
    }
}

/// What an extraction runs against
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Json(JsonValue),
    Text(String),
}

impl Node {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Node::Element(e) => e.describe(),
            Node::Json(v) => {
                let mut s = v.to_string();
                if s.len() > 60 {
                    let mut cut = 60;
                    while !s.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    s.truncate(cut);
                    s.push_str("...");
                }
                s
            }
            Node::Text(t) => format!("{:?}", t),
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<JsonValue> for Node {
    fn from(v: JsonValue) -> Self {
        Node::Json(v)
    }
}

/// Follow a slash-separated path (`"accounts/0/balance"`) into a JSON value
///
/// Numeric segments index arrays; `""` and `"."` return the value itself.
pub fn json_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.trim();
    if path.is_empty() || path == "." {
        return Some(value);
    }

    path.split('/')
        .filter(|seg| !seg.is_empty())
        .try_fold(value, |current, segment| match current {
            JsonValue::Object(map) => map.get(segment),
            JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Like [`json_path`], with a `NotFound` error naming the path
pub fn json_path_required<'a>(value: &'a JsonValue, path: &str) -> Result<&'a JsonValue> {
    json_path(value, path).ok_or_else(|| Error::not_found(path, Node::Json(value.clone()).describe()))
}
