// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Attribute extraction

use super::{filter_common, Context, Filter, Selector, Value};
use crate::error::{Error, Result};

/// Value of a named attribute on the first selected element
#[derive(Debug)]
pub struct Attr {
    selector: Selector,
    attr: String,
    default: Option<Value>,
}

impl Attr {
    pub fn new(selector: impl Into<Selector>, attr: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attr: attr.into(),
            default: None,
        }
    }

    fn read(&self, value: &Value, ctx: &Context<'_>) -> Result<String> {
        let first = value
            .as_nodes()
            .and_then(|nodes| nodes.first())
            .ok_or_else(|| Error::not_found(self.selector.describe(), ctx.node.describe()))?;

        first
            .attr(&self.attr)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingAttribute {
                element: first.tag_name().to_string(),
                attr: self.attr.clone(),
            })
    }
}

impl Filter for Attr {
    fn selector(&self) -> &Selector {
        &self.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, ctx: &Context<'_>) -> Result<Value> {
        self.read(&value, ctx).map(Value::Text)
    }
}

/// `href` of the first selected element
#[derive(Debug)]
pub struct Link {
    inner: Attr,
    absolute: bool,
    default: Option<Value>,
}

impl Link {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            inner: Attr::new(selector, "href"),
            absolute: false,
            default: None,
        }
    }

    /// Resolve the link against the document URL
    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }
}

impl Filter for Link {
    fn selector(&self) -> &Selector {
        &self.inner.selector
    }

    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn filter(&self, value: Value, ctx: &Context<'_>) -> Result<Value> {
        let href = self.inner.read(&value, ctx)?;
        if !self.absolute {
            return Ok(Value::Text(href));
        }

        let base = value
            .as_nodes()
            .and_then(|nodes| nodes.first())
            .and_then(|e| e.base_url());
        let resolved = match base {
            Some(base) => base
                .join(&href)
                .map_err(|_| Error::conversion(href.as_str(), "URL"))?
                .to_string(),
            None => href,
        };
        Ok(Value::Text(resolved))
    }
}

filter_common!(Attr, Link);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, parse_html_with_url, Node};
    use crate::filters::FilterExt;
    use url::Url;

    const HTML: &str = r#"<a id="next" href="/accounts?page=2">Next</a><span class="x">no attr</span>"#;

    fn node() -> Node {
        Node::Element(parse_html(HTML).unwrap().root())
    }

    #[test]
    fn test_attr_and_link() {
        let node = node();
        let id: String = Attr::new("a", "id").extract_from(&node).unwrap();
        assert_eq!(id, "next");

        let href: String = Link::new("a").extract_from(&node).unwrap();
        assert_eq!(href, "/accounts?page=2");
    }

    #[test]
    fn test_missing_element_and_missing_attribute_are_distinct() {
        let node = node();
        let ctx = Context::new(&node);

        let err = Link::new("a.absent").apply(&ctx).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = Link::new("span.x").apply(&ctx).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { ref attr, .. } if attr == "href"));

        for selector in ["a.absent", "span.x"] {
            let v: String = Link::new(selector).default("#").extract_from(&node).unwrap();
            assert_eq!(v, "#");
        }
    }

    #[test]
    fn test_absolute_link() {
        let url = Url::parse("https://bank.test/home/index").unwrap();
        let doc = parse_html_with_url(HTML, Some(url)).unwrap();
        let node = Node::Element(doc.root());

        let href: String = Link::new("a").absolute().extract_from(&node).unwrap();
        assert_eq!(href, "https://bank.test/accounts?page=2");
    }

    #[test]
    fn test_unresolvable_link_falls_back() {
        let url = Url::parse("https://bank.test/").unwrap();
        let doc = parse_html_with_url(r#"<a href="http://[broken/x">x</a>"#, Some(url)).unwrap();
        let node = Node::Element(doc.root());

        let err = Link::new("a").absolute().apply(&Context::new(&node)).unwrap_err();
        assert!(matches!(err, Error::Conversion { target: "URL", .. }));

        let href: String = Link::new("a").absolute().default("").extract_from(&node).unwrap();
        assert_eq!(href, "");
    }

    #[test]
    fn test_base_href_is_honoured() {
        let url = Url::parse("https://bank.test/").unwrap();
        let html = r#"<head><base href="/app/"></head><a href="ops">ops</a>"#;
        let doc = parse_html_with_url(html, Some(url)).unwrap();
        let node = Node::Element(doc.root());

        let href: String = Link::new("a").absolute().extract_from(&node).unwrap();
        assert_eq!(href, "https://bank.test/app/ops");
    }
}
