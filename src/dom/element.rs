// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element handles

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::node::{NodeId, NodeType, Tree};
use super::selector::Selector;
use crate::error::Result;

/// Handle on one node of a parsed HTML tree
///
/// The handle of the document node itself is also an `Element`, with the
/// tag name `#document`, so a whole document can be used as a query scope.
#[derive(Clone)]
pub struct Element {
    tree: Arc<Tree>,
    id: NodeId,
}

impl Element {
    pub(crate) fn new(tree: Arc<Tree>, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Node id inside the tree
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    fn handle(&self, id: NodeId) -> Element {
        Element::new(self.tree.clone(), id)
    }

    /// Lowercase tag name
    pub fn tag_name(&self) -> &str {
        let data = self.tree.get(self.id);
        match data.node_type {
            NodeType::Document => "#document",
            _ => data.tag_name.as_deref().unwrap_or(""),
        }
    }

    /// Whether this handle points at the document node
    pub fn is_document(&self) -> bool {
        self.tree.get(self.id).node_type == NodeType::Document
    }

    /// Get an attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.tree.get(self.id).attribute(name)
    }

    /// Check whether an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// All attributes in source order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.tree.get(self.id).attributes
    }

    /// Element id attribute
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Check if element has a class
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Parent element, if any
    pub fn parent(&self) -> Option<Element> {
        let parent = self.tree.get(self.id).parent?;
        self.tree.get(parent).is_element().then(|| self.handle(parent))
    }

    pub(crate) fn parent_id(&self) -> Option<NodeId> {
        self.tree.get(self.id).parent
    }

    /// Element children
    pub fn children(&self) -> Vec<Element> {
        self.tree
            .element_children(self.id)
            .map(|id| self.handle(id))
            .collect()
    }

    /// Element siblings before this one, nearest first
    pub fn preceding_siblings(&self) -> Vec<Element> {
        let Some(parent) = self.parent_id() else {
            return Vec::new();
        };
        let mut siblings: Vec<Element> = self
            .tree
            .element_children(parent)
            .take_while(|id| *id != self.id)
            .map(|id| self.handle(id))
            .collect();
        siblings.reverse();
        siblings
    }

    /// Element siblings after this one, nearest first
    pub fn following_siblings(&self) -> Vec<Element> {
        let Some(parent) = self.parent_id() else {
            return Vec::new();
        };
        self.tree
            .element_children(parent)
            .skip_while(|id| *id != self.id)
            .skip(1)
            .map(|id| self.handle(id))
            .collect()
    }

    /// Descendant elements in document order
    pub fn descendants(&self) -> Vec<Element> {
        self.tree
            .descendants(self.id)
            .into_iter()
            .filter(|id| self.tree.get(*id).is_element())
            .map(|id| self.handle(id))
            .collect()
    }

    /// Raw text pieces, like an `itertext()` walk
    pub fn text_pieces(&self) -> Vec<&str> {
        self.tree.text_pieces(self.id)
    }

    /// Text of the element's own text children, skipping descendants
    pub fn own_text_pieces(&self) -> Vec<&str> {
        self.tree
            .get(self.id)
            .children
            .iter()
            .filter_map(|c| {
                let node = self.tree.get(*c);
                match node.node_type {
                    NodeType::Text => node.text.as_deref(),
                    _ => None,
                }
            })
            .collect()
    }

    /// Concatenated text content
    pub fn text_content(&self) -> String {
        self.text_pieces().concat()
    }

    /// Value of a form control
    pub fn value(&self) -> Option<String> {
        match self.tag_name() {
            "textarea" => Some(self.text_content()),
            "select" => self
                .select(&Selector::parse("option[selected]").ok()?)
                .into_iter()
                .next()
                .or_else(|| self.select(&Selector::parse("option").ok()?).into_iter().next())
                .map(|o| {
                    o.attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| o.text_content())
                }),
            _ => self.attr("value").map(str::to_string),
        }
    }

    /// Descendants matching a parsed selector, in document order
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        selector.select(self)
    }

    /// Descendants matching a selector string
    pub fn query(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.select(&Selector::parse(selector)?))
    }

    /// First descendant matching a selector string
    pub fn query_first(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.query(selector)?.into_iter().next())
    }

    /// Base for relative links: `<base href>` joined onto the document URL
    pub fn base_url(&self) -> Option<Url> {
        let document = self.tree.url();
        let base_href = Element::new(self.tree.clone(), NodeId::ROOT)
            .query_first("base[href]")
            .ok()
            .flatten()
            .and_then(|b| b.attr("href").map(str::to_string));

        match (document, base_href) {
            (Some(url), Some(href)) => url.join(&href).ok().or_else(|| Some(url.clone())),
            (None, Some(href)) => Url::parse(&href).ok(),
            (Some(url), None) => Some(url.clone()),
            (None, None) => None,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        let mut out = format!("<{}", self.tag_name());
        for (name, value) in self.attributes().iter().take(3) {
            out.push_str(&format!(" {}=\"{}\"", name, value));
        }
        out.push('>');
        out
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_navigation_between_elements() {
        let doc = parse_html("<ul><li id='a'>1</li><li id='b'>2</li><li id='c'>3</li></ul>").unwrap();
        let b = doc.root().query_first("#b").unwrap().unwrap();

        assert_eq!(b.parent().unwrap().tag_name(), "ul");
        assert_eq!(b.preceding_siblings()[0].id(), Some("a"));
        assert_eq!(b.following_siblings()[0].id(), Some("c"));
        assert_eq!(b.text_content(), "2");
    }

    #[test]
    fn test_form_values() {
        let doc = parse_html(
            "<form><input name='q' value='rust'><textarea name='t'>body</textarea>\
             <select name='s'><option value='1'>one</option><option value='2' selected>two</option></select></form>",
        )
        .unwrap();
        let root = doc.root();
        let input = root.query_first("input").unwrap().unwrap();
        let textarea = root.query_first("textarea").unwrap().unwrap();
        let select = root.query_first("select").unwrap().unwrap();

        assert_eq!(input.value().as_deref(), Some("rust"));
        assert_eq!(textarea.value().as_deref(), Some("body"));
        assert_eq!(select.value().as_deref(), Some("2"));
    }

    #[test]
    fn test_describe() {
        let doc = parse_html("<a href='/x' class='btn'>go</a>").unwrap();
        let a = doc.root().query_first("a").unwrap().unwrap();
        assert_eq!(a.describe(), "<a href=\"/x\" class=\"btn\">");
    }
}
