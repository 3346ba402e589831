// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM node storage
//!
//! A parsed document is an immutable arena: every node lives in one `Vec`
//! and refers to its parent and children by index. Handles share the arena
//! through an `Arc`, so they are cheap to clone and can cross threads.

use url::Url;

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The document node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Get the raw index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node (like <div>, <p>, etc.)
    Element,
    /// Text node
    Text,
    /// Comment node
    Comment,
}

/// Internal node data
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Node type
    pub node_type: NodeType,
    /// Lowercase tag name (for elements)
    pub tag_name: Option<String>,
    /// Text content (for text/comment nodes)
    pub text: Option<String>,
    /// Attributes in source order (for elements)
    pub attributes: Vec<(String, String)>,
    /// Parent node
    pub parent: Option<NodeId>,
    /// Child nodes in source order
    pub children: Vec<NodeId>,
}

impl NodeData {
    /// Create the document node
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            tag_name: None,
            text: None,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create an element node
    pub fn element(tag_name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            node_type: NodeType::Element,
            tag_name: Some(tag_name.into().to_lowercase()),
            text: None,
            attributes,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Text,
            tag_name: None,
            text: Some(content.into()),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Comment,
            text: Some(content.into()),
            ..Self::document()
        }
    }

    /// Look up an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether this is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }
}

/// Arena holding every node of one document
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    url: Option<Url>,
}

impl Tree {
    /// Create a tree containing only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::document()],
            url: None,
        }
    }

    /// URL the document was fetched from
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub(crate) fn set_url(&mut self, url: Option<Url>) {
        self.url = url;
    }

    /// Append a node under `parent`, returning its id
    pub(crate) fn append(&mut self, parent: NodeId, mut data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        data.parent = Some(parent);
        self.nodes.push(data);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Number of nodes, document node included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its document node
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Element children of a node
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .children
            .iter()
            .copied()
            .filter(move |c| self.get(*c).is_element())
    }

    /// Descendants of a node in document order (node itself excluded)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.get(id).children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.get(current).children.iter().rev().copied());
        }
        out
    }

    /// Text pieces under a node, in document order
    pub fn text_pieces(&self, id: NodeId) -> Vec<&str> {
        let data = self.get(id);
        if data.node_type == NodeType::Text {
            return data.text.as_deref().into_iter().collect();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| {
                let node = self.get(d);
                match node.node_type {
                    NodeType::Text => node.text.as_deref(),
                    _ => None,
                }
            })
            .collect()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let ul = tree.append(NodeId::ROOT, NodeData::element("UL", vec![]));
        let li1 = tree.append(ul, NodeData::element("li", vec![("class".into(), "a".into())]));
        tree.append(li1, NodeData::text("one"));
        tree.append(ul, NodeData::comment("skip"));
        let li2 = tree.append(ul, NodeData::element("li", vec![]));
        tree.append(li2, NodeData::text("two"));
        tree
    }

    #[test]
    fn test_append_links_parent() {
        let tree = sample();
        let ul = NodeId(1);
        assert_eq!(tree.get(ul).tag_name.as_deref(), Some("ul"));
        assert_eq!(tree.get(NodeId(2)).parent, Some(ul));
        assert_eq!(tree.element_children(ul).count(), 2);
    }

    #[test]
    fn test_text_pieces_skip_comments() {
        let tree = sample();
        assert_eq!(tree.text_pieces(NodeId::ROOT), vec!["one", "two"]);
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let tree = sample();
        assert_eq!(tree.get(NodeId(2)).attribute("CLASS"), Some("a"));
    }
}
