// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parser using html5ever

use std::sync::Arc;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use super::document::HtmlDocument;
use super::node::{NodeData, NodeId, Tree};
use crate::error::Result;

/// Parse HTML string into a document
pub fn parse_html(html: &str) -> Result<HtmlDocument> {
    parse_html_with_url(html, None)
}

/// Parse HTML string with the URL it was fetched from
pub fn parse_html_with_url(html: &str, url: Option<Url>) -> Result<HtmlDocument> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts).one(html);

    let mut tree = Tree::new();
    for child in dom.document.children.borrow().iter() {
        convert_node(&mut tree, child, NodeId::ROOT);
    }

    tree.set_url(url);
    Ok(HtmlDocument::new(Arc::new(tree)))
}

/// Copy an html5ever subtree into the arena
fn convert_node(tree: &mut Tree, handle: &Handle, parent: NodeId) {
    let data = match handle.data {
        RcNodeData::Text { ref contents } => NodeData::text(contents.borrow().to_string()),
        RcNodeData::Comment { ref contents } => NodeData::comment(contents.to_string()),
        RcNodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            NodeData::element(name.local.to_string(), attributes)
        }
        RcNodeData::Document
        | RcNodeData::Doctype { .. }
        | RcNodeData::ProcessingInstruction { .. } => return,
    };

    let id = tree.append(parent, data);
    for child in handle.children.borrow().iter() {
        convert_node(tree, child, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<html><body><p>Hello</p></body></html>").unwrap();
        let p = doc.root().query_first("body > p").unwrap().unwrap();
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_parse_with_attributes() {
        let doc = parse_html("<div id=\"test\" class=\"foo bar\">content</div>").unwrap();
        let div = doc.root().query_first("div").unwrap().unwrap();
        assert_eq!(div.attr("id"), Some("test"));
        assert!(div.has_class("foo"));
        assert!(div.has_class("bar"));
    }

    #[test]
    fn test_parse_complex_html() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <title>Test Page</title>
            </head>
            <body>
                <div id="container">
                    <h1>Hello World</h1>
                    <p class="content">This is a test.</p>
                    <a href="https://example.com">Link</a>
                </div>
            </body>
            </html>
        "#;
        let doc = parse_html(html).unwrap();

        assert_eq!(doc.title().as_deref(), Some("Test Page"));
        let links = doc.root().query("a[href]").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("href"), Some("https://example.com"));
    }

    #[test]
    fn test_parse_keeps_url() {
        let url = Url::parse("https://bank.test/accounts").unwrap();
        let doc = parse_html_with_url("<p>x</p>", Some(url.clone())).unwrap();
        assert_eq!(doc.url(), Some(&url));
    }
}
