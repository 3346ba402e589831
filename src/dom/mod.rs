// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document layer
//!
//! HTML parsing built on html5ever, a CSS selector engine used as the path
//! language for HTML, and JSON documents addressed by slash paths.

mod document;
mod element;
mod node;
mod parser;
mod selector;

pub use document::{json_path, json_path_required, Document, DocumentKind, HtmlDocument, Node};
pub use element::Element;
pub use node::{NodeData, NodeId, NodeType, Tree};
pub use parser::{parse_html, parse_html_with_url};
pub use selector::{AttributeOperator, AttributeSelector, Combinator, NthExpr, PseudoClass, Selector, SelectorPart};
