//! HTML parsing into a small owned element tree
//!
//! html5ever builds the tree; it is then copied out of the `RcDom` so layout
//! can borrow plain structs. Each element also carries the declarations of
//! the `<style>` rules that match it (see [`crate::style::Stylesheet`]).

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever::Attribute;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// A parsed node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with lowercase tag and attribute names
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Declarations from matching stylesheet rules, lowest precedence first
    pub rules: Vec<(String, String)>,
}

impl Element {
    fn new(tag: &str, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs,
            children: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth-first) with the given tag
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for el in self.elements() {
            if el.tag == tag {
                return Some(el);
            }
            if let Some(found) = el.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => out.push_str(&el.text_content()),
            }
        }
        out
    }
}

/// A parsed HTML document
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlDocument {
    /// Synthetic root holding the top-level nodes
    pub root: Element,
}

impl HtmlDocument {
    /// The `<body>` element
    pub fn body(&self) -> &Element {
        self.root.find("body").unwrap_or(&self.root)
    }

    /// Trimmed `<title>` text
    pub fn title(&self) -> Option<String> {
        self.root
            .find("title")
            .map(|el| el.text_content().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Contents of every `<style>` element, in document order
    pub fn stylesheets(&self) -> Vec<String> {
        fn collect(el: &Element, out: &mut Vec<String>) {
            for child in el.elements() {
                if child.tag == "style" {
                    out.push(child.text_content());
                } else {
                    collect(child, out);
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }
}

/// Parse markup with the HTML5 tree builder
///
/// Missing `<html>`, `<head>`, `<body>` and `<tbody>` elements are inserted,
/// character references are decoded, and comments, doctypes and processing
/// instructions are dropped.
pub fn parse(html: &str) -> HtmlDocument {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let mut root = Element::new("#document", Vec::new());
    append_children(&dom.document, &mut root);
    HtmlDocument { root }
}

fn append_children(handle: &Handle, parent: &mut Element) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, attrs, .. } => {
                let mut el = Element::new(&name.local, convert_attrs(&attrs.borrow()));
                append_children(child, &mut el);
                parent.children.push(Node::Element(el));
            }
            NodeData::Text { contents } => {
                let text = contents.borrow();
                match parent.children.last_mut() {
                    Some(Node::Text(previous)) => previous.push_str(&text),
                    _ => parent.children.push(Node::Text(text.to_string())),
                }
            }
            NodeData::Document
            | NodeData::Doctype { .. }
            | NodeData::Comment { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }
}

fn convert_attrs(attrs: &[Attribute]) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}
