//! HTML helpers: markup stripping for indexing and escaping for rendering.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Returns the text content of an HTML document's body.
///
/// The input is parsed as a full HTML document, so fragments are placed in an implied
/// `<body>`, entities are decoded, and tags, attributes and comments are discarded.
/// Text that the parser moves into `<head>` (e.g. a `<title>`) is not part of the result.
pub fn strip_tags(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let mut text = String::with_capacity(html.len());
    if let Some(body) = find_element(&dom.document, "body") {
        collect_text(&body, &mut text);
    }
    text
}

fn find_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: qual, .. } = &handle.data
        && &*qual.local == name
    {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, name))
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Escapes HTML special characters in a string.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
