//! Structural matching of feed items inside a fetched XML document.
//!
//! Items are any element named `item`, wherever it sits in the tree, visited
//! in document order. Child lookups only look at direct children, take the
//! first match, and fall back to an empty string when nothing matches.

use roxmltree::{Descendants, Document, Node, ParsingOptions};
use crate::error::Result;

const ITEM_TAG: &str = "item";
const MEDIA_PREFIX: &str = "media";

/// One `item` element flattened to the fields exported as a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub publication_date: String,
    pub category: String,
    pub image_url: String,
}

impl FeedItem {
    fn from_node(node: Node<'_, '_>) -> Self {
        FeedItem {
            title: child_text(node, "title"),
            description: child_text(node, "description"),
            link: child_text(node, "link"),
            publication_date: child_text(node, "pubDate"),
            category: child_text(node, "category"),
            image_url: child_attr(node, MEDIA_PREFIX, "content", "url"),
        }
    }

    pub fn to_record(&self) -> [&str; 6] {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.link.as_str(),
            self.publication_date.as_str(),
            self.category.as_str(),
            self.image_url.as_str(),
        ]
    }
}

pub fn parse_document(xml: &str) -> Result<Document<'_>> {
    // Older RSS revisions ship a DOCTYPE
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    Ok(Document::parse_with_options(xml, options)?)
}

/// Lazily yields every item of `document`. The iterator is finite and cannot
/// be restarted; call again for a fresh pass.
pub fn items<'a, 'input>(document: &'a Document<'input>) -> FeedItems<'a, 'input> {
    FeedItems {
        nodes: document.descendants(),
    }
}

pub struct FeedItems<'a, 'input> {
    nodes: Descendants<'a, 'input>,
}

impl Iterator for FeedItems<'_, '_> {
    type Item = FeedItem;

    fn next(&mut self) -> Option<FeedItem> {
        self.nodes
            .find(|node| is_unprefixed(*node, ITEM_TAG))
            .map(FeedItem::from_node)
    }
}

fn is_unprefixed(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == node.default_namespace()
}

fn is_prefixed(node: Node<'_, '_>, prefix: &str, name: &str) -> bool {
    if !node.is_element() || node.tag_name().name() != name {
        return false;
    }
    match node.tag_name().namespace() {
        Some(uri) => node
            .namespaces()
            .any(|ns| ns.name() == Some(prefix) && ns.uri() == uri),
        None => false,
    }
}

fn child_text(node: Node<'_, '_>, name: &str) -> String {
    node.children()
        .find(|child| is_unprefixed(*child, name))
        .map(|child| inner_text(child).trim().to_string())
        .unwrap_or_default()
}

fn child_attr(node: Node<'_, '_>, prefix: &str, name: &str, attr: &str) -> String {
    node.children()
        .find(|child| is_prefixed(*child, prefix, name))
        .and_then(|child| child.attribute(attr))
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
