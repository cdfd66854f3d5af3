//! Read-only document tree consumed by pagination

mod node;

pub use node::{ChildPositions, Node, NodeType};

use crate::error::Error;

/// Read-only traversal of a document tree.
///
/// `descendants` visits every node in document order with its start
/// position; returning `false` from the visitor skips that node's subtree.
pub trait DocumentAccessor {
    /// Total number of positions spanned by the document's content
    fn content_size(&self) -> usize;

    fn descendants(&self, visitor: &mut dyn FnMut(&Node, usize) -> bool);
}

/// An owned document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Wrap top-level blocks in a `doc` node
    pub fn from_blocks(blocks: Vec<Node>) -> Self {
        Self::new(Node::doc(blocks))
    }

    /// Parse the editor's JSON tree
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        Ok(Self::new(serde_json::from_value(value)?))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.content.is_empty()
    }
}

impl DocumentAccessor for Document {
    fn content_size(&self) -> usize {
        self.root.content_size()
    }

    fn descendants(&self, visitor: &mut dyn FnMut(&Node, usize) -> bool) {
        self.root.descendants(None, visitor);
    }
}

impl<D: DocumentAccessor + ?Sized> DocumentAccessor for &D {
    fn content_size(&self) -> usize {
        (**self).content_size()
    }

    fn descendants(&self, visitor: &mut dyn FnMut(&Node, usize) -> bool) {
        (**self).descendants(visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_blocks(vec![
            Node::paragraph("ab"),
            Node::table(vec![Node::table_row(vec![Node::table_cell(vec![
                Node::paragraph("xy"),
            ])])]),
        ])
    }

    #[test]
    fn test_content_size() {
        assert_eq!(sample().content_size(), 14);
        assert!(Document::from_blocks(Vec::new()).is_empty());
    }

    #[test]
    fn test_descendants_order_and_positions() {
        let doc = sample();
        let mut seen = Vec::new();
        doc.descendants(&mut |node, pos| {
            seen.push((node.kind.name().to_string(), pos));
            true
        });
        let expected = [
            ("paragraph", 0),
            ("text", 1),
            ("table", 4),
            ("tableRow", 5),
            ("tableCell", 6),
            ("paragraph", 7),
            ("text", 8),
        ];
        let seen: Vec<_> = seen.iter().map(|(n, p)| (n.as_str(), *p)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_descendants_skip_subtree() {
        let doc = sample();
        let mut count = 0;
        doc.descendants(&mut |node, _| {
            count += 1;
            !node.kind.is_table()
        });
        assert_eq!(count, 3);
    }

    #[test]
    fn test_from_json_error() {
        let err = Document::from_json("{\"type\": 3}").unwrap_err();
        assert!(err.to_string().contains("failed to parse JSON"));
    }
}
