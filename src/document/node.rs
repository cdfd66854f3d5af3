//! Document tree nodes and position arithmetic

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The type of a document node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Text,
    HardBreak,
    Image,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    DocumentSection,
    /// Any node type the pagination engine has no special rules for
    Other(String),
}

impl NodeType {
    /// Name as it appears in the editor's JSON tree
    pub fn name(&self) -> &str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Text => "text",
            NodeType::HardBreak => "hardBreak",
            NodeType::Image => "image",
            NodeType::Table => "table",
            NodeType::TableRow => "tableRow",
            NodeType::TableCell => "tableCell",
            NodeType::TableHeader => "tableHeader",
            NodeType::DocumentSection => "documentSection",
            NodeType::Other(name) => name,
        }
    }

    /// Blocks holding inline content directly
    pub fn is_textblock(&self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::Heading)
    }

    /// Nodes with a fixed size of one position
    pub fn is_atom(&self) -> bool {
        matches!(self, NodeType::HardBreak | NodeType::Image)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, NodeType::Table)
    }

    pub fn is_table_row(&self) -> bool {
        matches!(self, NodeType::TableRow)
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, NodeType::TableCell | NodeType::TableHeader)
    }

    /// Atomic section markers must never be split by a page break
    pub fn is_section_marker(&self) -> bool {
        matches!(self, NodeType::DocumentSection)
    }

    /// Block types the calculator can attribute an overflow to
    pub fn is_structural_block(&self) -> bool {
        matches!(
            self,
            NodeType::Paragraph
                | NodeType::Heading
                | NodeType::Image
                | NodeType::Table
                | NodeType::TableRow
                | NodeType::TableCell
                | NodeType::TableHeader
                | NodeType::DocumentSection
        )
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "doc" => NodeType::Doc,
            "paragraph" => NodeType::Paragraph,
            "heading" => NodeType::Heading,
            "text" => NodeType::Text,
            "hardBreak" => NodeType::HardBreak,
            "image" => NodeType::Image,
            "table" => NodeType::Table,
            "tableRow" => NodeType::TableRow,
            "tableCell" => NodeType::TableCell,
            "tableHeader" => NodeType::TableHeader,
            "documentSection" => NodeType::DocumentSection,
            _ => NodeType::Other(name),
        }
    }
}

impl From<NodeType> for String {
    fn from(kind: NodeType) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the editor's document tree.
///
/// Positions follow the editor model: a text node spans one position per
/// character, atoms span one position, and every other node spans its
/// content plus an opening and a closing token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create a container node
    pub fn new(kind: NodeType, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs: Map::new(),
            content,
            text: None,
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeType::Doc, content)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeType::Text, Vec::new())
        }
    }

    /// Paragraph holding a single text run (empty text gives an empty paragraph)
    pub fn paragraph(text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Self::text(text)]
        };
        Self::new(NodeType::Paragraph, content)
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Self::paragraph(text)
            .with_kind(NodeType::Heading)
            .with_attr("level", level.clamp(1, 6))
    }

    pub fn hard_break() -> Self {
        Self::new(NodeType::HardBreak, Vec::new())
    }

    /// Image with a rendered height in px
    pub fn image(height: f64) -> Self {
        Self::new(NodeType::Image, Vec::new()).with_attr("height", height)
    }

    pub fn table(rows: Vec<Node>) -> Self {
        Self::new(NodeType::Table, rows)
    }

    pub fn table_row(cells: Vec<Node>) -> Self {
        Self::new(NodeType::TableRow, cells)
    }

    pub fn table_cell(blocks: Vec<Node>) -> Self {
        Self::new(NodeType::TableCell, blocks)
    }

    pub fn section(blocks: Vec<Node>) -> Self {
        Self::new(NodeType::DocumentSection, blocks)
    }

    pub fn with_kind(mut self, kind: NodeType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Numeric attribute, if present and finite
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attrs
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeType::Text
    }

    /// Number of positions this node spans
    pub fn node_size(&self) -> usize {
        if self.is_text() {
            self.text.as_deref().map_or(0, |t| t.chars().count())
        } else if self.kind.is_atom() {
            1
        } else {
            self.content_size() + 2
        }
    }

    /// Number of positions spanned by this node's children
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Children paired with their positions, given this node's own position.
    ///
    /// For the root node pass `None`: its content starts at position 0.
    pub fn children_at(&self, pos: Option<usize>) -> ChildPositions<'_> {
        ChildPositions {
            children: self.content.iter(),
            next: pos.map_or(0, |p| p + 1),
        }
    }

    /// Visit descendants in document order with their positions, given this
    /// node's own position (`None` for the root). Returning `false` from the
    /// visitor skips that node's subtree.
    pub fn descendants(&self, pos: Option<usize>, visitor: &mut dyn FnMut(&Node, usize) -> bool) {
        for (child, child_pos) in self.children_at(pos) {
            if visitor(child, child_pos) && !child.content.is_empty() {
                child.descendants(Some(child_pos), visitor);
            }
        }
    }

    /// Position range of this node's content, given the node's position
    pub fn content_range(&self, pos: usize) -> std::ops::Range<usize> {
        let start = pos + 1;
        start..start + self.content_size()
    }

    /// Concatenated text of this node's descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

/// Iterator over a node's children and their start positions
pub struct ChildPositions<'a> {
    children: std::slice::Iter<'a, Node>,
    next: usize,
}

impl<'a> Iterator for ChildPositions<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.children.next()?;
        let pos = self.next;
        self.next += child.node_size();
        Some((child, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_sizes() {
        assert_eq!(Node::text("héllo").node_size(), 5);
        assert_eq!(Node::hard_break().node_size(), 1);
        assert_eq!(Node::paragraph("").node_size(), 2);
        assert_eq!(Node::paragraph("abc").node_size(), 5);

        let cell = Node::table_cell(vec![Node::paragraph("xy")]);
        assert_eq!(cell.node_size(), 6);
        let table = Node::table(vec![Node::table_row(vec![cell])]);
        assert_eq!(table.node_size(), 10);
    }

    #[test]
    fn test_children_positions() {
        let row = Node::table_row(vec![
            Node::table_cell(vec![Node::paragraph("a")]),
            Node::table_cell(vec![Node::paragraph("bc")]),
        ]);
        let positions: Vec<_> = row.children_at(Some(10)).map(|(_, pos)| pos).collect();
        assert_eq!(positions, vec![11, 16]);

        let doc = Node::doc(vec![Node::paragraph("ab"), Node::paragraph("")]);
        let positions: Vec<_> = doc.children_at(None).map(|(_, pos)| pos).collect();
        assert_eq!(positions, vec![0, 4]);
    }

    #[test]
    fn test_node_type_names_round_trip_through_json() {
        let json = r#"{"type":"doc","content":[
            {"type":"paragraph","content":[{"type":"text","text":"hi","marks":[]}]},
            {"type":"bookmarkStart","attrs":{"id":"b1"}}
        ]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeType::Doc);
        assert_eq!(node.content[1].kind, NodeType::Other("bookmarkStart".into()));
        assert_eq!(node.content[1].kind.name(), "bookmarkStart");
        assert_eq!(node.text_content(), "hi");

        let back = serde_json::to_value(&node.content[0]).unwrap();
        assert_eq!(back["type"], "paragraph");
    }

    #[test]
    fn test_structural_blocks() {
        assert!(NodeType::TableRow.is_structural_block());
        assert!(!NodeType::Text.is_structural_block());
        assert!(!NodeType::Other("x".into()).is_structural_block());
        assert!(NodeType::DocumentSection.is_section_marker());
    }
}
