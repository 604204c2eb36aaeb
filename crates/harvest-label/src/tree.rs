//! Arena-backed label tree shared by both dialect readers.
//!
//! Nodes are stored in document (pre-)order, so a node's index doubles as its
//! document position. Path evaluation relies on that to return results in
//! document order without a separate sort key.

use std::fmt;

use crate::parser::Dialect;

/// Index of a node inside its [`LabelTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            text: None,
            line,
            column,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A parsed label.
///
/// The root node is the document element for modern labels and a synthetic
/// `LABEL` node holding every top-level statement for legacy labels.
#[derive(Debug, Clone)]
pub struct LabelTree {
    dialect: Dialect,
    nodes: Vec<NodeData>,
}

impl LabelTree {
    /// Start a tree with its root node.
    pub(crate) fn with_root(dialect: Dialect, root: NodeData) -> Self {
        Self {
            dialect,
            nodes: vec![root],
        }
    }

    /// Append `data` as the last child of `parent`.
    ///
    /// Callers must append in document order.
    pub(crate) fn append(&mut self, parent: NodeId, mut data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        data.parent = Some(parent);
        self.nodes.push(data);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Every node in document order, root first.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(|i| self.node(NodeId(i)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Borrowed handle to one node of a [`LabelTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a LabelTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn tree(&self) -> &'a LabelTree {
        self.tree
    }

    /// Local name, without any namespace prefix.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.tree.data(self.id).name
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&'a str> {
        self.tree.data(self.id).namespace.as_deref()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tree
            .data(self.id)
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text held directly by this node, untrimmed.
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        self.tree.data(self.id).text.as_deref()
    }

    /// Trimmed direct text, or `""` when the node holds none.
    #[must_use]
    pub fn value(&self) -> &'a str {
        self.text().map_or("", str::trim)
    }

    /// 1-based line of the node's start.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.tree.data(self.id).line
    }

    /// 1-based column of the node's start.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.tree.data(self.id).column
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        tree.data(self.id).children.iter().map(move |&id| tree.node(id))
    }

    /// First child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Self> {
        self.children().find(|child| child.name() == name)
    }

    /// Trimmed value of the first child with the given local name.
    #[must_use]
    pub fn child_value(&self, name: &str) -> Option<&'a str> {
        self.child(name).map(|child| child.value())
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        let end = self.subtree_end();
        (self.id.0 + 1..end).map(move |i| tree.node(NodeId(i)))
    }

    /// Index one past the last node in this subtree.
    fn subtree_end(&self) -> usize {
        let mut current = *self;
        loop {
            if let Some(&last) = self.tree.data(current.id).children.last() {
                current = self.tree.node(last);
            } else {
                return current.id.0 + 1;
            }
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("name", &self.name())
            .field("line", &self.line())
            .field("column", &self.column())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> LabelTree {
        // Product
        //   Identification_Area
        //     logical_identifier
        //   Reference_List
        let mut tree = LabelTree::with_root(Dialect::Modern, NodeData::new("Product", 1, 1));
        let root = tree.root().id();
        let ident = tree.append(root, NodeData::new("Identification_Area", 2, 3));
        let mut lid = NodeData::new("logical_identifier", 3, 5);
        lid.text = Some("  urn:nasa:pds:mer  ".into());
        lid.attributes.push(("unit".into(), "m".into()));
        tree.append(ident, lid);
        tree.append(root, NodeData::new("Reference_List", 5, 3));
        tree
    }

    #[test]
    fn descendants_are_in_document_order() {
        let tree = sample();
        let names: Vec<_> = tree.root().descendants().map(|n| n.name()).collect();
        assert_eq!(
            names,
            vec!["Identification_Area", "logical_identifier", "Reference_List"]
        );
    }

    #[test]
    fn descendants_stop_at_subtree_end() {
        let tree = sample();
        let ident = tree.root().child("Identification_Area").expect("present");
        let names: Vec<_> = ident.descendants().map(|n| n.name()).collect();
        assert_eq!(names, vec!["logical_identifier"]);
    }

    #[test]
    fn values_are_trimmed_and_attributes_found() {
        let tree = sample();
        let ident = tree.root().child("Identification_Area").expect("present");
        assert_eq!(ident.child_value("logical_identifier"), Some("urn:nasa:pds:mer"));
        let lid = ident.child("logical_identifier").expect("present");
        assert_eq!(lid.attribute("unit"), Some("m"));
        assert_eq!(lid.attribute("missing"), None);
        assert_eq!(lid.parent(), Some(ident));
        assert_eq!((lid.line(), lid.column()), (3, 5));
    }
}
