// File: src/tree.rs
// Purpose: Arena-backed parse tree produced by the tree builder

use crate::language::ReserveWord;
use std::fmt;
use std::ops::Index;

/// Stable handle to a node inside a [`ParseTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    /// Literal text found outside of tags
    Constant,
    /// Tag text that is not a directive, evaluated for `[...]` expressions
    Expression,
    /// A reserve word, with its argument as the node payload
    Directive(&'static ReserveWord),
}

impl NodeKind {
    /// Type name as shown in tree dumps
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Constant => "constant",
            NodeKind::Expression => "expression",
            NodeKind::Directive(word) => word.start,
        }
    }

    /// The reserve word behind a directive node
    pub fn reserve_word(&self) -> Option<&'static ReserveWord> {
        match self {
            NodeKind::Directive(word) => Some(word),
            _ => None,
        }
    }
}

/// A single node. Nodes own their child list; there is no parent pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Literal text for constants, the directive argument for directives
    pub payload: String,
    children: Vec<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }
}

/// Rooted ownership of every node built for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    /// Create a tree holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                id: NodeId(0),
                kind: NodeKind::Root,
                payload: String::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new node as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, kind: NodeKind, payload: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            payload: payload.into(),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Indented outline of the tree, one node per line
    pub fn dump(&self) -> String {
        self.to_string()
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self[id];
        let indent = "  ".repeat(depth);
        if node.payload.trim().is_empty() {
            writeln!(f, "{}{}", indent, node.kind.name())?;
        } else {
            writeln!(f, "{}{} {:?}", indent, node.kind.name(), node.payload.trim())?;
        }
        node.children
            .iter()
            .try_for_each(|&child| self.write_node(f, child, depth + 1))
    }
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for ParseTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root(), 0)
    }
}
