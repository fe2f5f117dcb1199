//! NodeArena creation methods (add_* methods).

use super::base::{NodeIndex, NodeList};
use super::node::{IdentifierData, LiteralData, Node, NodeArena, NodeData, NodeFlags};
use crate::scanner::SyntaxKind;

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    #[must_use]
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(Self::MAX_NODE_PREALLOC)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node created after `len`. Used to roll back speculative parses.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub fn add_node(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: NodeData) -> NodeIndex {
        let index = NodeIndex(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX - 1));
        self.nodes.push(Node {
            kind,
            flags: NodeFlags::empty(),
            pos,
            end,
            parent: NodeIndex::NONE,
            data,
        });
        index
    }

    /// Add a keyword or punctuation node without payload.
    pub fn add_token(&mut self, kind: SyntaxKind, pos: u32, end: u32) -> NodeIndex {
        self.add_node(kind, pos, end, NodeData::None)
    }

    pub fn add_identifier(&mut self, kind: SyntaxKind, pos: u32, end: u32, text: String) -> NodeIndex {
        self.add_node(
            kind,
            pos,
            end,
            NodeData::Identifier(IdentifierData { escaped_text: text }),
        )
    }

    pub fn add_literal(&mut self, kind: SyntaxKind, pos: u32, end: u32, text: String) -> NodeIndex {
        self.add_node(kind, pos, end, NodeData::Literal(LiteralData { text }))
    }

    pub fn set_flags(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.get_mut(index) {
            node.flags |= flags;
        }
    }

    pub fn set_end(&mut self, index: NodeIndex, end: u32) {
        if let Some(node) = self.get_mut(index) {
            node.end = end;
        }
    }

    /// Fill in parent links for the subtree rooted at `root`.
    pub fn set_parents(&mut self, root: NodeIndex) {
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            for child in self.get_children(parent) {
                if let Some(node) = self.get_mut(child) {
                    node.parent = parent;
                    stack.push(child);
                }
            }
        }
    }

    /// Build a list spanning its first to last node.
    #[must_use]
    pub fn make_list(&self, nodes: Vec<NodeIndex>, default_pos: u32) -> NodeList {
        let pos = nodes
            .first()
            .and_then(|&idx| self.get(idx))
            .map_or(default_pos, |node| node.pos);
        let end = nodes
            .last()
            .and_then(|&idx| self.get(idx))
            .map_or(pos, |node| node.end);
        NodeList::new(nodes, pos, end)
    }
}
