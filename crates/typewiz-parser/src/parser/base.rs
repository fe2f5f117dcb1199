//! Node indices and node lists.

use serde::Serialize;

/// Index of a node in a [`super::NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NONE
    }
}

/// An ordered list of child nodes.
///
/// `pos` and `end` delimit the list's source range. For a parenthesized
/// parameter list `pos` is the offset right after `(`, which is where an
/// explicit `this` parameter would be inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
    pub pos: u32,
    pub end: u32,
    pub has_trailing_comma: bool,
}

impl NodeList {
    #[must_use]
    pub fn new(nodes: Vec<NodeIndex>, pos: u32, end: u32) -> Self {
        Self {
            nodes,
            pos,
            end,
            has_trailing_comma: false,
        }
    }

    #[must_use]
    pub fn empty_at(pos: u32) -> Self {
        Self::new(Vec::new(), pos, pos)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }
}
