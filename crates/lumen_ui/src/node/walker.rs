//! Depth-first pre-order traversal.
//!
//! [`Walker`] is a detached cursor: it does not borrow the tree between
//! steps, so the tree may be mutated while walking. Each level remembers
//! the next child INDEX, never a child list, which gives these guarantees:
//!
//! - no child index of a node is visited twice in one walk;
//! - children appended mid-walk are visited if their index is still ahead;
//! - removing an earlier sibling shifts later ones down, so one of them may
//!   be skipped;
//! - a node removed mid-walk simply has no children left.
//!
//! The walk is not a snapshot; its order under mutation is
//! implementation-defined.

use super::{NodeId, NodeTree};

/// Mutation-tolerant pre-order cursor.
#[derive(Debug, Clone)]
pub struct Walker {
    start: Option<NodeId>,
    stack: Vec<(NodeId, usize)>,
}

impl Walker {
    /// A walk over `root` and all its descendants.
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            start: Some(root),
            stack: Vec::with_capacity(16),
        }
    }

    /// Returns the next node, or `None` once the walk is done.
    pub fn next(&mut self, tree: &NodeTree) -> Option<NodeId> {
        if let Some(root) = self.start.take() {
            if !tree.contains_node(root) {
                return None;
            }
            self.stack.push((root, 0));
            return Some(root);
        }

        loop {
            let (id, index) = *self.stack.last()?;
            if let Some(&child) = tree.children(id).get(index) {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                self.stack.push((child, 0));
                return Some(child);
            }
            self.stack.pop();
        }
    }

    /// Skips the children of the node returned by the last [`next`](Self::next).
    pub fn skip_children(&mut self) {
        self.stack.pop();
    }
}

/// Borrowing pre-order iterator, see [`NodeTree::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    tree: &'a NodeTree,
    walker: Walker,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(tree: &'a NodeTree, root: NodeId) -> Self {
        Self {
            tree,
            walker: Walker::new(root),
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.walker.next(self.tree)
    }
}
