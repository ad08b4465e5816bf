use nonmax::NonMaxUsize;

use crate::space::Action;
use crate::space::Solution;
use crate::space::State;

/// A handle to a `SearchTreeNode` within its `SearchTree`.
///
/// Handles are plain arena offsets, so parent links cannot form ownership
/// cycles and reconstruction needs no shared mutable state. `NonMaxUsize`
/// keeps `Option<(NodeId, A)>` pointer-width for small `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeId {
    index: NonMaxUsize,
}

impl NodeId {
    #[inline(always)]
    fn new(index: usize) -> Self {
        Self {
            // A Vec arena can never reach usize::MAX entries.
            index: NonMaxUsize::new(index).expect("search tree index overflow"),
        }
    }
}

/// A single point of the explored tree.
///
/// Carries the reached state and how it was reached: the parent's handle and
/// the action taken from it. The root carries neither. Nodes are immutable
/// once pushed; an uninformed search on a unit-cost space never finds a
/// better path to an already reached state.
#[derive(Copy, Clone, Debug)]
pub struct SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    pub(crate) state: St,
    pub(crate) parent: Option<(NodeId, A)>,
}

impl<St, A> SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    pub fn new(state: St, parent: Option<(NodeId, A)>) -> Self {
        Self { state, parent }
    }

    #[inline(always)]
    pub(crate) fn state(&self) -> &St {
        &self.state
    }
}

/// The arena owning every node discovered during one search run.
///
/// Only grows; dropped wholesale when the run ends.
pub struct SearchTree<St, A>
where
    St: State,
    A: Action,
{
    nodes: Vec<SearchTreeNode<St, A>>,
}

impl<St, A> SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![] }
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchTreeNode<St, A>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reconstructs the path to `node_index` by walking parent handles.
    ///
    /// Collected back-to-front and reversed, so it reads start→end. The root
    /// itself is excluded from the output.
    #[must_use]
    pub fn path(&self, mut node_index: NodeId) -> Solution<St, A> {
        let mut solution = Solution::<St, A>::empty();

        while let Some((parent_index, a)) = self[node_index].parent {
            solution.actions.push(a);
            solution.cells.push(*self[node_index].state());
            debug_assert!(node_index != parent_index);
            node_index = parent_index;
        }

        solution.actions.reverse();
        solution.cells.reverse();
        solution
    }
}

impl<St, A> Default for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A> std::ops::Index<NodeId> for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    type Output = SearchTreeNode<St, A>;

    #[inline(always)]
    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.index.get()]
    }
}

impl<St, A> std::fmt::Debug for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl State for (u8, u8) {}
    impl Action for char {}

    #[test]
    fn path_to_root_is_empty() {
        let mut tree = SearchTree::<(u8, u8), char>::new();
        let root = tree.push(SearchTreeNode::new((0, 0), None));

        let solution = tree.path(root);
        assert!(solution.is_empty());
        assert_eq!(solution.len(), 0);
    }

    #[test]
    fn path_reads_start_to_end() {
        let mut tree = SearchTree::<(u8, u8), char>::new();
        let root = tree.push(SearchTreeNode::new((0, 0), None));
        let a = tree.push(SearchTreeNode::new((0, 1), Some((root, 'r'))));
        let b = tree.push(SearchTreeNode::new((1, 1), Some((a, 'd'))));

        let solution = tree.path(b);
        assert_eq!(solution.actions, vec!['r', 'd']);
        assert_eq!(solution.cells, vec![(0, 1), (1, 1)]);
        assert_eq!(tree.len(), 3);
    }
}
