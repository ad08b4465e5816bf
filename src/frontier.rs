use std::collections::VecDeque;
use std::fmt::Debug;

use thiserror::Error;

use crate::search::NodeId;
use crate::space::State;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Removed a node from an empty frontier.")]
pub struct EmptyFrontierError;

/// A pending node reference.
///
/// The state is kept next to the handle so `contains_state` never needs to
/// chase into the search tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrontierEntry<St>
where
    St: State,
{
    pub node: NodeId,
    pub state: St,
}

/// The set of discovered-but-not-yet-expanded nodes.
///
/// The two implementations differ only in which end `remove` picks from,
/// which is the whole difference between depth-first and breadth-first
/// search. The engine keeps at most one entry per state alive; the frontier
/// itself does not deduplicate.
pub trait Frontier<St>: Debug + Default
where
    St: State,
{
    /// Appends a node. Never fails.
    fn add(&mut self, entry: FrontierEntry<St>);

    /// Removes and returns one node, per this frontier's ordering.
    fn remove(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError>;

    /// Linear scan for a pending node with this state.
    fn contains_state(&self, state: &St) -> bool;

    #[must_use]
    fn is_empty(&self) -> bool;

    #[must_use]
    fn len(&self) -> usize;
}

/// LIFO frontier: `remove` returns the most recently added node.
#[derive(Debug)]
pub struct StackFrontier<St>
where
    St: State,
{
    entries: Vec<FrontierEntry<St>>,
}

impl<St> Default for StackFrontier<St>
where
    St: State,
{
    fn default() -> Self {
        Self { entries: vec![] }
    }
}

impl<St> Frontier<St> for StackFrontier<St>
where
    St: State,
{
    #[inline(always)]
    fn add(&mut self, entry: FrontierEntry<St>) {
        self.entries.push(entry);
    }

    #[inline(always)]
    fn remove(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError> {
        self.entries.pop().ok_or(EmptyFrontierError)
    }

    #[inline(always)]
    fn contains_state(&self, state: &St) -> bool {
        self.entries.iter().any(|e| e.state == *state)
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// FIFO frontier: `remove` returns the earliest added node still present.
#[derive(Debug)]
pub struct QueueFrontier<St>
where
    St: State,
{
    entries: VecDeque<FrontierEntry<St>>,
}

impl<St> Default for QueueFrontier<St>
where
    St: State,
{
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<St> Frontier<St> for QueueFrontier<St>
where
    St: State,
{
    #[inline(always)]
    fn add(&mut self, entry: FrontierEntry<St>) {
        self.entries.push_back(entry);
    }

    #[inline(always)]
    fn remove(&mut self) -> Result<FrontierEntry<St>, EmptyFrontierError> {
        self.entries.pop_front().ok_or(EmptyFrontierError)
    }

    #[inline(always)]
    fn contains_state(&self, state: &St) -> bool {
        self.entries.iter().any(|e| e.state == *state)
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchTree;
    use crate::search::SearchTreeNode;
    use crate::space::Action;

    impl State for u32 {}
    impl Action for u8 {}

    fn entries(states: &[u32]) -> Vec<FrontierEntry<u32>> {
        let mut tree = SearchTree::<u32, u8>::new();
        states
            .iter()
            .map(|&s| FrontierEntry {
                node: tree.push(SearchTreeNode::new(s, None)),
                state: s,
            })
            .collect()
    }

    #[test]
    fn stack_removes_last_in_first() {
        let mut frontier = StackFrontier::<u32>::default();
        for e in entries(&[1, 2]) {
            frontier.add(e);
        }

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.remove().unwrap().state, 2);
        assert_eq!(frontier.remove().unwrap().state, 1);
        assert!(frontier.is_empty());
    }

    #[test]
    fn queue_removes_first_in_first() {
        let mut frontier = QueueFrontier::<u32>::default();
        for e in entries(&[1, 2]) {
            frontier.add(e);
        }

        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.remove().unwrap().state, 1);
        assert_eq!(frontier.remove().unwrap().state, 2);
        assert!(frontier.is_empty());
    }

    #[test]
    fn remove_on_empty_fails() {
        let mut stack = StackFrontier::<u32>::default();
        assert_eq!(stack.remove(), Err(EmptyFrontierError));

        let mut queue = QueueFrontier::<u32>::default();
        assert_eq!(queue.remove(), Err(EmptyFrontierError));
    }

    #[test]
    fn contains_state_scans_pending_nodes() {
        let mut frontier = StackFrontier::<u32>::default();
        for e in entries(&[1, 2, 3]) {
            frontier.add(e);
        }

        assert!(frontier.contains_state(&2));
        assert!(!frontier.contains_state(&7));

        let _ = frontier.remove().unwrap();
        assert!(!frontier.contains_state(&3));
    }
}
