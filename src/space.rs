use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

pub trait Action: Copy + Clone + Debug + PartialEq + Eq {}
pub trait State: Copy + Clone + Debug + PartialEq + Eq + Hash {}

/// The maximum out-degree of a state.
///
/// Orthogonal grid moves only, so expansions fit inline.
pub const MAX_NEIGHBOURS: usize = 4;

pub type Neighbours<St, A> = SmallVec<[(St, A); MAX_NEIGHBOURS]>;

/// An ordered sequence of actions with the states they lead through.
///
/// `actions` and `cells` run in parallel from the first move out of the start
/// state up to and including the end state. The start state itself is not
/// part of `cells`, so an empty Solution means the start already was the end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<St, A>
where
    St: State,
    A: Action,
{
    pub actions: Vec<A>,
    pub cells: Vec<St>,
}

impl<St, A> Solution<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            actions: vec![],
            cells: vec![],
        }
    }

    /// Number of actions, which on a unit-cost space is also the path cost.
    #[inline(always)]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.actions.len(), self.cells.len());
        self.actions.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs sanity checks
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        self.actions.len() == self.cells.len()
    }
}

impl<St, A> std::fmt::Display for Solution<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Solution({}, {:?})",
            self.len(),
            self.actions.iter().take(20).collect::<Vec<_>>(),
        )
    }
}

pub trait Space<St, A>: Debug
where
    St: State,
    A: Action,
{
    /// Applies an action to a state, ignoring obstacles.
    ///
    /// `None` means the move leaves the space altogether.
    fn apply(&self, s: &St, a: &A) -> Option<St>;

    /// Expands a State into its reachable neighbours.
    ///
    /// The order is fixed per-space and callers may rely on it; with equally
    /// short paths available, it decides which one a search finds.
    fn neighbours(&self, s: &St) -> Neighbours<St, A>;

    /// Verify a State is within the space and not blocked.
    fn valid(&self, s: &St) -> bool;

    /// Replays a solution from `start`, checking every step is legal.
    fn valid_solution(&self, start: &St, solution: &Solution<St, A>) -> bool {
        if !solution.seems_valid() {
            return false;
        }

        let mut state: St = *start;
        for (a, expected) in solution.actions.iter().zip(solution.cells.iter()) {
            match self.apply(&state, a) {
                Some(new_state) if self.valid(&new_state) && new_state == *expected => {
                    state = new_state;
                }
                _ => return false,
            }
        }
        true
    }
}
