//! Uninformed frontier-based search.
//!
//! One engine drives both depth-first and breadth-first search; the only
//! difference between the two is the removal order of the pending-node
//! container, so the ordering is a `Frontier` implementation picked once at
//! engine construction and fixed for the whole run.

use std::marker::PhantomData;
use std::str::FromStr;

use derive_more::Display;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::frontier::EmptyFrontierError;
use crate::frontier::Frontier;
use crate::frontier::FrontierEntry;
use crate::frontier::QueueFrontier;
use crate::frontier::StackFrontier;
use crate::problem::Problem;
use crate::search::SearchTree;
use crate::search::SearchTreeNode;
use crate::space::Action;
use crate::space::Solution;
use crate::space::Space;
use crate::space::State;

/// Exploration order of the frontier.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Method {
    /// LIFO frontier. Complete on finite spaces, path length not minimised.
    #[display("DFS")]
    DepthFirst,
    /// FIFO frontier. Complete, and shortest on unit-cost spaces.
    #[display("BFS")]
    BreadthFirst,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown search method '{0}'. Expected 'dfs' or 'bfs'.")]
pub struct ParseMethodError(String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" | "depth-first" | "depthfirst" => Ok(Method::DepthFirst),
            "bfs" | "breadth-first" | "breadthfirst" => Ok(Method::BreadthFirst),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The frontier ran dry before reaching the goal. An expected outcome on
    /// disconnected spaces, not a bug.
    #[error("No solution: the frontier was exhausted before reaching the goal.")]
    NoSolution,
    /// Frontier underflow. The engine checks emptiness before every removal,
    /// so observing this means the `NoSolution` check above was skipped.
    #[error(transparent)]
    Frontier(#[from] EmptyFrontierError),
}

/// The outcome of one successful search run.
///
/// `explored` and `num_explored` are diagnostics for rendering and
/// measurement; nothing downstream computes from them.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<St, A>
where
    St: State,
    A: Action,
{
    pub solution: Solution<St, A>,
    /// States removed from the frontier and expanded. The goal itself is not
    /// in here: it is recognised on removal, before expansion.
    pub explored: FxHashSet<St>,
    /// Number of frontier removals, goal included.
    pub num_explored: usize,
}

/// Frontier-driven search over a Problem.
///
/// Owns all run state (node arena, frontier, explored set), so concurrent or
/// repeated runs over a shared problem never contend. One engine performs one
/// run; build a fresh one per `solve` call.
#[derive(Debug)]
pub struct UninformedSearch<'p, P, Sp, St, A, F>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    F: Frontier<St>,
{
    /// All the Search Nodes. Naturally forms a tree as each node may have a
    /// parent Node.
    search_tree: SearchTree<St, A>,
    frontier: F,
    /// States already expanded. Grows monotonically within a run.
    explored: FxHashSet<St>,
    num_explored: usize,

    problem: &'p P,

    _phantom_space: PhantomData<Sp>,
}

impl<'p, P, Sp, St, A, F> UninformedSearch<'p, P, Sp, St, A, F>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    F: Frontier<St>,
{
    /// Creates an engine seeded with the problem's start node.
    #[must_use]
    pub fn new(problem: &'p P) -> Self {
        let mut search = Self {
            search_tree: SearchTree::<St, A>::new(),
            frontier: F::default(),
            explored: FxHashSet::default(),
            num_explored: 0,
            problem,
            _phantom_space: PhantomData,
        };

        let start = problem.start();
        let root = search
            .search_tree
            .push(SearchTreeNode::<St, A>::new(start, None));
        search.frontier.add(FrontierEntry { node: root, state: start });

        search
    }

    /// Runs the search to completion.
    ///
    /// Loops removing a node, goal-checking it, and pushing its unseen
    /// neighbours, until the goal is found or the frontier is exhausted.
    /// Terminates on finite spaces: each state enters the frontier at most
    /// once, guarded by the frontier scan and the explored set.
    pub fn run(&mut self) -> Result<SearchResult<St, A>, SearchError> {
        loop {
            if self.frontier.is_empty() {
                log::debug!(
                    "Frontier exhausted after {} expansions ({} nodes)",
                    self.num_explored,
                    self.search_tree.len(),
                );
                return Err(SearchError::NoSolution);
            }

            let entry = self.frontier.remove()?;
            self.num_explored += 1;

            if self.problem.is_goal(&entry.state) {
                log::debug!(
                    "Goal {:?} reached after {} expansions ({} nodes, {} still pending)",
                    entry.state,
                    self.num_explored,
                    self.search_tree.len(),
                    self.frontier.len(),
                );
                return Ok(SearchResult {
                    solution: self.search_tree.path(entry.node),
                    explored: std::mem::take(&mut self.explored),
                    num_explored: self.num_explored,
                });
            }

            self.explored.insert(entry.state);

            for (s, a) in self.problem.space().neighbours(&entry.state) {
                if self.frontier.contains_state(&s) || self.explored.contains(&s) {
                    continue;
                }
                let child = self
                    .search_tree
                    .push(SearchTreeNode::<St, A>::new(s, Some((entry.node, a))));
                self.frontier.add(FrontierEntry { node: child, state: s });
            }
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn num_explored(&self) -> usize {
        self.num_explored
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "UninformedSearch Stats:")?;
        let s = size_of::<SearchTreeNode<St, A>>();
        let l = self.search_tree.len();
        writeln!(
            out,
            "  - |Nodes|:    {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<FrontierEntry<St>>();
        let l = self.frontier.len();
        writeln!(
            out,
            "  - |Frontier|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<St>();
        let l = self.explored.len();
        writeln!(
            out,
            "  - |Explored|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.num_explored.separate_with_commas()
        )?;

        Ok(())
    }
    pub fn print_memory_stats(&self) {
        self.write_memory_stats(std::io::stdout().lock()).unwrap()
    }
}

/// Solves `problem` with a fresh engine of the requested ordering.
pub fn solve<P, Sp, St, A>(problem: &P, method: Method) -> Result<SearchResult<St, A>, SearchError>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    match method {
        Method::DepthFirst => {
            UninformedSearch::<P, Sp, St, A, StackFrontier<St>>::new(problem).run()
        }
        Method::BreadthFirst => {
            UninformedSearch::<P, Sp, St, A, QueueFrontier<St>>::new(problem).run()
        }
    }
}
