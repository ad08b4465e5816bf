//! A rectangular maze with impassable cells, one start and one goal.
//!
//! The textual format is the classic one: `A` marks the start, `B` the goal,
//! a space is a free cell and anything else is a wall. Rows shorter than the
//! widest row are padded with free cells; this leniency affects reachability
//! at the right edge and is deliberate, not an accident of parsing.

use derive_more::Display;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::algorithms::uninformed;
use crate::algorithms::uninformed::Method;
use crate::algorithms::uninformed::SearchError;
use crate::algorithms::uninformed::SearchResult;
use crate::problem::Problem;
use crate::space::Action;
use crate::space::Neighbours;
use crate::space::Solution;
use crate::space::Space;
use crate::space::State;

pub type Coord = u32;

// Layout markers accepted by the parser.
const START_MARKER: char = 'A';
const GOAL_MARKER: char = 'B';
const FREE_MARKER: char = ' ';

// Glyphs used by the textual renderer.
const WALL_GLYPH: char = '█';
const PATH_GLYPH: char = '*';

const RANDOM_STATE_MAX_TRIES: usize = 1_000;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("({row},{col})")]
pub struct MazeState {
    pub row: Coord,
    pub col: Coord,
}

impl MazeState {
    #[inline(always)]
    pub fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub(crate) fn new_from_small_usize(row: usize, col: usize) -> Self {
        debug_assert!(row < Coord::MAX as usize);
        debug_assert!(col < Coord::MAX as usize);
        Self {
            row: row as Coord,
            col: col as Coord,
        }
    }
}
impl State for MazeState {}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum MazeAction {
    #[display("up")]
    Up, // row--
    #[display("down")]
    Down, // row++
    #[display("left")]
    Left, // col--
    #[display("right")]
    Right, // col++
}
impl Action for MazeAction {}

/// Candidate order for expansions. Load-bearing: with several equally short
/// solutions available, it decides which one a search returns.
const CANDIDATE_ORDER: [MazeAction; 4] = [
    MazeAction::Up,
    MazeAction::Down,
    MazeAction::Left,
    MazeAction::Right,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeValidationError {
    #[error("Maze must have exactly one start marker '{START_MARKER}', found {0}.")]
    StartCount(usize),
    #[error("Maze must have exactly one goal marker '{GOAL_MARKER}', found {0}.")]
    GoalCount(usize),
    #[error("Empty maze description.")]
    EmptyInput,
    #[error("Start {0} is out of bounds or inside a wall.")]
    BadStart(MazeState),
    #[error("Goal {0} is out of bounds or inside a wall.")]
    BadGoal(MazeState),
}

#[derive(Debug, Error)]
pub enum MazeLoadError {
    #[error("I/O error when loading '{p}': {e}")]
    Io {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
    #[error(transparent)]
    Validation(#[from] MazeValidationError),
}

/// An immutable maze: wall mask, dimensions, start and goal.
///
/// Carries no search state; every `solve` call builds its own engine, so
/// repeated or concurrent runs over one maze are independent.
#[derive(Clone, PartialEq)]
pub struct Maze {
    walls: Vec<Vec<bool>>,
    height: Coord,
    width: Coord,
    start: MazeState,
    goal: MazeState,
}

impl Maze {
    /// Builds a maze from a wall mask.
    ///
    /// Short rows are padded with free cells. `start == goal` is allowed
    /// here (the textual format cannot express it, but the engine handles
    /// it: the root is goal-checked before any expansion).
    pub fn new(
        mut walls: Vec<Vec<bool>>,
        start: MazeState,
        goal: MazeState,
    ) -> Result<Self, MazeValidationError> {
        let height = walls.len();
        let width = walls.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeValidationError::EmptyInput);
        }
        debug_assert!(height < Coord::MAX as usize && width < Coord::MAX as usize);

        for row in &mut walls {
            row.resize(width, false);
        }

        let maze = Self {
            walls,
            height: height as Coord,
            width: width as Coord,
            start,
            goal,
        };

        if !maze.in_bounds(&start) || maze.is_wall(&start) {
            return Err(MazeValidationError::BadStart(start));
        }
        if !maze.in_bounds(&goal) || maze.is_wall(&goal) {
            return Err(MazeValidationError::BadGoal(goal));
        }

        Ok(maze)
    }

    #[inline(always)]
    pub fn dimensions(&self) -> (Coord, Coord) {
        (self.height, self.width)
    }
    #[inline(always)]
    pub fn height(&self) -> Coord {
        self.height
    }
    #[inline(always)]
    pub fn width(&self) -> Coord {
        self.width
    }
    #[inline(always)]
    pub fn start(&self) -> MazeState {
        self.start
    }
    #[inline(always)]
    pub fn goal(&self) -> MazeState {
        self.goal
    }

    #[inline(always)]
    fn in_bounds(&self, s: &MazeState) -> bool {
        s.row < self.height && s.col < self.width
    }

    #[inline(always)]
    pub fn is_wall(&self, s: &MazeState) -> bool {
        debug_assert!(self.in_bounds(s));
        self.walls[s.row as usize][s.col as usize]
    }

    /// Number of non-wall cells. Upper bound for any run's `num_explored`.
    pub fn free_cells(&self) -> usize {
        self.walls
            .iter()
            .flatten()
            .filter(|&&is_wall| !is_wall)
            .count()
    }

    /// Solves this maze with the requested exploration order.
    pub fn solve(&self, method: Method) -> Result<SearchResult<MazeState, MazeAction>, SearchError> {
        uninformed::solve::<Maze, Maze, MazeState, MazeAction>(self, method)
    }

    /// Renders the maze as text, one line per row, optionally overlaying the
    /// solution path with `*`. Start and goal glyphs win over the overlay.
    pub fn render(&self, solution: Option<&Solution<MazeState, MazeAction>>) -> String {
        let mut out = String::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let s = MazeState::new(row, col);
                let glyph = if self.is_wall(&s) {
                    WALL_GLYPH
                } else if s == self.start {
                    START_MARKER
                } else if s == self.goal {
                    GOAL_MARKER
                } else if solution.is_some_and(|sol| sol.cells.contains(&s)) {
                    PATH_GLYPH
                } else {
                    FREE_MARKER
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// Generates a random maze, or `None` if no free start/goal pair was
    /// found within the retry budget.
    pub fn random<R: rand::Rng>(
        r: &mut R,
        height: usize,
        width: usize,
        wall_probability: f64,
    ) -> Option<Maze> {
        if height == 0 || width == 0 {
            return None;
        }

        let mut walls = vec![vec![false; width]; height];
        for row in walls.iter_mut() {
            for cell in row.iter_mut() {
                *cell = r.random::<f64>() < wall_probability;
            }
        }

        let start = random_free_cell(&walls, r)?;
        let mut goal = random_free_cell(&walls, r)?;
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            if goal != start {
                break;
            }
            goal = random_free_cell(&walls, r)?;
        }
        if goal == start {
            return None;
        }

        Maze::new(walls, start, goal).ok()
    }
}

fn random_free_cell<R: rand::Rng>(walls: &[Vec<bool>], r: &mut R) -> Option<MazeState> {
    let height = walls.len();
    let width = walls[0].len();

    for _tries in 0..RANDOM_STATE_MAX_TRIES {
        let row = r.random_range(0..height);
        let col = r.random_range(0..width);
        if !walls[row][col] {
            return Some(MazeState::new_from_small_usize(row, col));
        }
    }

    None
}

impl Space<MazeState, MazeAction> for Maze {
    #[inline(always)]
    fn apply(&self, s: &MazeState, a: &MazeAction) -> Option<MazeState> {
        let (row, col) = match a {
            MazeAction::Up => (s.row.checked_sub(1)?, s.col),
            MazeAction::Down => (s.row + 1, s.col),
            MazeAction::Left => (s.row, s.col.checked_sub(1)?),
            MazeAction::Right => (s.row, s.col + 1),
        };
        let n = MazeState::new(row, col);
        self.in_bounds(&n).then_some(n)
    }

    fn neighbours(&self, s: &MazeState) -> Neighbours<MazeState, MazeAction> {
        let mut result = Neighbours::new();
        for action in CANDIDATE_ORDER {
            if let Some(n) = self.apply(s, &action) {
                if !self.is_wall(&n) {
                    result.push((n, action));
                }
            }
        }
        result
    }

    #[inline(always)]
    fn valid(&self, s: &MazeState) -> bool {
        self.in_bounds(s) && !self.is_wall(s)
    }
}

impl Problem<Maze, MazeState, MazeAction> for Maze {
    #[inline(always)]
    fn space(&self) -> &Maze {
        self
    }
    #[inline(always)]
    fn start(&self) -> MazeState {
        self.start
    }
    #[inline(always)]
    fn goal(&self) -> MazeState {
        self.goal
    }
}

impl std::convert::TryFrom<&str> for Maze {
    type Error = MazeValidationError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let num_starts = contents.chars().filter(|&ch| ch == START_MARKER).count();
        if num_starts != 1 {
            return Err(MazeValidationError::StartCount(num_starts));
        }
        let num_goals = contents.chars().filter(|&ch| ch == GOAL_MARKER).count();
        if num_goals != 1 {
            return Err(MazeValidationError::GoalCount(num_goals));
        }

        let lines: Vec<&str> = contents.lines().collect();
        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeValidationError::EmptyInput);
        }

        // Cells past the end of a short line stay free.
        let mut walls = vec![vec![false; width]; height];
        let mut start = None;
        let mut goal = None;
        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    START_MARKER => start = Some(MazeState::new_from_small_usize(row, col)),
                    GOAL_MARKER => goal = Some(MazeState::new_from_small_usize(row, col)),
                    FREE_MARKER => {}
                    _ => walls[row][col] = true,
                }
            }
        }

        // The marker counts above guarantee both are present.
        let start = start.ok_or(MazeValidationError::StartCount(0))?;
        let goal = goal.ok_or(MazeValidationError::GoalCount(0))?;

        Maze::new(walls, start, goal)
    }
}

impl std::convert::TryFrom<&std::path::Path> for Maze {
    type Error = MazeLoadError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        let contents = std::fs::read_to_string(p).map_err(|e| MazeLoadError::Io {
            p: p.to_path_buf(),
            e,
        })?;
        Ok(Maze::try_from(contents.as_str())?)
    }
}

impl std::fmt::Display for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

impl std::fmt::Debug for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Maze{:?} (s:{}, g:{})",
            self.dimensions(),
            self.start,
            self.goal
        )
    }
}

// Raster rendering
// ----------------

const CELL_SIZE: u32 = 50;
const CELL_BORDER: u32 = 2;

// The renderer's palette.
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const WALL_FILL: [u8; 4] = [40, 40, 40, 255];
const START_FILL: [u8; 4] = [255, 0, 0, 255];
const GOAL_FILL: [u8; 4] = [0, 171, 28, 255];
const SOLUTION_FILL: [u8; 4] = [220, 235, 113, 255];
const EXPLORED_FILL: [u8; 4] = [212, 97, 85, 255];
const FREE_FILL: [u8; 4] = [237, 240, 252, 255];

impl Maze {
    /// Rasterizes the maze, optionally highlighting the solution path and
    /// the visited-but-unused cells.
    pub fn write_image<P: AsRef<std::path::Path>>(
        &self,
        path: P,
        solution: Option<&Solution<MazeState, MazeAction>>,
        explored: Option<&FxHashSet<MazeState>>,
    ) -> Result<(), image::ImageError> {
        let mut img = image::RgbaImage::from_pixel(
            self.width * CELL_SIZE,
            self.height * CELL_SIZE,
            image::Rgba(BACKGROUND),
        );

        for row in 0..self.height {
            for col in 0..self.width {
                let s = MazeState::new(row, col);
                let fill = if self.is_wall(&s) {
                    WALL_FILL
                } else if s == self.start {
                    START_FILL
                } else if s == self.goal {
                    GOAL_FILL
                } else if solution.is_some_and(|sol| sol.cells.contains(&s)) {
                    SOLUTION_FILL
                } else if explored.is_some_and(|e| e.contains(&s)) {
                    EXPLORED_FILL
                } else {
                    FREE_FILL
                };

                for y in (row * CELL_SIZE + CELL_BORDER)..((row + 1) * CELL_SIZE - CELL_BORDER) {
                    for x in (col * CELL_SIZE + CELL_BORDER)..((col + 1) * CELL_SIZE - CELL_BORDER)
                    {
                        img.put_pixel(x, y, image::Rgba(fill));
                    }
                }
            }
        }

        img.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SCENARIO: &str = indoc! {"
        A
         #
          B
    "};

    #[test]
    fn parses_dimensions_and_markers() {
        let maze = Maze::try_from(SCENARIO).unwrap();

        assert_eq!(maze.dimensions(), (3, 3));
        assert_eq!(maze.start(), MazeState::new(0, 0));
        assert_eq!(maze.goal(), MazeState::new(2, 2));
        assert!(maze.is_wall(&MazeState::new(1, 1)));
        assert_eq!(maze.free_cells(), 8);
    }

    #[test]
    fn neighbour_candidates_keep_fixed_order() {
        let maze = Maze::try_from(SCENARIO).unwrap();

        // (2,1): up is the wall, down is out of bounds.
        let n: Vec<_> = maze.neighbours(&MazeState::new(2, 1)).into_vec();
        assert_eq!(
            n,
            vec![
                (MazeState::new(2, 0), MazeAction::Left),
                (MazeState::new(2, 2), MazeAction::Right),
            ]
        );

        // (1,0): all four candidates generated, wall and bounds filtered.
        let n: Vec<_> = maze.neighbours(&MazeState::new(1, 0)).into_vec();
        assert_eq!(
            n,
            vec![
                (MazeState::new(0, 0), MazeAction::Up),
                (MazeState::new(2, 0), MazeAction::Down),
            ]
        );
    }

    #[test]
    fn apply_respects_bounds_but_not_walls() {
        let maze = Maze::try_from(SCENARIO).unwrap();

        assert_eq!(maze.apply(&MazeState::new(0, 0), &MazeAction::Up), None);
        assert_eq!(maze.apply(&MazeState::new(0, 0), &MazeAction::Left), None);
        assert_eq!(maze.apply(&MazeState::new(2, 2), &MazeAction::Down), None);
        // Walls are apply-able; validity is a separate question.
        assert_eq!(
            maze.apply(&MazeState::new(0, 1), &MazeAction::Down),
            Some(MazeState::new(1, 1))
        );
        assert!(!maze.valid(&MazeState::new(1, 1)));
    }

    #[test]
    fn exactly_one_start_and_goal_required() {
        assert_eq!(
            Maze::try_from("B  \n  B"),
            Err(MazeValidationError::StartCount(0))
        );
        assert_eq!(
            Maze::try_from("A B\n  B"),
            Err(MazeValidationError::GoalCount(2))
        );
        assert_eq!(
            Maze::try_from("AA B"),
            Err(MazeValidationError::StartCount(2))
        );
        assert_eq!(Maze::try_from(""), Err(MazeValidationError::StartCount(0)));
    }

    #[test]
    fn short_rows_pad_with_free_cells() {
        // Row 0 is a single character wide; (0,1) and (0,2) are implied free.
        let maze = Maze::try_from("A\n##B").unwrap();

        assert_eq!(maze.dimensions(), (2, 3));
        assert!(!maze.is_wall(&MazeState::new(0, 1)));
        assert!(!maze.is_wall(&MazeState::new(0, 2)));

        // The padded cells are traversable: right, right, down.
        let result = maze.solve(Method::BreadthFirst).unwrap();
        assert_eq!(result.solution.len(), 3);
    }

    #[test]
    fn any_unknown_character_is_a_wall() {
        let maze = Maze::try_from("A#B\nx+.").unwrap();
        assert!(maze.is_wall(&MazeState::new(0, 1)));
        assert!(maze.is_wall(&MazeState::new(1, 0)));
        assert!(maze.is_wall(&MazeState::new(1, 1)));
        assert!(maze.is_wall(&MazeState::new(1, 2)));
    }

    #[test]
    fn render_matches_textual_contract() {
        let maze = Maze::try_from(SCENARIO).unwrap();
        assert_eq!(maze.render(None), "A  \n █ \n  B\n");
        assert_eq!(maze.to_string(), maze.render(None));

        let result = maze.solve(Method::BreadthFirst).unwrap();
        let rendered = maze.render(Some(&result.solution));
        // 4 moves, with the goal cell shown as B rather than *.
        assert_eq!(rendered.matches(PATH_GLYPH).count(), 3);
        assert_eq!(rendered.matches(WALL_GLYPH).count(), 1);
    }

    #[test]
    fn random_mazes_are_well_formed() {
        use rand_chacha::ChaCha8Rng;
        use rand_chacha::rand_core::SeedableRng;

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let maze = Maze::random(&mut rng, 16, 24, 0.3).unwrap();

        assert_eq!(maze.dimensions(), (16, 24));
        assert_ne!(maze.start(), maze.goal());
        assert!(!maze.is_wall(&maze.start()));
        assert!(!maze.is_wall(&maze.goal()));
    }

    #[test]
    fn write_image_produces_a_file() {
        let maze = Maze::try_from(SCENARIO).unwrap();
        let result = maze.solve(Method::BreadthFirst).unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join("maze_search_render_test.png");
        maze.write_image(&path, Some(&result.solution), Some(&result.explored))
            .unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
        let _ = std::fs::remove_file(&path);
    }
}
