//! Grid of maze cells

use std::fmt;

use anyhow::{anyhow, bail};
use itertools::Itertools;

/// Cost sentinel of a cell that the current search has not reached
pub const UNSEEN: u32 = u32::MAX;

/// Location in the grid
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Point `distance` cells away in `dir`, or `None` when that would
    /// leave the non-negative quadrant.
    pub fn step(self, dir: Direction, distance: usize) -> Option<Point> {
        let (x, y) = match dir {
            Direction::North => (Some(self.x), self.y.checked_sub(distance)),
            Direction::South => (Some(self.x), self.y.checked_add(distance)),
            Direction::East => (self.x.checked_add(distance), Some(self.y)),
            Direction::West => (self.x.checked_sub(distance), Some(self.y)),
        };
        Some(Point::new(x?, y?))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction on the grid
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Neighbor order shared by every algorithm, so that ties break the
    /// same way everywhere.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// The two directions at right angles to this one
    pub fn perpendicular(self) -> [Direction; 2] {
        if self.is_vertical() {
            [Direction::East, Direction::West]
        } else {
            [Direction::North, Direction::South]
        }
    }
}

/// Single square of the maze
///
/// Generation and search keep separate bookkeeping flags, so a freshly
/// carved maze never leaks "visited" state into a solver.
#[derive(Clone, Debug)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub is_wall: bool,
    /// Room already reached by the maze generator
    pub generation_visited: bool,
    /// Settled by the running search; never re-examined afterwards
    pub search_closed: bool,
    /// Accumulated cost from the search origin, [UNSEEN] until reached
    pub g_cost: u32,
    /// Heuristic estimate to the search target
    pub h_cost: u32,
    /// Index of the predecessor cell in the same grid
    pub parent: Option<usize>,
    /// Marked for rendering by [Grid::mark_path]
    pub on_path: bool,
}

impl Cell {
    fn new(x: usize, y: usize, is_wall: bool) -> Self {
        Self {
            x,
            y,
            is_wall,
            generation_visited: false,
            search_closed: false,
            g_cost: UNSEEN,
            h_cost: 0,
            parent: None,
            on_path: false,
        }
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn f_cost(&self) -> u32 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

/// Rectangular maze, cells stored row-major
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    start: Point,
    goal: Point,
}

impl Grid {
    const C_WALL: char = '#';
    const C_OPEN: char = ' ';
    const C_START: char = 'S';
    const C_GOAL: char = 'E';
    const C_PATH: char = '.';

    /// Create a grid of solid walls.
    ///
    /// Start and goal default to the first and last interior cells,
    /// `(1, 1)` and `(width - 2, height - 2)`.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y, true)))
            .collect();
        Self {
            width,
            height,
            cells,
            start: Point::new(1, 1),
            goal: Point::new(width.saturating_sub(2), height.saturating_sub(2)),
        }
    }

    /// Parse a grid from its ASCII rendering
    ///
    /// - `text`: Rows separated by newlines, using `#` for walls, ` ` (or
    ///   `.`) for open cells, `S` for the start and `E` for the goal.
    ///
    /// Returns error on ragged rows, unknown characters, or a missing start
    /// or goal.
    ///
    /// # Examples
    /// ```
    /// use maze_race::Grid;
    ///
    /// let grid = Grid::from_ascii("#####\n#S  #\n### #\n#E  #\n#####").unwrap();
    /// assert_eq!(grid.goal().x, 1);
    /// ```
    pub fn from_ascii(text: &str) -> anyhow::Result<Self> {
        let rows: Vec<Vec<char>> = text.lines().map(|row| row.chars().collect()).collect();
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            bail!("Empty maze");
        }

        let mut grid = Grid::new(width, height);
        let mut start = None;
        let mut goal = None;
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                bail!("Row {} has {} cells, expected {}", y, row.len(), width);
            }
            for (x, c) in row.iter().enumerate() {
                let idx = y * width + x;
                grid.cells[idx].is_wall = match *c {
                    Self::C_WALL => true,
                    Self::C_OPEN | Self::C_PATH => false,
                    Self::C_START => {
                        start = Some(Point::new(x, y));
                        false
                    }
                    Self::C_GOAL => {
                        goal = Some(Point::new(x, y));
                        false
                    }
                    val => bail!("Unexpected character `{}` at x={}, y={}", val, x, y),
                };
            }
        }

        grid.start = start.ok_or_else(|| anyhow!("Start is not found in maze"))?;
        grid.goal = goal.ok_or_else(|| anyhow!("Goal is not found in maze"))?;
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Move the start. Rejects points outside the grid.
    pub fn set_start(&mut self, p: Point) -> anyhow::Result<()> {
        self.check_bounds(p)?;
        self.start = p;
        Ok(())
    }

    /// Move the goal. Rejects points outside the grid.
    pub fn set_goal(&mut self, p: Point) -> anyhow::Result<()> {
        self.check_bounds(p)?;
        self.goal = p;
        Ok(())
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Row-major index of `p`, if it is inside the grid
    pub fn index_of(&self, p: Point) -> Option<usize> {
        self.contains(p).then(|| p.y * self.width + p.x)
    }

    pub fn point_of(&self, idx: usize) -> Point {
        Point::new(idx % self.width, idx / self.width)
    }

    pub fn at(&self, x: usize, y: usize) -> anyhow::Result<&Cell> {
        let idx = self.checked_index(Point::new(x, y))?;
        Ok(&self.cells[idx])
    }

    pub fn at_mut(&mut self, x: usize, y: usize) -> anyhow::Result<&mut Cell> {
        let idx = self.checked_index(Point::new(x, y))?;
        Ok(&mut self.cells[idx])
    }

    pub(crate) fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub(crate) fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    /// In bounds and not a wall
    pub fn is_open(&self, p: Point) -> bool {
        self.index_of(p).is_some_and(|idx| !self.cells[idx].is_wall)
    }

    pub fn set_wall(&mut self, p: Point, is_wall: bool) -> anyhow::Result<()> {
        self.at_mut(p.x, p.y)?.is_wall = is_wall;
        Ok(())
    }

    /// Orthogonal in-bounds neighbors, in [Direction::ALL] order
    pub fn neighbors4(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| p.step(dir, 1))
            .filter(|n| self.contains(*n))
    }

    /// [Self::neighbors4] without walls
    pub fn navigable_neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        self.neighbors4(p).filter(|n| self.is_open(*n))
    }

    /// Clear all search state. Every solve starts with this, since all
    /// algorithms share the same cells.
    pub fn reset_for_solve(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.search_closed = false;
            cell.g_cost = UNSEEN;
            cell.h_cost = 0;
            cell.parent = None;
            cell.on_path = false;
        }
    }

    /// Flag cells of `path` so that [Self::to_ascii] draws them
    pub fn mark_path(&mut self, path: &[Point]) {
        for p in path {
            if let Some(idx) = self.index_of(*p) {
                self.cells[idx].on_path = true;
            }
        }
    }

    /// Render as text: `#` wall, `S` start, `E` goal, `.` marked path,
    /// ` ` open. Every row ends with a newline.
    pub fn to_ascii(&self) -> String {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|cell| self.symbol(cell))
                    .chain(std::iter::once('\n'))
                    .collect::<String>()
            })
            .join("")
    }

    fn symbol(&self, cell: &Cell) -> char {
        if cell.pos() == self.start {
            Self::C_START
        } else if cell.pos() == self.goal {
            Self::C_GOAL
        } else if cell.is_wall {
            Self::C_WALL
        } else if cell.on_path {
            Self::C_PATH
        } else {
            Self::C_OPEN
        }
    }

    fn check_bounds(&self, p: Point) -> anyhow::Result<()> {
        if !self.contains(p) {
            bail!(
                "{} is outside the {}x{} grid",
                p,
                self.width,
                self.height
            );
        }
        Ok(())
    }

    fn checked_index(&self, p: Point) -> anyhow::Result<usize> {
        self.check_bounds(p)?;
        Ok(p.y * self.width + p.x)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{Direction, Grid, Point, UNSEEN};

    fn corridor() -> Grid {
        Grid::from_ascii(
            "
#####
#S  #
### #
#E  #
#####"
                .trim(),
        )
        .unwrap()
    }

    #[test]
    fn parse_ascii_input() {
        let grid = corridor();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.start(), Point::new(1, 1));
        assert_eq!(grid.goal(), Point::new(1, 3));
        assert_eq!(grid.cells().iter().filter(|c| !c.is_wall).count(), 7);
    }

    #[test]
    fn parse_rejects_unknown_characters() {
        assert!(Grid::from_ascii("#S#\n#x#\n#E#").is_err());
        assert!(Grid::from_ascii("#S#\n##\n#E#").is_err());
        assert!(Grid::from_ascii("###\n#S#\n###").is_err());
    }

    #[test]
    fn at_is_bounds_checked() {
        let mut grid = Grid::new(5, 5);
        assert!(grid.at(4, 4).is_ok());
        assert!(grid.at(5, 0).is_err());
        assert!(grid.at(0, 5).is_err());

        grid.at_mut(2, 3).unwrap().is_wall = false;
        assert!(grid.is_open(Point::new(2, 3)));
        assert_eq!(grid.index_of(Point::new(2, 3)), Some(17));
        assert_eq!(grid.point_of(17), Point::new(2, 3));
    }

    #[test]
    fn neighbors_follow_fixed_order() {
        let grid = Grid::new(5, 5);
        let around: Vec<_> = grid.neighbors4(Point::new(2, 2)).collect();
        assert_eq!(
            around,
            vec![
                Point::new(2, 1),
                Point::new(2, 3),
                Point::new(3, 2),
                Point::new(1, 2)
            ]
        );

        let corner: Vec<_> = grid.neighbors4(Point::new(0, 0)).collect();
        assert_eq!(corner, vec![Point::new(0, 1), Point::new(1, 0)]);
    }

    #[test]
    fn navigable_neighbors_skip_walls() {
        let grid = corridor();
        let open: Vec<_> = grid.navigable_neighbors(Point::new(3, 1)).collect();
        assert_eq!(open, vec![Point::new(3, 2), Point::new(2, 1)]);
    }

    #[test]
    fn reset_clears_search_state_only() {
        let mut grid = corridor();
        {
            let cell = grid.at_mut(1, 1).unwrap();
            cell.search_closed = true;
            cell.generation_visited = true;
            cell.g_cost = 3;
            cell.h_cost = 4;
            cell.parent = Some(7);
            cell.on_path = true;
        }
        grid.reset_for_solve();

        let cell = grid.at(1, 1).unwrap();
        assert!(!cell.search_closed);
        assert!(cell.generation_visited);
        assert_eq!(cell.g_cost, UNSEEN);
        assert_eq!(cell.h_cost, 0);
        assert_eq!(cell.parent, None);
        assert!(!cell.on_path);
    }

    #[test]
    fn render_marks_path() {
        let mut grid = corridor();
        grid.mark_path(&[
            Point::new(1, 1),
            Point::new(2, 1),
            Point::new(3, 1),
            Point::new(3, 2),
        ]);
        assert_eq!(grid.to_ascii(), "#####\n#S..#\n###.#\n#E  #\n#####\n");
    }

    #[test]
    fn step_stays_non_negative() {
        let p = Point::new(0, 3);
        assert_eq!(p.step(Direction::West, 1), None);
        assert_eq!(p.step(Direction::North, 2), Some(Point::new(0, 1)));
        assert_eq!(Direction::East.perpendicular(), [Direction::North, Direction::South]);
    }
}
