//! Maze generation

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::grid::{Direction, Grid, Point};

/// How the generator chooses among unvisited neighbor rooms
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CarveOrder {
    /// Fresh entropy for every maze
    Random,
    /// Reproducible sequence of mazes
    Seeded(u64),
    /// Always the first candidate in [Direction::ALL] order
    Fixed,
}

/// Recursive-backtracking generator for perfect mazes.
pub struct MazeGenerator {
    order: CarveOrder,
    random: Option<StdRng>,
}

impl MazeGenerator {
    /// Smallest side length that still leaves a room between start and goal
    pub const MIN_SIDE: usize = 5;

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(state) => Self::with_order(CarveOrder::Seeded(state)),
            None => Self::with_order(CarveOrder::Random),
        }
    }

    pub fn with_order(order: CarveOrder) -> Self {
        Self {
            order,
            random: match order {
                CarveOrder::Seeded(state) => Some(StdRng::seed_from_u64(state)),
                CarveOrder::Random | CarveOrder::Fixed => None,
            },
        }
    }

    /// Round a requested side up to an odd value of at least [Self::MIN_SIDE]
    pub fn normalize(side: usize) -> usize {
        let side = side.max(Self::MIN_SIDE);
        if side % 2 == 0 {
            side + 1
        } else {
            side
        }
    }

    /// Generate a perfect maze (exactly one path between any two open cells)
    ///
    /// Rooms sit on odd coordinates with walls between them. Starting from
    /// the start room, carve through the wall into a random unvisited room
    /// two steps away; backtrack when no such room is left. The result is a
    /// spanning tree over all rooms.
    ///
    /// Dimensions are normalized with [Self::normalize]. Start is `(1, 1)`
    /// and goal `(width - 2, height - 2)`, both always open.
    pub fn generate_maze(&mut self, width: usize, height: usize) -> Grid {
        let width = Self::normalize(width);
        let height = Self::normalize(height);

        if self.order == CarveOrder::Random {
            self.random = Some(StdRng::from_entropy());
        }

        let mut grid = Grid::new(width, height);
        for idx in 0..width * height {
            let p = grid.point_of(idx);
            grid.cell_mut(idx).is_wall = !Self::is_room(&grid, p);
        }

        self.build_maze(&mut grid);

        for p in [grid.start(), grid.goal()] {
            if let Some(idx) = grid.index_of(p) {
                grid.cell_mut(idx).is_wall = false;
            }
        }
        grid.reset_for_solve();

        debug!(
            "Generated {}x{} maze with {} open cells ({:?})",
            width,
            height,
            grid.cells().iter().filter(|c| !c.is_wall).count(),
            self.order
        );
        grid
    }

    /// Carve passages with an explicit stack of rooms.
    fn build_maze(&mut self, grid: &mut Grid) {
        let origin = grid.start();
        let Some(origin_idx) = grid.index_of(origin) else {
            return;
        };
        grid.cell_mut(origin_idx).generation_visited = true;
        let mut stack = vec![origin];

        while let Some(&current) = stack.last() {
            let choices: Vec<(Point, Point)> = Direction::ALL
                .into_iter()
                .filter_map(|dir| {
                    let room = current.step(dir, 2)?;
                    let idx = grid.index_of(room)?;
                    if !Self::is_room(grid, room) || grid.cell(idx).generation_visited {
                        return None;
                    }
                    Some((current.step(dir, 1)?, room))
                })
                .collect();

            match self.pick(&choices) {
                Some(&(wall, room)) => {
                    // Remove wall between current room and the chosen one
                    for p in [wall, room] {
                        if let Some(idx) = grid.index_of(p) {
                            grid.cell_mut(idx).is_wall = false;
                        }
                    }
                    if let Some(idx) = grid.index_of(room) {
                        grid.cell_mut(idx).generation_visited = true;
                    }
                    stack.push(room);
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    fn pick<'a, T>(&mut self, choices: &'a [T]) -> Option<&'a T> {
        match self.random.as_mut() {
            Some(rng) => choices.choose(rng),
            None => choices.first(),
        }
    }

    /// Odd-odd interior cell
    fn is_room(grid: &Grid, p: Point) -> bool {
        p.x % 2 == 1 && p.y % 2 == 1 && p.x + 1 < grid.width() && p.y + 1 < grid.height()
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{Point, UNSEEN};
    use crate::maze_generator::{CarveOrder, MazeGenerator};
    use crate::testing::reachable_from;

    #[test]
    fn fixed_order_carves_known_maze() {
        let mut gen = MazeGenerator::with_order(CarveOrder::Fixed);
        let grid = gen.generate_maze(7, 7);

        let expected = "
#######
#S#   #
# # # #
# # # #
# # # #
#   #E#
#######
"
        .trim_start();
        assert_eq!(grid.to_ascii(), expected);
    }

    #[test]
    fn every_open_cell_is_reachable() {
        for (seed, width, height) in [(0, 21, 21), (1, 15, 31), (2, 5, 5), (3, 40, 12)] {
            let mut gen = MazeGenerator::new(Some(seed));
            let grid = gen.generate_maze(width, height);

            let reached = reachable_from(&grid, grid.start());
            let open = grid.cells().iter().filter(|c| !c.is_wall).count();
            assert_eq!(reached.len(), open, "seed {}", seed);
        }
    }

    #[test]
    fn maze_is_a_spanning_tree() {
        let mut gen = MazeGenerator::new(Some(42));
        let grid = gen.generate_maze(31, 21);

        // Rooms plus one knocked-down wall per tree edge
        let rooms = (31 / 2) * (21 / 2);
        let open = grid.cells().iter().filter(|c| !c.is_wall).count();
        assert_eq!(open, 2 * rooms - 1);
    }

    #[test]
    fn dimensions_are_normalized() {
        assert_eq!(MazeGenerator::normalize(0), 5);
        assert_eq!(MazeGenerator::normalize(4), 5);
        assert_eq!(MazeGenerator::normalize(6), 7);
        assert_eq!(MazeGenerator::normalize(21), 21);

        let grid = MazeGenerator::new(Some(0)).generate_maze(10, 2);
        assert_eq!((grid.width(), grid.height()), (11, 5));
        assert_eq!(grid.goal(), Point::new(9, 3));
    }

    #[test]
    fn start_and_goal_are_open_and_search_state_is_clean() {
        let grid = MazeGenerator::new(None).generate_maze(21, 21);
        assert!(grid.is_open(grid.start()));
        assert!(grid.is_open(grid.goal()));
        assert!(grid
            .cells()
            .iter()
            .all(|c| !c.search_closed && c.g_cost == UNSEEN && c.parent.is_none()));
    }

    #[test]
    fn seeded_generators_repeat() {
        let a = MazeGenerator::new(Some(7)).generate_maze(25, 25);
        let b = MazeGenerator::new(Some(7)).generate_maze(25, 25);
        assert_eq!(a.to_ascii(), b.to_ascii());
    }
}
