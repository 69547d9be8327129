//! Generate perfect mazes and race shortest-path algorithms through them
//!
//! A [MazeGenerator] carves a maze by recursive backtracking into a
//! [Grid]. Four algorithms solve it: Dijkstra, A*, bidirectional A* and
//! Jump Point Search. Each solve returns an [AlgorithmResult] with the
//! path, the order in which cells were closed, and timing metrics.
//!
//! # Examples
//! ## Solve a generated maze
//! ```
//! use maze_race::{generate_maze, solve, validate_path, Algorithm};
//!
//! let mut grid = generate_maze(21, 21);
//! let dijkstra = solve(Algorithm::Dijkstra, &mut grid, None);
//! let astar = solve(Algorithm::AStar, &mut grid, None);
//!
//! assert!(validate_path(&grid, &astar.path));
//! assert_eq!(dijkstra.metrics.path_length, astar.metrics.path_length);
//! ```
//!
//! ## Watch a solve
//! ```
//! use maze_race::{solve, Algorithm, CarveOrder, MazeGenerator, StepEvent};
//!
//! let mut grid = MazeGenerator::with_order(CarveOrder::Fixed).generate_maze(7, 7);
//! let mut events: Vec<StepEvent> = Vec::new();
//! let result = solve(Algorithm::JumpPointSearch, &mut grid, Some(&mut events));
//!
//! assert!(result.success);
//! assert_eq!(events.first(), Some(&StepEvent::Visit(grid.start())));
//! ```
//!
//! ## Compare everything
//! ```
//! use maze_race::{CarveOrder, Session};
//!
//! let mut session = Session::new(31, 31, CarveOrder::Seeded(1)).unwrap();
//! let comparison = session.compare_all();
//! for (algorithm, result) in &comparison.results {
//!     println!("{}: {} cells", algorithm, result.metrics.path_length);
//! }
//! ```

pub mod grid;
pub mod harness;
pub mod maze_generator;
pub mod search;
pub mod session;

pub use grid::{Cell, Direction, Grid, Point};
pub use harness::{compare_all, run_repeated, run_safely, validate_path, Comparison, RobustMetrics};
pub use maze_generator::{CarveOrder, MazeGenerator};
pub use search::{
    solve, solve_within, Algorithm, AlgorithmResult, Metrics, Paced, StepEvent, StepSink,
};
pub use session::Session;

/// Generate a fresh random perfect maze.
///
/// Sides are rounded up to odd values of at least 5. Start is `(1, 1)`,
/// goal `(width - 2, height - 2)`.
pub fn generate_maze(width: usize, height: usize) -> Grid {
    MazeGenerator::new(None).generate_maze(width, height)
}

#[cfg(test)]
mod testing {
    use std::collections::HashSet;

    use crate::grid::{Grid, Point};

    /// Flood fill over open cells
    pub(crate) fn reachable_from(grid: &Grid, origin: Point) -> HashSet<Point> {
        let mut seen = HashSet::from([origin]);
        let mut stack = vec![origin];
        while let Some(p) = stack.pop() {
            for n in grid.navigable_neighbors(p) {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use crate::{generate_maze, solve, validate_path, Algorithm};

    #[test]
    fn generated_mazes_differ_between_calls() {
        let mazes: Vec<String> = (0..5).map(|_| generate_maze(31, 31).to_ascii()).collect();
        assert!(mazes.iter().any(|m| *m != mazes[0]));
    }

    #[test]
    fn every_algorithm_solves_a_fresh_maze() {
        let mut grid = generate_maze(25, 17);
        for algorithm in Algorithm::ALL {
            let result = solve(algorithm, &mut grid, None);
            assert!(validate_path(&grid, &result.path), "{}", algorithm);
        }
    }
}
