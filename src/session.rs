//! One maze and everything a front end does with it

use std::time::Duration;

use anyhow::bail;
use log::debug;

use crate::grid::{Grid, Point};
use crate::harness::{self, Comparison, RobustMetrics};
use crate::maze_generator::{CarveOrder, MazeGenerator};
use crate::search::{self, Algorithm, AlgorithmResult, StepSink};

/// Owns the current maze, its generator and the solve settings.
///
/// Front ends (CLI, GUI) hold one of these instead of sharing global state.
pub struct Session {
    grid: Grid,
    generator: MazeGenerator,
    /// Overrides the default time budget of every solve
    budget: Option<Duration>,
}

impl Session {
    /// Largest accepted side length
    pub const MAX_SIDE: usize = 101;

    /// Generate the first maze.
    ///
    /// Returns error if a side is outside `5..=101`.
    pub fn new(width: usize, height: usize, order: CarveOrder) -> anyhow::Result<Self> {
        Self::check_size(width, height)?;
        let mut generator = MazeGenerator::with_order(order);
        let grid = generator.generate_maze(width, height);
        Ok(Self {
            grid,
            generator,
            budget: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn set_budget(&mut self, budget: Option<Duration>) {
        self.budget = budget;
    }

    /// Replace the maze with a fresh one of the given size.
    ///
    /// An invalid size leaves the current maze untouched.
    pub fn resize(&mut self, width: usize, height: usize) -> anyhow::Result<()> {
        Self::check_size(width, height)?;
        self.grid = self.generator.generate_maze(width, height);
        Ok(())
    }

    /// Replace the maze with a fresh one of the same size
    pub fn regenerate(&mut self) -> &Grid {
        let (width, height) = (self.grid.width(), self.grid.height());
        self.grid = self.generator.generate_maze(width, height);
        debug!("Regenerated {}x{} maze", width, height);
        &self.grid
    }

    /// Solve once, reporting every step to `sink`
    pub fn solve(
        &mut self,
        algorithm: Algorithm,
        sink: Option<&mut dyn StepSink>,
    ) -> AlgorithmResult {
        match self.budget {
            Some(budget) => search::solve_within(algorithm, &mut self.grid, sink, budget),
            None => search::solve(algorithm, &mut self.grid, sink),
        }
    }

    /// Solve once under the harness guard
    pub fn solve_safely(&mut self, algorithm: Algorithm) -> AlgorithmResult {
        let budget = self.budget;
        harness::run_safely_with(&mut self.grid, |grid| solve_unobserved(algorithm, grid, budget))
    }

    /// Every algorithm once, under the harness guard
    pub fn compare_all(&mut self) -> Comparison {
        let budget = self.budget;
        harness::compare_all_with(&mut self.grid, |algorithm, grid| {
            solve_unobserved(algorithm, grid, budget)
        })
    }

    /// `runs` guarded solves in a row, aggregated
    pub fn benchmark(&mut self, algorithm: Algorithm, runs: usize) -> RobustMetrics {
        let budget = self.budget;
        harness::run_repeated_with(&mut self.grid, runs, |grid| {
            solve_unobserved(algorithm, grid, budget)
        })
    }

    /// ASCII rendering of the maze with `path` drawn in
    pub fn render_path(&mut self, path: &[Point]) -> String {
        self.grid.mark_path(path);
        let text = self.grid.to_ascii();
        self.grid.reset_for_solve();
        text
    }

    fn check_size(width: usize, height: usize) -> anyhow::Result<()> {
        let valid = MazeGenerator::MIN_SIDE..=Self::MAX_SIDE;
        if !valid.contains(&width) || !valid.contains(&height) {
            bail!(
                "Maze size {}x{} out of range, sides must be between {} and {}",
                width,
                height,
                MazeGenerator::MIN_SIDE,
                Self::MAX_SIDE
            );
        }
        Ok(())
    }
}

fn solve_unobserved(
    algorithm: Algorithm,
    grid: &mut Grid,
    budget: Option<Duration>,
) -> AlgorithmResult {
    match budget {
        Some(budget) => search::solve_within(algorithm, grid, None, budget),
        None => search::solve(algorithm, grid, None),
    }
}
