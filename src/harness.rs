//! Guarded solving and benchmarking
//!
//! Algorithms never fail for "no path". A panic inside one is a bug, and
//! it is contained here: the run becomes a failed result with
//! [crate::Metrics::FAULTED] as its time, so a batch over several algorithms
//! still completes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use itertools::Itertools;
use log::{debug, error, info, warn};

use crate::grid::{Grid, Point};
use crate::search::{self, manhattan, Algorithm, AlgorithmResult};

/// Timing statistics over repeated runs, in microseconds
///
/// All times are `-1` when no run succeeded.
#[derive(PartialEq, Clone, Debug)]
pub struct RobustMetrics {
    pub best_us: i64,
    pub worst_us: i64,
    pub average_us: i64,
    pub median_us: i64,
    pub std_dev_us: f64,
    pub successful_runs: usize,
    pub total_runs: usize,
}

impl RobustMetrics {
    /// Aggregate the times of the successful runs out of `total_runs`.
    pub fn from_times(times: &[i64], total_runs: usize) -> Self {
        let sorted: Vec<i64> = times.iter().copied().sorted().collect();
        let (Some(&best_us), Some(&worst_us)) = (sorted.first(), sorted.last()) else {
            return Self {
                best_us: -1,
                worst_us: -1,
                average_us: -1,
                median_us: -1,
                std_dev_us: 0.0,
                successful_runs: 0,
                total_runs,
            };
        };

        let n = sorted.len() as i64;
        let average_us = sorted.iter().sum::<i64>() / n;
        let variance = sorted
            .iter()
            .map(|&t| ((t - average_us) as f64).powi(2))
            .sum::<f64>()
            / n as f64;

        Self {
            best_us,
            worst_us,
            average_us,
            median_us: sorted[sorted.len() / 2],
            std_dev_us: variance.sqrt(),
            successful_runs: sorted.len(),
            total_runs,
        }
    }
}

/// Results of every algorithm on the same grid
pub struct Comparison {
    pub results: Vec<(Algorithm, AlgorithmResult)>,
}

impl Comparison {
    /// Quickest successful run; the earlier algorithm wins a tie
    pub fn fastest(&self) -> Option<&(Algorithm, AlgorithmResult)> {
        self.results
            .iter()
            .filter(|(_, result)| result.success)
            .min_by_key(|(_, result)| result.metrics.elapsed_us)
    }
}

/// Check that `path` walks from the grid's start to its goal through open
/// cells, one orthogonal step at a time.
pub fn validate_path(grid: &Grid, path: &[Point]) -> bool {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        debug!("Validation failed: empty path");
        return false;
    };
    if first != grid.start() {
        debug!("Validation failed: path starts at {}, not at start", first);
        return false;
    }
    if last != grid.goal() {
        debug!("Validation failed: path ends at {}, not at goal", last);
        return false;
    }
    if let Some(p) = path.iter().find(|p| !grid.is_open(**p)) {
        debug!("Validation failed: path goes through wall at {}", p);
        return false;
    }
    if let Some((step, pair)) = path
        .windows(2)
        .enumerate()
        .find(|(_, pair)| manhattan(pair[0], pair[1]) != 1)
    {
        debug!(
            "Validation failed: non-adjacent cells at step {}: {} -> {}",
            step + 1,
            pair[0],
            pair[1]
        );
        return false;
    }
    true
}

/// Solve with `algorithm`, containing panics and rejecting invalid paths
pub fn run_safely(grid: &mut Grid, algorithm: Algorithm) -> AlgorithmResult {
    run_safely_with(grid, |grid| search::solve(algorithm, grid, None))
}

/// Run an arbitrary solver under the same guard as [run_safely]
pub fn run_safely_with<F>(grid: &mut Grid, solver: F) -> AlgorithmResult
where
    F: FnOnce(&mut Grid) -> AlgorithmResult,
{
    match panic::catch_unwind(AssertUnwindSafe(|| solver(&mut *grid))) {
        Ok(mut result) => {
            if result.success && !validate_path(grid, &result.path) {
                warn!("Solver returned an invalid path, discarding it");
                result.success = false;
                result.path.clear();
                result.metrics.path_length = 0;
            }
            result
        }
        Err(cause) => {
            error!("Solver crashed: {}", panic_message(cause.as_ref()));
            AlgorithmResult::faulted()
        }
    }
}

/// Run `algorithm` `runs` times, one after another, and aggregate timings
pub fn run_repeated(grid: &mut Grid, algorithm: Algorithm, runs: usize) -> RobustMetrics {
    run_repeated_with(grid, runs, |grid| search::solve(algorithm, grid, None))
}

/// [run_repeated] with an arbitrary solver
pub fn run_repeated_with<F>(grid: &mut Grid, runs: usize, mut solver: F) -> RobustMetrics
where
    F: FnMut(&mut Grid) -> AlgorithmResult,
{
    let times: Vec<i64> = (1..=runs)
        .filter_map(|run| {
            let result = run_safely_with(grid, &mut solver);
            if result.success && result.metrics.elapsed_us > 0 {
                info!("Run {}/{}: {}", run, runs, result.metrics.time_label());
                Some(result.metrics.elapsed_us)
            } else {
                info!("Run {}/{}: failed", run, runs);
                None
            }
        })
        .collect();
    RobustMetrics::from_times(&times, runs)
}

/// Run every algorithm once on `grid`
pub fn compare_all(grid: &mut Grid) -> Comparison {
    compare_all_with(grid, |algorithm, grid| search::solve(algorithm, grid, None))
}

/// [compare_all] with an arbitrary solver per algorithm
pub fn compare_all_with<F>(grid: &mut Grid, mut solver: F) -> Comparison
where
    F: FnMut(Algorithm, &mut Grid) -> AlgorithmResult,
{
    let results = Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let result = run_safely_with(grid, |grid| solver(algorithm, grid));
            (algorithm, result)
        })
        .collect();
    Comparison { results }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(msg) = cause.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = cause.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{Grid, Point};
    use crate::harness::{
        compare_all, run_repeated, run_repeated_with, run_safely, run_safely_with,
        validate_path, RobustMetrics,
    };
    use crate::maze_generator::MazeGenerator;
    use crate::search::{Algorithm, AlgorithmResult, Metrics};

    #[test]
    fn validation_rejects_corrupted_paths() {
        let mut grid = MazeGenerator::new(Some(4)).generate_maze(21, 21);
        let result = run_safely(&mut grid, Algorithm::AStar);
        assert!(validate_path(&grid, &result.path));

        let mut skipped = result.path.clone();
        skipped.remove(skipped.len() / 2);
        assert!(!validate_path(&grid, &skipped));

        assert!(!validate_path(&grid, &result.path[1..]));
        assert!(!validate_path(&grid, &result.path[..result.path.len() - 1]));
        assert!(!validate_path(&grid, &[]));
    }

    #[test]
    fn validation_rejects_walls() {
        let grid = Grid::from_ascii("#####\n#S#E#\n#####").unwrap();
        let through_wall = [Point::new(1, 1), Point::new(2, 1), Point::new(3, 1)];
        assert!(!validate_path(&grid, &through_wall));
    }

    #[test]
    fn panics_become_faulted_results() {
        let mut grid = MazeGenerator::new(Some(0)).generate_maze(11, 11);
        let result = run_safely_with(&mut grid, |_| panic!("boom"));

        assert!(!result.success);
        assert_eq!(result.metrics.elapsed_us, Metrics::FAULTED);
        assert!(result.path.is_empty());
    }

    #[test]
    fn invalid_paths_are_discarded() {
        let mut grid = MazeGenerator::new(Some(0)).generate_maze(11, 11);
        let result = run_safely_with(&mut grid, |grid| AlgorithmResult {
            path: vec![grid.start(), grid.goal()],
            success: true,
            ..Default::default()
        });

        assert!(!result.success);
        assert!(result.path.is_empty());
        assert_eq!(result.metrics.path_length, 0);
    }

    #[test]
    fn repeated_runs_are_aggregated() {
        let mut grid = MazeGenerator::new(Some(9)).generate_maze(31, 31);
        let metrics = run_repeated(&mut grid, Algorithm::JumpPointSearch, 3);

        assert_eq!(metrics.total_runs, 3);
        assert_eq!(metrics.successful_runs, 3);
        assert!(metrics.best_us <= metrics.median_us);
        assert!(metrics.median_us <= metrics.worst_us);
    }

    #[test]
    fn failing_runs_are_counted_but_not_timed() {
        let mut grid = MazeGenerator::new(Some(9)).generate_maze(11, 11);
        let mut calls = 0;
        let metrics = run_repeated_with(&mut grid, 4, |_| {
            calls += 1;
            if calls % 2 == 0 {
                panic!("every other run crashes");
            }
            AlgorithmResult::default()
        });

        assert_eq!(calls, 4);
        assert_eq!(metrics.successful_runs, 0);
        assert_eq!(metrics.total_runs, 4);
        assert_eq!(metrics.best_us, -1);
    }

    #[test]
    fn statistics_from_times() {
        let metrics = RobustMetrics::from_times(&[30, 10, 20, 40], 5);
        assert_eq!(metrics.best_us, 10);
        assert_eq!(metrics.worst_us, 40);
        assert_eq!(metrics.average_us, 25);
        assert_eq!(metrics.median_us, 30);
        assert!((metrics.std_dev_us - 125f64.sqrt()).abs() < 1e-9);
        assert_eq!(metrics.successful_runs, 4);
        assert_eq!(metrics.total_runs, 5);
    }

    #[test]
    fn comparison_covers_every_algorithm() {
        let mut grid = MazeGenerator::new(Some(6)).generate_maze(21, 21);
        let comparison = compare_all(&mut grid);

        let algorithms: Vec<Algorithm> = comparison.results.iter().map(|(a, _)| *a).collect();
        assert_eq!(algorithms, Algorithm::ALL);
        assert!(comparison.results.iter().all(|(_, r)| r.success));
        assert!(comparison.fastest().is_some());
    }
}
