//! Shortest-path search over a [Grid]
//!
//! Four algorithms share one contract: [solve] resets the grid's search
//! state, runs the search under a time budget, and returns an
//! [AlgorithmResult]. "No path" and "out of time" are ordinary outcomes
//! (`success == false`), never errors.
//!
//! Observers implement [StepSink] to see every cell the search closes and
//! every frontier insertion, e.g. for animation.

mod best_first;
mod bidirectional;
mod jps;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::grid::{Cell, Grid, Point};

/// Budget for a solve nobody is watching; a runaway search should fail fast
pub const UNATTENDED_BUDGET: Duration = Duration::from_secs(2);

/// Budget for an observed solve, where the observer may pace every event
pub const OBSERVED_BUDGET: Duration = Duration::from_secs(60);

/// Available search algorithms
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, clap::ValueEnum)]
pub enum Algorithm {
    Dijkstra,
    #[value(name = "astar")]
    AStar,
    #[value(name = "bidirectional")]
    BidirectionalAStar,
    #[value(name = "jps")]
    JumpPointSearch,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Dijkstra,
        Algorithm::AStar,
        Algorithm::BidirectionalAStar,
        Algorithm::JumpPointSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::AStar => "A*",
            Algorithm::BidirectionalAStar => "Bidirectional A*",
            Algorithm::JumpPointSearch => "Jump Point Search",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Performance figures of one solve
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Metrics {
    /// Number of cells on the path, start and goal included
    pub path_length: usize,
    /// Number of cells the search closed
    pub nodes_explored: usize,
    /// Search time in microseconds, or [Metrics::FAULTED]
    pub elapsed_us: i64,
}

impl Metrics {
    /// Elapsed-time marker of a solve that crashed
    pub const FAULTED: i64 = -1;

    /// Human-readable search time: µs below one millisecond, ms above.
    ///
    /// ```
    /// use maze_race::Metrics;
    ///
    /// let metrics = Metrics { elapsed_us: 2500, ..Default::default() };
    /// assert_eq!(metrics.time_label(), "2.500 ms");
    /// ```
    pub fn time_label(&self) -> String {
        match self.elapsed_us {
            Self::FAULTED => "FAILED".to_string(),
            us if us < 1000 => format!("{} μs", us),
            us => format!("{:.3} ms", us as f64 / 1000.0),
        }
    }
}

/// Outcome of one solve
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct AlgorithmResult {
    /// Cell-by-cell path from start to goal; empty when unsolved
    pub path: Vec<Point>,
    /// Cells in the order the search closed them
    pub visited_order: Vec<Point>,
    pub success: bool,
    pub metrics: Metrics,
}

impl AlgorithmResult {
    /// Result of a solve that crashed
    pub fn faulted() -> Self {
        Self {
            metrics: Metrics {
                elapsed_us: Metrics::FAULTED,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Assemble the result once the main loop has stopped.
    ///
    /// `path` runs only when the goal was reached, so reconstruction stays
    /// outside the measured time.
    pub(crate) fn conclude(
        outcome: Outcome,
        visited_order: Vec<Point>,
        elapsed: Duration,
        path: impl FnOnce(usize) -> Vec<Point>,
    ) -> Self {
        let elapsed_us = i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX).max(1);
        let path = match outcome {
            Outcome::Reached(idx) => path(idx),
            Outcome::Exhausted => Vec::new(),
            Outcome::TimedOut => {
                warn!("Search gave up after {} μs", elapsed_us);
                Vec::new()
            }
        };
        Self {
            success: !path.is_empty(),
            metrics: Metrics {
                path_length: path.len(),
                nodes_explored: visited_order.len(),
                elapsed_us,
            },
            path,
            visited_order,
        }
    }
}

/// Why a search loop stopped
pub(crate) enum Outcome {
    /// Goal (or meeting cell) found at this index
    Reached(usize),
    Exhausted,
    TimedOut,
}

/// Observation point of a running search
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StepEvent {
    /// Cell was closed
    Visit(Point),
    /// Cell entered the frontier, or re-entered it with a lower cost
    Frontier(Point),
}

/// Receiver of search events
///
/// Called synchronously on the solving thread. Implementations may block
/// (to pace an animation) but have no access to the grid.
pub trait StepSink {
    fn on_visit(&mut self, cell: &Cell);

    fn on_frontier(&mut self, cell: &Cell);

    /// Whether someone is watching; observed solves get [OBSERVED_BUDGET]
    fn is_observing(&self) -> bool {
        true
    }
}

/// Sink that ignores everything
pub struct NoSink;

impl StepSink for NoSink {
    fn on_visit(&mut self, _cell: &Cell) {}

    fn on_frontier(&mut self, _cell: &Cell) {}

    fn is_observing(&self) -> bool {
        false
    }
}

/// Records events for later replay
impl StepSink for Vec<StepEvent> {
    fn on_visit(&mut self, cell: &Cell) {
        self.push(StepEvent::Visit(cell.pos()));
    }

    fn on_frontier(&mut self, cell: &Cell) {
        self.push(StepEvent::Frontier(cell.pos()));
    }
}

/// Forwards events to `inner`, sleeping `delay` after each one
pub struct Paced<S> {
    inner: S,
    delay: Duration,
}

impl<S: StepSink> Paced<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: StepSink> StepSink for Paced<S> {
    fn on_visit(&mut self, cell: &Cell) {
        self.inner.on_visit(cell);
        thread::sleep(self.delay);
    }

    fn on_frontier(&mut self, cell: &Cell) {
        self.inner.on_frontier(cell);
        thread::sleep(self.delay);
    }
}

/// Time budget of one search loop, checked once per iteration
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Manhattan (L1) distance; admissible and consistent on a 4-connected
/// uniform-cost grid.
#[inline]
pub fn manhattan(a: Point, b: Point) -> u32 {
    (a.x.abs_diff(b.x) + a.y.abs_diff(b.y)) as u32
}

/// Follow parent links from `end` back to the search origin.
///
/// Returns the chain in origin-to-`end` order. Parent links never form a
/// cycle; the walk is capped at the cell count all the same.
pub fn reconstruct_path(grid: &Grid, end: usize) -> Vec<Point> {
    let mut path: Vec<Point> = std::iter::successors(Some(end), |&idx| grid.cell(idx).parent)
        .take(grid.cells().len())
        .map(|idx| grid.point_of(idx))
        .collect();
    path.reverse();
    path
}

/// Solve the grid between its start and goal.
///
/// The time budget is [OBSERVED_BUDGET] when `sink` is observing and
/// [UNATTENDED_BUDGET] otherwise.
pub fn solve(
    algorithm: Algorithm,
    grid: &mut Grid,
    sink: Option<&mut dyn StepSink>,
) -> AlgorithmResult {
    let budget = match &sink {
        Some(s) if s.is_observing() => OBSERVED_BUDGET,
        _ => UNATTENDED_BUDGET,
    };
    solve_within(algorithm, grid, sink, budget)
}

/// [solve] with an explicit time budget
pub fn solve_within(
    algorithm: Algorithm,
    grid: &mut Grid,
    sink: Option<&mut dyn StepSink>,
    budget: Duration,
) -> AlgorithmResult {
    let mut no_sink = NoSink;
    let sink: &mut dyn StepSink = match sink {
        Some(s) => s,
        None => &mut no_sink,
    };

    grid.reset_for_solve();
    let result = match algorithm {
        Algorithm::Dijkstra => best_first::dijkstra(grid, sink, budget),
        Algorithm::AStar => best_first::astar(grid, sink, budget),
        Algorithm::BidirectionalAStar => bidirectional::bidirectional_astar(grid, sink, budget),
        Algorithm::JumpPointSearch => jps::jump_point_search(grid, sink, budget),
    };

    debug!(
        "{}: success={} path={} explored={} time={}",
        algorithm,
        result.success,
        result.metrics.path_length,
        result.metrics.nodes_explored,
        result.metrics.time_label()
    );
    result
}

/// Start and goal indices, if both lie inside the grid
pub(crate) fn endpoints(grid: &Grid) -> Option<(usize, usize)> {
    Some((grid.index_of(grid.start())?, grid.index_of(grid.goal())?))
}

/// Priority queue of cell indices, cheapest key first.
///
/// Entries are never updated in place: a cheaper re-insertion leaves the
/// old entry behind, and the caller skips it on pop once the cell is
/// closed. Equal keys pop in insertion order.
#[derive(Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    pushed: u64,
}

impl OpenSet {
    pub(crate) fn push(&mut self, idx: usize, key: u32) {
        self.heap.push(OpenEntry {
            key,
            seq: self.pushed,
            idx,
        });
        self.pushed += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|entry| entry.idx)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(PartialEq, Eq)]
struct OpenEntry {
    key: u32,
    seq: u64,
    idx: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
