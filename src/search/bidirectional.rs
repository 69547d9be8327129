//! Bidirectional A*: one frontier grows from the start towards the goal,
//! another from the goal towards the start, and the search stops at the
//! first cell both have closed.
//!
//! First contact does not prove the joined path is the shortest one. On a
//! perfect maze there is only one path, so the distinction never shows.

use std::iter;
use std::time::Duration;

use crate::grid::{Grid, Point, UNSEEN};
use crate::search::{endpoints, manhattan, AlgorithmResult, Deadline, OpenSet, Outcome, StepSink};

/// Search state of one direction
struct Frontier {
    target: Point,
    open: OpenSet,
    g: Vec<u32>,
    parent: Vec<Option<usize>>,
    closed: Vec<bool>,
}

impl Frontier {
    fn new(grid: &Grid, origin_idx: usize, target: Point) -> Self {
        let len = grid.cells().len();
        let mut frontier = Self {
            target,
            open: OpenSet::default(),
            g: vec![UNSEEN; len],
            parent: vec![None; len],
            closed: vec![false; len],
        };
        frontier.g[origin_idx] = 0;
        frontier
            .open
            .push(origin_idx, manhattan(grid.point_of(origin_idx), target));
        frontier
    }

    /// Pop and close the cheapest cell not yet closed by this side.
    ///
    /// The visit is reported only if the other side has not closed the cell
    /// already, so the meeting cell shows up once.
    fn close_next(
        &mut self,
        grid: &mut Grid,
        sink: &mut dyn StepSink,
        visited_order: &mut Vec<Point>,
    ) -> Option<usize> {
        let ci = loop {
            let ci = self.open.pop()?;
            if !self.closed[ci] {
                break ci;
            }
        };
        self.closed[ci] = true;
        if !grid.cell(ci).search_closed {
            grid.cell_mut(ci).search_closed = true;
            visited_order.push(grid.point_of(ci));
            sink.on_visit(grid.cell(ci));
        }
        Some(ci)
    }

    fn expand(&mut self, grid: &Grid, sink: &mut dyn StepSink, ci: usize) {
        let tentative_g = self.g[ci] + 1;
        for np in grid.navigable_neighbors(grid.point_of(ci)) {
            let Some(ni) = grid.index_of(np) else {
                continue;
            };
            if self.closed[ni] || tentative_g >= self.g[ni] {
                continue;
            }
            self.g[ni] = tentative_g;
            self.parent[ni] = Some(ci);
            self.open.push(ni, tentative_g + manhattan(np, self.target));
            sink.on_frontier(grid.cell(ni));
        }
    }

    /// Parent chain starting at `from`, ending at this side's origin
    fn chain<'a>(
        &'a self,
        grid: &'a Grid,
        from: Option<usize>,
    ) -> impl Iterator<Item = Point> + 'a {
        iter::successors(from, |&idx| self.parent[idx])
            .take(self.parent.len())
            .map(|idx| grid.point_of(idx))
    }
}

pub(crate) fn bidirectional_astar(
    grid: &mut Grid,
    sink: &mut dyn StepSink,
    budget: Duration,
) -> AlgorithmResult {
    let Some((start_idx, goal_idx)) = endpoints(grid) else {
        return AlgorithmResult::default();
    };
    let (start, goal) = (grid.start(), grid.goal());

    let mut forward = Frontier::new(grid, start_idx, goal);
    let mut backward = Frontier::new(grid, goal_idx, start);
    let mut visited_order = Vec::new();
    let deadline = Deadline::start(budget);

    let outcome = loop {
        if deadline.expired() {
            break Outcome::TimedOut;
        }
        if forward.open.is_empty() && backward.open.is_empty() {
            break Outcome::Exhausted;
        }

        if let Some(ci) = forward.close_next(grid, sink, &mut visited_order) {
            if backward.closed[ci] || start_idx == goal_idx {
                break Outcome::Reached(ci);
            }
            forward.expand(grid, sink, ci);
        }

        if let Some(ci) = backward.close_next(grid, sink, &mut visited_order) {
            if forward.closed[ci] {
                break Outcome::Reached(ci);
            }
            backward.expand(grid, sink, ci);
        }
    };

    let elapsed = deadline.elapsed();
    AlgorithmResult::conclude(outcome, visited_order, elapsed, |meeting| {
        let mut path: Vec<Point> = forward.chain(grid, Some(meeting)).collect();
        path.reverse();
        path.extend(backward.chain(grid, backward.parent[meeting]));
        path
    })
}
