//! Dijkstra and A*: best-first search that differ only in the ordering key.

use std::time::Duration;

use crate::grid::{Grid, Point};
use crate::search::{
    endpoints, manhattan, reconstruct_path, AlgorithmResult, Deadline, OpenSet, Outcome, StepSink,
};

/// Uniform-cost search, ordered by accumulated cost alone
pub(crate) fn dijkstra(
    grid: &mut Grid,
    sink: &mut dyn StepSink,
    budget: Duration,
) -> AlgorithmResult {
    best_first(grid, sink, budget, false)
}

/// Ordered by accumulated cost plus Manhattan distance to the goal
pub(crate) fn astar(grid: &mut Grid, sink: &mut dyn StepSink, budget: Duration) -> AlgorithmResult {
    best_first(grid, sink, budget, true)
}

fn best_first(
    grid: &mut Grid,
    sink: &mut dyn StepSink,
    budget: Duration,
    guided: bool,
) -> AlgorithmResult {
    let Some((start_idx, goal_idx)) = endpoints(grid) else {
        return AlgorithmResult::default();
    };
    let goal = grid.goal();
    let estimate = |p: Point| if guided { manhattan(p, goal) } else { 0 };

    let start = grid.cell_mut(start_idx);
    start.g_cost = 0;
    start.h_cost = estimate(start.pos());
    let mut open = OpenSet::default();
    open.push(start_idx, start.f_cost());

    let mut visited_order = Vec::new();
    let mut nbuf: Vec<Point> = Vec::with_capacity(4);
    let deadline = Deadline::start(budget);

    let outcome = loop {
        if deadline.expired() {
            break Outcome::TimedOut;
        }
        let Some(ci) = open.pop() else {
            break Outcome::Exhausted;
        };

        // Stale entry of an already settled cell
        if grid.cell(ci).search_closed {
            continue;
        }
        grid.cell_mut(ci).search_closed = true;
        let current = grid.point_of(ci);
        visited_order.push(current);
        sink.on_visit(grid.cell(ci));

        if ci == goal_idx {
            break Outcome::Reached(ci);
        }

        let tentative_g = grid.cell(ci).g_cost + 1;
        nbuf.clear();
        nbuf.extend(grid.navigable_neighbors(current));

        for &np in nbuf.iter() {
            let Some(ni) = grid.index_of(np) else {
                continue;
            };
            let n = grid.cell_mut(ni);
            if n.search_closed || tentative_g >= n.g_cost {
                continue;
            }
            n.g_cost = tentative_g;
            n.h_cost = estimate(np);
            n.parent = Some(ci);
            open.push(ni, n.f_cost());
            sink.on_frontier(grid.cell(ni));
        }
    };

    let elapsed = deadline.elapsed();
    AlgorithmResult::conclude(outcome, visited_order, elapsed, |idx| {
        reconstruct_path(grid, idx)
    })
}
