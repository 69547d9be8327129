//! Jump Point Search (JPS) on a 4-connected uniform-cost grid.
//!
//! Instead of pushing every neighbor, each expanded cell probes the four
//! cardinal directions and only adds the cell where a probe has to stop:
//! the goal, or a cell whose side opening was closed one step earlier (a
//! forced turn). Probes that hit a wall are dropped.
//!
//! Vertical probes also probe sideways from every cell they pass, so open
//! areas stay reachable. In a perfect maze corridors are one cell wide and
//! the side probes never add a jump point.

use std::time::Duration;

use crate::grid::{Direction, Grid, Point};
use crate::search::{
    endpoints, manhattan, reconstruct_path, AlgorithmResult, Deadline, OpenSet, Outcome, StepSink,
};

pub(crate) fn jump_point_search(
    grid: &mut Grid,
    sink: &mut dyn StepSink,
    budget: Duration,
) -> AlgorithmResult {
    let Some((start_idx, goal_idx)) = endpoints(grid) else {
        return AlgorithmResult::default();
    };
    let goal = grid.goal();

    let start = grid.cell_mut(start_idx);
    start.g_cost = 0;
    start.h_cost = manhattan(start.pos(), goal);
    let mut open = OpenSet::default();
    open.push(start_idx, start.f_cost());

    let mut visited_order = Vec::new();
    let deadline = Deadline::start(budget);

    let outcome = loop {
        if deadline.expired() {
            break Outcome::TimedOut;
        }
        let Some(ci) = open.pop() else {
            break Outcome::Exhausted;
        };
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

        let current_g = grid.cell(ci).g_cost;
        for dir in Direction::ALL {
            let Some(jp) = jump(grid, current, dir, goal) else {
                continue;
            };
            let Some(ji) = grid.index_of(jp) else {
                continue;
            };
            // Jump points are many cells apart; the edge costs the distance
            let tentative_g = current_g + manhattan(current, jp);
            let n = grid.cell_mut(ji);
            if n.search_closed || tentative_g >= n.g_cost {
                continue;
            }
            n.g_cost = tentative_g;
            n.h_cost = manhattan(jp, goal);
            n.parent = Some(ci);
            open.push(ji, n.f_cost());
            sink.on_frontier(grid.cell(ji));
        }
    };

    let elapsed = deadline.elapsed();
    AlgorithmResult::conclude(outcome, visited_order, elapsed, |idx| {
        interpolate_path(&reconstruct_path(grid, idx))
    })
}

/// Walk from `from` along `dir` until reaching a jump point.
///
/// Returns `None` when the walk runs into a wall or the grid edge first.
fn jump(grid: &Grid, from: Point, dir: Direction, goal: Point) -> Option<Point> {
    let mut prev = from;
    loop {
        let next = prev.step(dir, 1)?;
        if !grid.is_open(next) {
            return None;
        }
        if next == goal || has_forced_neighbor(grid, prev, next, dir) {
            return Some(next);
        }
        if dir.is_vertical()
            && dir
                .perpendicular()
                .into_iter()
                .any(|side| jump(grid, next, side, goal).is_some())
        {
            return Some(next);
        }
        prev = next;
    }
}

/// A side of `next` is open where the same side of `prev` was not
fn has_forced_neighbor(grid: &Grid, prev: Point, next: Point, dir: Direction) -> bool {
    let open_towards = |p: Point, side: Direction| p.step(side, 1).is_some_and(|n| grid.is_open(n));
    dir.perpendicular()
        .into_iter()
        .any(|side| open_towards(next, side) && !open_towards(prev, side))
}

/// Expand a chain of jump points into a step-by-step path.
///
/// Consecutive jump points always share a row or a column.
fn interpolate_path(jump_points: &[Point]) -> Vec<Point> {
    let mut path = Vec::new();
    for pair in jump_points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dir = if b.x > a.x {
            Direction::East
        } else if b.x < a.x {
            Direction::West
        } else if b.y > a.y {
            Direction::South
        } else {
            Direction::North
        };
        let mut c = a;
        for _ in 0..manhattan(a, b) {
            path.push(c);
            match c.step(dir, 1) {
                Some(n) => c = n,
                None => break,
            }
        }
    }
    path.extend(jump_points.last().copied());
    path
}

#[cfg(test)]
mod tests {
    use crate::grid::{Direction, Grid, Point};
    use crate::search::jps::{interpolate_path, jump};

    #[test]
    fn interpolation_fills_straight_segments() {
        let path = interpolate_path(&[Point::new(1, 1), Point::new(4, 1), Point::new(4, 3)]);
        assert_eq!(
            path,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 1),
                Point::new(4, 1),
                Point::new(4, 2),
                Point::new(4, 3),
            ]
        );
        assert_eq!(interpolate_path(&[Point::new(2, 2)]), vec![Point::new(2, 2)]);
        assert!(interpolate_path(&[]).is_empty());
    }

    #[test]
    fn jump_stops_at_forced_turn() {
        let grid = Grid::from_ascii(
            "
#######
#S    #
##### #
#E    #
#######"
                .trim(),
        )
        .unwrap();

        // Corner at (5, 1) opens to the south
        assert_eq!(
            jump(&grid, Point::new(1, 1), Direction::East, grid.goal()),
            Some(Point::new(5, 1))
        );
        assert_eq!(jump(&grid, Point::new(1, 1), Direction::South, grid.goal()), None);
        assert_eq!(
            jump(&grid, Point::new(5, 1), Direction::South, grid.goal()),
            Some(Point::new(5, 3))
        );
        assert_eq!(
            jump(&grid, Point::new(5, 3), Direction::West, grid.goal()),
            Some(Point::new(1, 3))
        );
    }
}
