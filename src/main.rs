//! CLI for maze solving

use std::time::Duration;

use clap::Parser;
use itertools::Itertools;
use maze_race::{
    validate_path, Algorithm, AlgorithmResult, CarveOrder, Cell, Grid, Paced, RobustMetrics,
    Session, StepSink,
};

/// Generate a perfect maze and race shortest-path algorithms through it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width, rounded up to an odd number
    #[arg(long, default_value_t = 21)]
    width: usize,

    /// Maze height, rounded up to an odd number
    #[arg(long, default_value_t = 21)]
    height: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Algorithm to run. All of them are compared when omitted.
    #[arg(short, long, value_enum)]
    algorithm: Option<Algorithm>,

    /// Repeat each solve this many times and report timing statistics
    #[arg(short, long)]
    runs: Option<usize>,

    /// Time budget of a single solve in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Animate the search on the terminal (requires --algorithm)
    #[arg(short, long, requires = "algorithm")]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 20)]
    frame_length: u64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Generate the maze, solve it, print the report
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let order = match args.seed {
        Some(seed) => CarveOrder::Seeded(seed),
        None => CarveOrder::Random,
    };
    let mut session = Session::new(args.width, args.height, order)?;
    session.set_budget(args.budget_ms.map(Duration::from_millis));

    println!("{}", session.grid());

    let algorithms = match args.algorithm {
        Some(algorithm) => vec![algorithm],
        None => Algorithm::ALL.to_vec(),
    };

    if let Some(runs) = args.runs {
        for algorithm in algorithms {
            let metrics = session.benchmark(algorithm, runs);
            print_robust_metrics(algorithm, &metrics);
        }
        return Ok(());
    }

    match args.algorithm {
        Some(algorithm) if args.playback => {
            let view = TerminalView::new(session.grid());
            let mut paced = Paced::new(view, Duration::from_millis(args.frame_length));
            let mut result = session.solve(algorithm, Some(&mut paced));
            if result.success && !validate_path(session.grid(), &result.path) {
                result.success = false;
            }
            print_metrics(algorithm, &result);
            print_path(&mut session, &result);
        }
        Some(algorithm) => {
            let result = session.solve_safely(algorithm);
            print_metrics(algorithm, &result);
            print_path(&mut session, &result);
        }
        None => {
            let comparison = session.compare_all();
            for (algorithm, result) in &comparison.results {
                print_metrics(*algorithm, result);
            }
            println!("\nPERFORMANCE COMPARISON");
            println!("{}", comparison_table(&comparison.results));
            if let Some((algorithm, result)) = comparison.fastest() {
                println!("\nFastest: {}", algorithm);
                print_path(&mut session, result);
            }
        }
    }
    Ok(())
}

fn print_metrics(algorithm: Algorithm, result: &AlgorithmResult) {
    println!("\n===== {} =====", algorithm);
    println!("Path length: {}", result.metrics.path_length);
    println!("Nodes explored: {}", result.metrics.nodes_explored);
    println!("Time: {}", result.metrics.time_label());
    println!("Success: {}", if result.success { "yes" } else { "no" });
}

/// Aligned table of one row per algorithm
fn comparison_table(results: &[(Algorithm, AlgorithmResult)]) -> String {
    let header = format!(
        "{:<20}{:<13}{:<16}{:<13}{}",
        "Algorithm", "Path length", "Nodes explored", "Time", "Success"
    );
    let rows = results.iter().map(|(algorithm, result)| {
        format!(
            "{:<20}{:<13}{:<16}{:<13}{}",
            algorithm.name(),
            result.metrics.path_length,
            result.metrics.nodes_explored,
            result.metrics.time_label(),
            if result.success { "yes" } else { "no" }
        )
    });
    [header, "-".repeat(69)].into_iter().chain(rows).join("\n")
}

fn print_robust_metrics(algorithm: Algorithm, metrics: &RobustMetrics) {
    println!("\n===== {} (robust analysis) =====", algorithm);
    println!(
        "Successful runs: {}/{}",
        metrics.successful_runs, metrics.total_runs
    );
    if metrics.successful_runs == 0 {
        println!("No successful runs!");
        return;
    }
    println!("Best time: {} μs", metrics.best_us);
    println!("Worst time: {} μs", metrics.worst_us);
    println!("Average time: {} μs", metrics.average_us);
    println!("Median time: {} μs", metrics.median_us);
    println!("Std deviation: {:.2} μs", metrics.std_dev_us);
}

fn print_path(session: &mut Session, result: &AlgorithmResult) {
    if result.success {
        println!("\n{}", session.render_path(&result.path));
    } else {
        println!("No valid path found!");
    }
}

/// Redraws the maze on every search event
struct TerminalView {
    squares: Vec<Vec<char>>,
}

impl TerminalView {
    const S_VISITED: char = '+';
    const S_FRONTIER: char = 'o';
    const S_OPEN: char = ' ';

    fn new(grid: &Grid) -> Self {
        Self {
            squares: grid
                .to_ascii()
                .lines()
                .map(|row| row.chars().collect())
                .collect(),
        }
    }

    fn paint(&mut self, cell: &Cell, symbol: char) {
        let square = &mut self.squares[cell.y][cell.x];
        if *square == Self::S_OPEN || *square == Self::S_FRONTIER {
            *square = symbol;
        }
        print!("\x1B[2J\x1B[1;1H");
        println!("{}", self.squares.iter().map(|row| row.iter().join("")).join("\n"));
    }
}

impl StepSink for TerminalView {
    fn on_visit(&mut self, cell: &Cell) {
        self.paint(cell, Self::S_VISITED);
    }

    fn on_frontier(&mut self, cell: &Cell) {
        self.paint(cell, Self::S_FRONTIER);
    }
}

#[cfg(test)]
mod tests {
    use maze_race::{Algorithm, AlgorithmResult, Metrics};

    use crate::comparison_table;

    #[test]
    fn comparison_table_has_a_row_per_algorithm() {
        let solved = AlgorithmResult {
            success: true,
            metrics: Metrics {
                path_length: 13,
                nodes_explored: 20,
                elapsed_us: 1500,
            },
            ..Default::default()
        };
        let results = vec![
            (Algorithm::Dijkstra, solved),
            (Algorithm::JumpPointSearch, AlgorithmResult::faulted()),
        ];

        let table = comparison_table(&results);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Algorithm           Path length"));
        assert_eq!(lines[1], "-".repeat(69));
        assert_eq!(
            lines[2],
            "Dijkstra            13           20              1.500 ms     yes"
        );
        assert!(lines[3].starts_with("Jump Point Search   0"));
        assert!(lines[3].contains("FAILED"));
        assert!(lines[3].ends_with("no"));
    }
}
