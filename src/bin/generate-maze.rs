//! CLI for maze generation

use clap::Parser;
use maze_race::{CarveOrder, MazeGenerator};

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Generated maze height
    #[arg(long, default_value_t = 21)]
    height: usize,

    /// Generated maze width
    #[arg(long, default_value_t = 21)]
    width: usize,

    /// Random seed
    #[arg(long, conflicts_with = "fixed")]
    seed: Option<u64>,

    /// Carve in fixed direction order instead of randomly
    #[arg(long)]
    fixed: bool,
}

/// Generate a maze, print it
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let order = match (args.fixed, args.seed) {
        (true, _) => CarveOrder::Fixed,
        (false, Some(seed)) => CarveOrder::Seeded(seed),
        (false, None) => CarveOrder::Random,
    };
    let grid = MazeGenerator::with_order(order).generate_maze(args.width, args.height);
    print!("{}", grid.to_ascii());
    Ok(())
}
