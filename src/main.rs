//! Rubik's Cube Solver
//!
//! Scrambles a 3x3x3 cube and solves it layer by layer, either headlessly in
//! batches or in an interactive 3D viewer that animates every slice turn.

mod visualization;

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cubelets::notation::format_sequence;
use cubelets::{scramble, AnimationConfig, Cube, CubeError, Headless, MoveExecutor, Solver};

/// Scrambles and solves a 3x3x3 cube.
#[derive(Parser)]
#[command(name = "cubelets")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scramble and solve cubes without a window, then print a summary.
    Solve {
        /// Seed of the first scramble; later scrambles use the following seeds.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of cubes to scramble and solve.
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Scramble a cube and print the moves and the resulting net.
    Scramble {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Open a scrambled cube in the 3D viewer.
    Display {
        #[arg(long)]
        seed: Option<u64>,
        /// Duration of one animated quarter turn.
        #[arg(long, default_value_t = 300)]
        duration_ms: u64,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Solve { seed, count }) => run_solver(seed.unwrap_or_else(rand::random), count)
            .map(|summary| println!("{summary}")),
        Some(Command::Scramble { seed }) => run_scramble(seed.unwrap_or_else(rand::random)),
        Some(Command::Display { seed, duration_ms }) => {
            run_display(seed.unwrap_or_else(rand::random), duration_ms)
        }
        None => {
            // default: scramble and display
            run_display(rand::random(), 300)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Totals over a batch of solves.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    solved: u64,
    total_moves: usize,
    max_moves: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let average = self.total_moves as f64 / self.solved.max(1) as f64;
        write!(
            f,
            "Solved {} cubes, {average:.1} moves on average, {} at most",
            self.solved, self.max_moves
        )
    }
}

/// Scrambles a fresh cube with the given seed.
fn scrambled(seed: u64) -> Result<MoveExecutor<Headless>, CubeError> {
    let mut executor = MoveExecutor::new(Cube::solved(), Headless, AnimationConfig::instant());
    scramble(&mut executor, &mut StdRng::seed_from_u64(seed))?;
    Ok(executor)
}

/// Solves `count` scrambles seeded from `seed` upwards.
fn run_solver(seed: u64, count: u64) -> Result<BatchSummary, CubeError> {
    let mut summary = BatchSummary::default();
    for seed in seed..seed.saturating_add(count) {
        let mut executor = scrambled(seed)?;
        let report = Solver::new(&mut executor).solve()?;
        log::debug!("seed {seed}:\n{report}");

        summary.solved += 1;
        summary.total_moves += report.move_count();
        summary.max_moves = summary.max_moves.max(report.move_count());
    }
    Ok(summary)
}

/// Prints a scramble and the net it leaves behind.
fn run_scramble(seed: u64) -> Result<(), CubeError> {
    let executor = scrambled(seed)?;
    println!("Seed {seed}: {}", format_sequence(executor.history()));
    print!("{}", executor.cube().format_net()?);
    Ok(())
}

fn run_display(seed: u64, duration_ms: u64) -> Result<(), CubeError> {
    let (cube, _) = scrambled(seed)?.into_parts();
    let config = AnimationConfig {
        duration: Duration::from_millis(duration_ms),
        ..AnimationConfig::default()
    };
    println!("Seed {seed}. Controls: Space solve, U/D/F/B/L/R turn clockwise");
    visualization::display(cube, config)
}
