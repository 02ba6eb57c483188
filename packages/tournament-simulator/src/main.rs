//! Tournament simulator CLI - runs complete all-bot Bunco tournaments
//! in memory with every presentation delay removed.

mod metrics;
mod output;
mod simulator;
mod types;

use std::time::{Duration, Instant};

use clap::Parser;
use metrics::build_tournament_metrics;
use output::OutputWriter;
use simulator::{Simulator, TournamentResult};
use tracing::{info, warn};
use types::OutputFormat;

#[derive(Parser)]
#[command(name = "tournament-simulator")]
#[command(about = "Headless all-bot Bunco tournament simulator")]
struct Args {
    /// Number of tournaments to simulate
    #[arg(short, long, default_value = "1")]
    tournaments: u32,

    /// Players in the lobby before bot padding (rounded up to a multiple of 4, minimum 8)
    #[arg(short, long, default_value = "8")]
    players: usize,

    /// Rounds a player must win to take the tournament
    #[arg(long, default_value = "6")]
    target_rounds: u32,

    /// Base seed; tournament n uses seed + n
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a tournament after this many seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit structured JSON logs (filter from RUST_LOG) instead of the plain format
    #[arg(long)]
    json_logs: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,

    /// Compress output files
    #[arg(long)]
    compress: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Silent by default, only warnings and errors
    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    if args.json_logs {
        bunco_backend::telemetry::init_tracing();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if args.show_output {
        info!(
            tournaments = args.tournaments,
            players = args.players,
            target_rounds = args.target_rounds,
            "Starting tournament simulator"
        );
    }

    let mut output_writer = OutputWriter::new(&args.output_dir, &args.output_format, args.compress)?;
    let timeout = Duration::from_secs(args.timeout_secs);

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0;

    for n in 1..=args.tournaments {
        let tournament_start = Instant::now();
        let seed = match args.seed {
            Some(base) => base.wrapping_add(u64::from(n)),
            None => rand::random(),
        };

        let simulator = Simulator::new(seed, n, args.players, args.target_rounds, timeout);
        match simulator.simulate_tournament().await {
            Ok(result) => {
                let duration_ms = tournament_start.elapsed().as_secs_f64() * 1000.0;
                let metrics = build_tournament_metrics(n, args.tournaments, &result, duration_ms);
                if let Err(e) = output_writer.write_tournament(&metrics) {
                    warn!("Failed to write metrics for tournament {}: {}", n, e);
                }
                if args.verbose {
                    info!(
                        tournament = n,
                        rounds = result.results.rounds_completed,
                        winner = ?result.results.winner.as_ref().map(|w| &w.name),
                        "Tournament completed"
                    );
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!("Tournament {} failed: {}", n, e);
            }
        }
    }

    let elapsed = start.elapsed();
    let (jsonl_path, csv_path) = output_writer.output_paths();
    let jsonl_path = jsonl_path.cloned();
    let csv_path = csv_path.cloned();
    output_writer.finish()?;

    if args.show_output {
        if let Some(path) = jsonl_path {
            info!("Detailed results written to: {}", path.display());
        }
        if let Some(path) = csv_path {
            info!("Summary CSV written to: {}", path.display());
        }
        print_summary(&results, errors, elapsed, args.tournaments);
    }

    Ok(())
}

fn print_summary(results: &[TournamentResult], errors: u32, elapsed: Duration, total: u32) {
    println!("\n=== Simulation Summary ===");
    println!("Tournaments completed: {}/{}", results.len(), total);
    if errors > 0 {
        println!("Errors: {errors}");
    }
    println!("Total time: {elapsed:?}");
    if results.is_empty() {
        return;
    }
    println!("Average time per tournament: {:?}", elapsed / results.len() as u32);

    let timed_out = results.iter().filter(|r| r.timed_out).count();
    let rounds: u32 = results.iter().map(|r| r.results.rounds_completed).sum();
    let buncos: u32 = results
        .iter()
        .flat_map(|r| r.results.standings.iter())
        .map(|s| s.bunco_count)
        .sum();
    let winning_points: Vec<i64> = results
        .iter()
        .filter_map(|r| r.results.winner.as_ref())
        .map(|w| w.total_points)
        .collect();

    let n = results.len() as f64;
    println!("\n=== Results ===");
    println!("Timed out: {timed_out}");
    println!("Avg rounds per tournament: {:.1}", f64::from(rounds) / n);
    println!("Avg buncos per tournament: {:.1}", f64::from(buncos) / n);
    if let (Some(min), Some(max)) = (winning_points.iter().min(), winning_points.iter().max()) {
        let avg = winning_points.iter().sum::<i64>() as f64 / winning_points.len() as f64;
        println!("Winning points: avg={avg:.1}, min={min}, max={max}");
    }
}
