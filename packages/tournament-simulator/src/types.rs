//! Shared types for the simulator.

use clap::ValueEnum;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per tournament plus the CSV summary.
    Jsonl,
    /// CSV summary only.
    Csv,
}
