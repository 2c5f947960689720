use clap::Parser;

use crate::cmd::Commands;

/// Control-monitor dashboard over a synthetic in-memory task collection.
/// Every invocation regenerates the collection; --seed makes it repeatable.
#[derive(Parser)]
#[command(name = "cmon", version, about = "Control monitor dashboard CLI")]
pub struct Cli {
    /// Seed for the synthetic task generator.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of tasks to generate.
    #[arg(long, global = true, default_value_t = 100)]
    pub count: usize,

    #[command(subcommand)]
    pub command: Commands,
}
