//! # cmon - Control Monitor CLI
//!
//! A terminal dashboard for operational control tasks: PnL sign-offs,
//! trade-surveillance alerts, licensing checks and similar compliance
//! work items.
//!
//! All data is synthetic and lives in memory for the duration of one
//! invocation. There is no persistence layer and no backend; the generator
//! produces a fresh collection on every run, seeded for repeatability with
//! `--seed`.
//!
//! ## Quick start
//!
//! ```bash
//! # Launch the dashboard
//! cmon ui
//!
//! # List outstanding critical tasks due this week
//! cmon list --status outstanding --priority critical --due-within 7
//!
//! # View one task in full
//! cmon --seed 42 view 167180
//!
//! # Tab counts and a JSON dump of the collection
//! cmon stats
//! cmon export --output tasks.json
//! ```
//!
//! ## Dashboard keys
//!
//! Space multi-selects tasks, `s` opens the sign-off dialog over the
//! selection, `f` opens the filter sheet, `/` searches, Tab cycles the
//! status tabs, `a`/`e`/`d` add, edit and delete.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod fields;
pub mod filter;
pub mod generate;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod form;
    pub mod input;
    pub mod run;
    pub mod signoff;
    pub mod utils;
}

use chrono::Local;
use cli::Cli;
use cmd::Commands;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no task collection.
    if let Commands::Completions { shell } = cli.command {
        cmd::cmd_completions(shell);
        return;
    }

    let mut rng = generate::rng_from_seed(cli.seed);
    let tasks = generate::generate_tasks(cli.count, Local::now(), &mut rng);
    let mut store = TaskStore::new(tasks);

    match cli.command {
        Commands::Completions { .. } => unreachable!("handled above"),
        Commands::Ui => cmd::cmd_ui(store),
        Commands::List {
            status,
            category,
            subcategory,
            priority,
            team_view,
            search,
            due_within,
            limit,
        } => cmd::cmd_list(
            &mut store, status, category, subcategory, priority, team_view, search, due_within,
            limit,
        ),
        Commands::View { id } => cmd::cmd_view(&store, &id),
        Commands::Stats => cmd::cmd_stats(&store),
        Commands::Export { output } => cmd::cmd_export(&store, output),
    }
}
