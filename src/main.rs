//! # Selection Sync CLI (`selsync`)
//!
//! Browse a paginated record API, pick records, and chart the selection.
//! The selection survives between runs in a JSON file.
//!
//! ## Usage
//!
//! ```bash
//! selsync --config ./config/selsync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `selsync page` | Fetch a page and print it with the current selection |
//! | `selsync toggle <ID>...` | Select or deselect records on a page |
//! | `selsync selection` | List the persisted selection |
//! | `selsync chart` | Print the chart of the persisted selection |
//! | `selsync interactive` | Line-oriented session over stdin |
//! | `selsync completions <SHELL>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # First page; the first run pre-selects the records shown
//! selsync page
//!
//! # Page 3 of the records matching "qui", ten per page
//! selsync page --page 3 --search qui --page-size 10
//!
//! # Deselect 2, select 7 from page 2
//! selsync toggle 2 7 --page 2
//!
//! # Plotly trace for the selection
//! selsync chart --format json > trace.json
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use selection_sync::observer::EventMode;
use selection_sync::page_cmd::{self, PageArgs};
use selection_sync::selection_cmd::{self, ChartFormat};
use selection_sync::{config, interactive};

/// Selection Sync: keep a chart in step with records picked from a
/// paginated API.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/selsync.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "selsync",
    about = "Pick records from a paginated API and chart the selection",
    version,
    long_about = "Selection Sync fetches pages of records from a JSON API, keeps a \
    selection that survives paging, searching and restarts, and derives a bar chart \
    from it incrementally so existing bars keep their colors."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/selsync.toml`. A missing file means all
    /// defaults.
    #[arg(long, global = true, default_value = "./config/selsync.toml")]
    config: PathBuf,

    /// Engine event output on stderr. Defaults to `human` on a terminal,
    /// otherwise `off`.
    #[arg(long, global = true, value_enum)]
    events: Option<EventMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and print it.
    ///
    /// Selected rows are marked `[x]`. The chart for the whole selection
    /// follows the table.
    Page {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Select or deselect records.
    ///
    /// Loads the page first. An id that is not selected must be on that
    /// page; a selected id can be deselected from any page.
    Toggle {
        /// Record ids to flip, applied in order.
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List the persisted selection.
    Selection,

    /// Print the chart of the persisted selection.
    Chart {
        /// `table` for text bars, `json` for a Plotly bar trace.
        #[arg(long, value_enum, default_value = "table")]
        format: ChartFormat,
    },

    /// Start a line-oriented session over stdin.
    ///
    /// Type `help` for the command list.
    Interactive,

    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "selsync", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    let observer = cli
        .events
        .unwrap_or_else(EventMode::default_for_tty)
        .observer();

    match cli.command {
        Commands::Page { page } => {
            page_cmd::run_page(&cfg, observer, &page).await?;
        }
        Commands::Toggle { ids, page } => {
            page_cmd::run_toggle(&cfg, observer, &page, &ids).await?;
        }
        Commands::Selection => {
            selection_cmd::run_selection(&cfg)?;
        }
        Commands::Chart { format } => {
            selection_cmd::run_chart(&cfg, format)?;
        }
        Commands::Interactive => {
            interactive::run_interactive(&cfg, observer).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
