//! `selsync page` and `selsync toggle`.
//!
//! Both commands build an engine (restoring the persisted selection), load
//! one page with the requested controls, and print the page table followed
//! by the chart. `toggle` flips each id in order between the two.

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use selection_sync_core::engine::{FetchOutcome, SyncEngine};
use selection_sync_core::events::SyncObserver;

use crate::app;
use crate::config::Config;
use crate::render;

/// Page controls shared by the page-oriented commands.
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Full-text search term. Empty matches everything.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Records per page. Defaults to `[paging] page_size`. Zero or less
    /// disables fetching.
    #[arg(long, allow_negative_numbers = true)]
    pub page_size: Option<i64>,
}

pub async fn run_page(
    config: &Config,
    observer: Arc<dyn SyncObserver>,
    args: &PageArgs,
) -> Result<()> {
    let mut engine = app::build_engine(config, observer)?;
    load_page(&mut engine, config, args).await?;
    print_state(&engine);
    Ok(())
}

pub async fn run_toggle(
    config: &Config,
    observer: Arc<dyn SyncObserver>,
    args: &PageArgs,
    ids: &[i64],
) -> Result<()> {
    let mut engine = app::build_engine(config, observer)?;
    load_page(&mut engine, config, args).await?;

    for &id in ids {
        match engine.toggle(id) {
            Ok(true) => println!("selected {}", id),
            Ok(false) => println!("deselected {}", id),
            Err(e) => eprintln!("Warning: skipping {}: {}", id, e),
        }
    }
    println!();
    print_state(&engine);
    Ok(())
}

/// Point the engine at the requested page and wait for it.
///
/// Returns `false` when the page size suppresses fetching.
pub async fn load_page(
    engine: &mut SyncEngine,
    config: &Config,
    args: &PageArgs,
) -> Result<bool> {
    let page_size = args.page_size.unwrap_or(config.paging.page_size);
    let Some(ticket) = engine.set_query(args.page, page_size, args.search.clone()) else {
        eprintln!("Page size {} disables fetching; nothing loaded.", page_size);
        return Ok(false);
    };

    let source = engine.source();
    let result = source.fetch_page(ticket.query()).await;
    match engine.complete_fetch(ticket, result) {
        FetchOutcome::Loaded => Ok(true),
        FetchOutcome::Failed(e) => Err(e)
            .with_context(|| format!("Failed to load page {} from {}", args.page, source.name())),
        FetchOutcome::Stale => bail!("response for page {} was superseded", args.page),
    }
}

fn print_state(engine: &SyncEngine) {
    let selection = engine.selection();
    print!(
        "{}",
        render::page_table(engine.records(), |id| selection.contains(id), engine.page_state())
    );
    println!();
    print!("{}", render::chart_text(engine.chart()));
}
