//! `selsync interactive`: a line-oriented session over stdin.
//!
//! Each input line is one command:
//!
//! | Line | Effect |
//! |------|--------|
//! | `page N` | load page N |
//! | `search TERM` | filter by TERM and return to page 1 (`search` alone clears) |
//! | `size N` | change records per page |
//! | `toggle ID` | flip selection of ID |
//! | `reload` | fetch the current page again |
//! | `show` | print the current page |
//! | `chart` | print the chart |
//! | `quit` | leave |
//!
//! Commands go through the async [`session`](crate::session), so a toggle
//! typed while a page is still loading is applied immediately.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use selection_sync_core::events::SyncObserver;

use crate::app;
use crate::config::Config;
use crate::render;
use crate::session::{self, SessionHandle, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Page(u32),
    Search(String),
    Size(i64),
    Toggle(i64),
    Reload,
    Show,
    Chart,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(input: &str) -> Result<Option<Line>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (input, ""),
    };

    let line = match word.to_ascii_lowercase().as_str() {
        "page" | "p" => Line::Page(parse_number(rest, "page")?),
        "search" | "s" => Line::Search(rest.to_string()),
        "size" => Line::Size(parse_number(rest, "size")?),
        "toggle" | "t" => Line::Toggle(parse_number(rest, "toggle")?),
        "reload" | "r" => Line::Reload,
        "show" => Line::Show,
        "chart" | "c" => Line::Chart,
        "help" | "?" => Line::Help,
        "quit" | "exit" | "q" => Line::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(Some(line))
}

fn parse_number<T: std::str::FromStr>(arg: &str, command: &str) -> Result<T, String> {
    arg.parse()
        .map_err(|_| format!("'{}' needs a number, got '{}'", command, arg))
}

const HELP: &str = "\
commands:
  page N        load page N
  search TERM   filter records (empty clears)
  size N        records per page
  toggle ID     select or deselect a record
  reload        fetch the current page again
  show          print the current page
  chart         print the chart
  quit          leave";

pub async fn run_interactive(config: &Config, observer: Arc<dyn SyncObserver>) -> Result<()> {
    let engine = app::build_engine(config, observer)?;
    let session = session::spawn(engine);

    session.reload().await?;
    print_page(&session.settled().await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines.next_line().await? {
        let line = match parse_line(&input) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        if !dispatch(&session, line).await? {
            break;
        }
    }
    Ok(())
}

/// Handle one command. Returns `false` on quit.
async fn dispatch(session: &SessionHandle, line: Line) -> Result<bool> {
    match line {
        Line::Page(page) => {
            session.set_page(page).await?;
            print_page(&session.settled().await?);
        }
        Line::Search(term) => {
            session.search(term).await?;
            print_page(&session.settled().await?);
        }
        Line::Size(size) => {
            session.set_page_size(size).await?;
            print_page(&session.settled().await?);
        }
        Line::Reload => {
            session.reload().await?;
            print_page(&session.settled().await?);
        }
        Line::Toggle(id) => match session.toggle(id).await? {
            Ok(true) => println!("selected {}", id),
            Ok(false) => println!("deselected {}", id),
            Err(e) => eprintln!("{}", e),
        },
        Line::Show => print_page(&session.snapshot()),
        Line::Chart => print!("{}", render::chart_text(&session.snapshot().chart)),
        Line::Help => println!("{}", HELP),
        Line::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_page(snapshot: &SessionSnapshot) {
    print!(
        "{}",
        render::page_table(&snapshot.records, |id| snapshot.is_selected(id), &snapshot.page)
    );
}
