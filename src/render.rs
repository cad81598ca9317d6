//! Plain-text rendering of pages, selections and charts.
//!
//! All functions return `String` so callers decide where output goes. The
//! page table abbreviates long fields the same way the record grid does:
//! titles past 20 characters and bodies past 50 are cut and suffixed with
//! `...`.

use selection_sync_core::chart::ChartSeries;
use selection_sync_core::models::{PageState, Record};

pub const TITLE_WIDTH: usize = 20;
pub const BODY_WIDTH: usize = 50;
const BAR_WIDTH: usize = 40;

/// Cut `text` to `max` characters, appending `...` when anything was cut.
/// Line breaks are flattened to spaces first.
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Page table with a checkbox column, followed by a `page N of M` footer.
pub fn page_table(
    records: &[Record],
    is_selected: impl Fn(i64) -> bool,
    page: &PageState,
) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No records.\n");
    } else {
        let id_width = records
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(2)
            .max(2);
        out.push_str(&format!(
            "    {:>w$}  {:<tw$}  {}\n",
            "ID",
            "TITLE",
            "BODY",
            w = id_width,
            tw = TITLE_WIDTH + 3
        ));
        for record in records {
            let mark = if is_selected(record.id) { "[x]" } else { "[ ]" };
            out.push_str(&format!(
                "{} {:>w$}  {:<tw$}  {}\n",
                mark,
                record.id,
                truncate(&record.title, TITLE_WIDTH),
                truncate(&record.body, BODY_WIDTH),
                w = id_width,
                tw = TITLE_WIDTH + 3
            ));
        }
    }
    out.push_str(&page_footer(page));
    out
}

pub fn page_footer(page: &PageState) -> String {
    let mut line = format!("page {} of {}", page.current_page, page.total_pages);
    if !page.search_term.is_empty() {
        line.push_str(&format!("  search {:?}", page.search_term));
    }
    line.push('\n');
    line
}

/// One line per selected record, in selection order.
pub fn selection_list(selection: &[Record]) -> String {
    if selection.is_empty() {
        return "No records selected.\n".to_string();
    }
    let mut out = format!("{} selected:\n", selection.len());
    for record in selection {
        out.push_str(&format!(
            "  {:>4}  {}\n",
            record.id,
            truncate(&record.title, TITLE_WIDTH)
        ));
    }
    out
}

/// Horizontal bar chart: bar length scales with the id value.
pub fn chart_text(chart: &ChartSeries) -> String {
    if chart.is_empty() {
        return "Chart is empty.\n".to_string();
    }
    let max = chart.y.iter().copied().max().unwrap_or(1).max(1);
    let mut out = String::new();
    for entry in chart.entries() {
        let len = if entry.id <= 0 {
            0
        } else {
            ((entry.id as f64 / max as f64) * BAR_WIDTH as f64).ceil() as usize
        };
        out.push_str(&format!(
            "{:<tw$}  {}  {:<8}  {}\n",
            truncate(entry.title, TITLE_WIDTH),
            entry.color,
            entry.hover_text,
            "█".repeat(len.max(1)),
            tw = TITLE_WIDTH + 3
        ));
    }
    out
}
