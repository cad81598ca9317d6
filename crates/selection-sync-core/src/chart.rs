//! Incremental chart derivation from selection changes.
//!
//! A [`ChartSeries`] holds four index-aligned sequences (titles, ids,
//! colors, hover texts) describing the selected records in selection order.
//! The series is updated one record at a time with [`derive_on_add`] and
//! [`derive_on_remove`] so that entries whose membership did not change keep
//! the color they were first assigned. [`rebuild_full`] recolors everything
//! and is reserved for bulk reconciliation such as restoring a persisted
//! selection at startup.
//!
//! # Plot export
//!
//! [`ChartSeries::to_plotly_trace`] renders the series as a Plotly bar trace:
//!
//! ```json
//! {
//!   "type": "bar",
//!   "x": ["sunt aut facere", "qui est esse"],
//!   "y": [1, 2],
//!   "marker": { "color": ["#1F77B4", "#FF7F0E"],
//!               "line": { "color": "rgba(255, 255, 255, 0.7)", "width": 1.5 } },
//!   "hoverinfo": "y+text",
//!   "hovertext": ["ID: 1", "ID: 2"]
//! }
//! ```

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Outline drawn around every bar.
pub const BAR_OUTLINE_COLOR: &str = "rgba(255, 255, 255, 0.7)";
pub const BAR_OUTLINE_WIDTH: f64 = 1.5;

/// An opaque `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of bar colors.
///
/// No uniqueness guarantee is required; generators only need to produce
/// colors that are distinct enough in practice.
pub trait ColorGenerator: Send {
    fn next_color(&mut self) -> Color;
}

/// Uniformly random `#RRGGBB` colors.
#[derive(Debug, Default)]
pub struct RandomColors;

impl ColorGenerator for RandomColors {
    fn next_color(&mut self) -> Color {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let mut rng = rand::rng();
        let mut color = String::with_capacity(7);
        color.push('#');
        for _ in 0..6 {
            color.push(HEX[rng.random_range(0..16)] as char);
        }
        Color(color)
    }
}

/// Cycles through a fixed palette. Deterministic.
#[derive(Debug, Clone)]
pub struct PaletteColors {
    palette: Vec<Color>,
    next: usize,
}

impl PaletteColors {
    /// Ten-color categorical palette.
    pub fn categorical() -> Self {
        Self::new(
            [
                "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2",
                "#7F7F7F", "#BCBD22", "#17BECF",
            ]
            .into_iter()
            .map(Color::new)
            .collect(),
        )
    }

    /// A palette cycling through `palette`; falls back to
    /// [`categorical`](Self::categorical) when empty.
    pub fn new(palette: Vec<Color>) -> Self {
        if palette.is_empty() {
            return Self::categorical();
        }
        Self { palette, next: 0 }
    }
}

impl ColorGenerator for PaletteColors {
    fn next_color(&mut self) -> Color {
        let color = self.palette[self.next % self.palette.len()].clone();
        self.next = self.next.wrapping_add(1);
        color
    }
}

/// Index-aligned chart data for the selected records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub x: Vec<String>,
    pub y: Vec<i64>,
    pub colors: Vec<Color>,
    pub hover_text: Vec<String>,
}

/// One row of a [`ChartSeries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEntry<'a> {
    pub title: &'a str,
    pub id: i64,
    pub color: &'a Color,
    pub hover_text: &'a str,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Whether all four sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.y.len();
        self.x.len() == n && self.colors.len() == n && self.hover_text.len() == n
    }

    /// Position of the entry describing `record`, matched on title and id.
    pub fn position_of(&self, record: &Record) -> Option<usize> {
        self.x
            .iter()
            .zip(self.y.iter())
            .position(|(title, id)| *id == record.id && *title == record.title)
    }

    pub fn entries(&self) -> impl Iterator<Item = ChartEntry<'_>> {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.colors.iter().zip(self.hover_text.iter()))
            .map(|((title, id), (color, hover_text))| ChartEntry {
                title,
                id: *id,
                color,
                hover_text,
            })
    }

    /// Plotly bar trace for this series.
    pub fn to_plotly_trace(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "bar",
            "x": self.x,
            "y": self.y,
            "marker": {
                "color": self.colors,
                "line": {
                    "color": BAR_OUTLINE_COLOR,
                    "width": BAR_OUTLINE_WIDTH,
                },
            },
            "hoverinfo": "y+text",
            "hovertext": self.hover_text,
        })
    }

    fn push(&mut self, record: &Record, color: Color) {
        self.x.push(record.title.clone());
        self.y.push(record.id);
        self.colors.push(color);
        self.hover_text.push(record.hover_text());
    }

    fn remove_at(&mut self, index: usize) {
        self.x.remove(index);
        self.y.remove(index);
        self.colors.remove(index);
        self.hover_text.remove(index);
    }
}

/// Append one entry for `added` with a fresh color.
pub fn derive_on_add(
    previous: ChartSeries,
    added: &Record,
    colors: &mut dyn ColorGenerator,
) -> ChartSeries {
    let mut next = previous;
    next.push(added, colors.next_color());
    next
}

/// Remove the entry for `removed`, keeping every other entry in place.
///
/// The entry is located by title *and* id, so another selected record with
/// the same title is left alone. Removing a record that has no entry is a
/// no-op.
pub fn derive_on_remove(previous: ChartSeries, removed: &Record) -> ChartSeries {
    let mut next = previous;
    if let Some(index) = next.position_of(removed) {
        next.remove_at(index);
    }
    next
}

/// Regenerate the whole series, assigning a fresh color to every entry.
pub fn rebuild_full<'a>(
    selection: impl IntoIterator<Item = &'a Record>,
    colors: &mut dyn ColorGenerator,
) -> ChartSeries {
    let mut series = ChartSeries::new();
    for record in selection {
        series.push(record, colors.next_color());
    }
    series
}
