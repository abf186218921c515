//! Results table rendering.
//!
//! Pure functions from a slice of prediction records to output: a
//! terminal table, JSON, NDJSON, or an HTML fragment for the web UI.
//! An empty result set renders nothing in every format.

use std::fmt::Write as _;
use std::io::{self, Write};

use serde::Serialize;

use crate::models::PredictionRecord;

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const LOCALITY_HEADER: &str = "Locality";
const IMPACT_HEADER: &str = "Predicted Impact";

/// Above this, eighths are no longer exact in an `f64`.
const MAX_EXACT_EIGHTHS: f64 = 9_007_199_254_740_992.0;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal table (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    #[serde(rename = "name")]
    pub locality: String,
    pub impact: String,
}

/// Format an impact score with exactly two decimals.
///
/// Values exactly halfway between two cents round away from zero, and
/// negative zero prints as `0.00`. Everything else rounds to nearest.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
pub fn format_impact(impact: f64) -> String {
    let impact = if impact == 0.0 { 0.0 } else { impact };

    // A value sits exactly on a half cent only if it is an odd multiple of 1/8.
    let eighths = impact * 8.0;
    if eighths.fract() == 0.0 && eighths.abs() % 2.0 == 1.0 && eighths.abs() < MAX_EXACT_EIGHTHS {
        let cents = (impact.abs() * 100.0 + 0.5) as u64;
        let sign = if impact < 0.0 { "-" } else { "" };
        return format!("{sign}{}.{:02}", cents / 100, cents % 100);
    }

    format!("{impact:.2}")
}

/// Build display rows, one per record, in input order.
#[must_use]
pub fn rows(records: &[PredictionRecord]) -> Vec<TableRow> {
    records
        .iter()
        .map(|r| TableRow {
            locality: r.name.clone(),
            impact: format_impact(r.impact),
        })
        .collect()
}

/// Write records as an aligned terminal table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, records: &[PredictionRecord]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let rows = rows(records);
    let name_width = rows
        .iter()
        .map(|r| r.locality.chars().count())
        .chain(std::iter::once(LOCALITY_HEADER.len()))
        .max()
        .unwrap_or_default();
    let impact_width = IMPACT_HEADER.len();

    writeln!(
        writer,
        "{BOLD}{LOCALITY_HEADER:<name_width$}{RESET} {DIM}│{RESET} {BOLD}{IMPACT_HEADER:>impact_width$}{RESET}"
    )?;
    writeln!(
        writer,
        "{DIM}{}─┼─{}{RESET}",
        "─".repeat(name_width),
        "─".repeat(impact_width)
    )?;
    for row in &rows {
        writeln!(
            writer,
            "{:<name_width$} {DIM}│{RESET} {:>impact_width$}",
            row.locality, row.impact
        )?;
    }
    Ok(())
}

/// Write records as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, records: &[PredictionRecord]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(&rows(records))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write records as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, records: &[PredictionRecord]) -> io::Result<()> {
    for row in rows(records) {
        let json = serde_json::to_string(&row)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write records in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_records<W: Write>(
    writer: &mut W,
    records: &[PredictionRecord],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, records),
        Format::Json => write_json(writer, records),
        Format::Ndjson => write_ndjson(writer, records),
    }
}

/// Render records as an HTML table. Empty input renders an empty string.
#[must_use]
pub fn render_html(records: &[PredictionRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut html = String::from(
        "<table class=\"locality-table\">\n  <thead>\n    <tr><th>Locality</th><th>Predicted Impact</th></tr>\n  </thead>\n  <tbody>\n",
    );
    for row in rows(records) {
        let _ = writeln!(
            html,
            "    <tr><td>{}</td><td class=\"impact\">{}</td></tr>",
            escape_html(&row.locality),
            row.impact
        );
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Escape text for use inside HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
