//! Text and table shaping for front ends
//!
//! These produce plain data; rendering is the caller's business.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone};

use crate::artifact::LoadedDataset;
use crate::store::DatasetStore;
use crate::timeline::TimelineEvent;

/// Sample field names listed per dataset in the overview
const SAMPLE_FIELDS: usize = 5;

const RULE_WIDTH: usize = 50;

/// Summary of everything loaded, as of `now`
pub fn overview<Tz>(store: &DatasetStore, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::from("=== MOBILE FORENSIC ANALYSIS OVERVIEW ===\n\n");
    let _ = writeln!(out, "Analysis Date: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Loaded Databases: {}", store.len());
    let _ = writeln!(out, "Total Records: {}\n", store.total_records());

    if store.is_empty() {
        out.push_str("No databases loaded yet.\n");
        out.push_str("Load database files to populate the analysis.\n");
        return out;
    }

    out.push_str("Database Summary:\n");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for dataset in store.iter() {
        let _ = writeln!(out, "{:<20}: {} records", dataset.name(), dataset.count());
    }

    out.push_str("\nDetailed Information:\n");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    for dataset in store.iter() {
        let source = dataset.source();
        let _ = writeln!(out, "\n{}:", dataset.name().to_uppercase());
        let _ = writeln!(out, "  Records: {}", dataset.count());
        let _ = writeln!(out, "  Type: {}", dataset.category());
        if let Some(first) = dataset.records().first() {
            let sample: Vec<&str> = first.columns().take(SAMPLE_FIELDS).collect();
            let _ = writeln!(out, "  Sample fields: {}", sample.join(", "));
        }
        let _ = writeln!(out, "  Source: {} ({} bytes)", source.path.display(), source.size_bytes);
        let _ = writeln!(out, "  SHA-256: {}", source.sha256);
        match &source.matched_query {
            Some(label) => {
                let _ = writeln!(out, "  Matched query: {}", label);
            }
            None => out.push_str("  Matched query: none\n"),
        }
    }

    out
}

/// Timeline as `YYYY-MM-DD HH:MM:SS | source | description` lines
pub fn timeline_text(events: &[TimelineEvent]) -> String {
    let mut out = String::from("=== FORENSIC TIMELINE ===\n\n");

    if events.is_empty() {
        out.push_str("No timeline data available.\n");
        out.push_str("Load databases with timestamp information to see timeline events.\n");
        return out;
    }

    for event in events {
        let _ = writeln!(
            out,
            "{} | {:<15} | {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.source_name,
            event.description
        );
    }
    out
}

/// Stringified rows of one dataset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    /// Keys of the first record
    pub columns: Vec<String>,
    /// Display headings, one per column
    pub headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Tabulate `dataset`. Columns come from the first record; a row missing a
/// column shows an empty cell.
pub fn table(dataset: &LoadedDataset, max_rows: usize) -> TableView {
    let Some(first) = dataset.records().first() else {
        return TableView::default();
    };

    let columns: Vec<String> = first.columns().map(str::to_string).collect();
    let headings = columns.iter().map(|c| heading(c)).collect();
    let rows = dataset
        .records()
        .iter()
        .take(max_rows)
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    TableView {
        columns,
        headings,
        rows,
    }
}

/// Headings then rows, cells separated by ` | `
pub fn table_text(view: &TableView) -> String {
    if view.columns.is_empty() {
        return "No records.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", view.headings.join(" | "));
    for row in &view.rows {
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    out
}

/// `call_type` -> `Call Type`
fn heading(column: &str) -> String {
    column
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Category, CellValue, Record};
    use crate::store::tests::dataset;
    use chrono::Utc;

    #[test]
    fn test_heading() {
        assert_eq!(heading("call_type"), "Call Type");
        assert_eq!(heading("URL"), "Url");
        assert_eq!(heading("display_name_primary"), "Display Name Primary");
        assert_eq!(heading("_id"), " Id");
    }

    #[test]
    fn test_table_uses_first_record_columns() {
        let records = vec![
            Record::new()
                .with("number", CellValue::Text("+15550100".into()))
                .with("call_type", CellValue::Integer(2)),
            Record::new()
                .with("number", CellValue::Text("+15550101".into()))
                .with("extra", CellValue::Real(1.5)),
            Record::new().with("number", CellValue::Null),
        ];
        let ds = dataset("Call Log", Category::Calls, records);

        let view = table(&ds, 2);
        assert_eq!(view.columns, vec!["number", "call_type"]);
        assert_eq!(view.headings, vec!["Number", "Call Type"]);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0], vec!["+15550100", "2"]);
        assert_eq!(view.rows[1], vec!["+15550101", ""]);
    }

    #[test]
    fn test_table_of_empty_dataset() {
        let ds = dataset("Messages", Category::Messages, Vec::new());
        assert_eq!(table(&ds, 10), TableView::default());
        assert_eq!(table_text(&TableView::default()), "No records.\n");
    }

    #[test]
    fn test_table_text_respects_row_limit() {
        let records = (0..5)
            .map(|i| {
                Record::new()
                    .with("address", CellValue::Text(format!("+1555000{}", i)))
                    .with("message_type", CellValue::Text("Sent".into()))
            })
            .collect();
        let ds = dataset("Messages", Category::Messages, records);

        let text = table_text(&table(&ds, 3));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Address | Message Type");
        assert_eq!(lines[1], "+15550000 | Sent");
        assert_eq!(lines[3], "+15550002 | Sent");
    }

    #[test]
    fn test_overview() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let empty = overview(&DatasetStore::new(), now);
        assert!(empty.contains("Analysis Date: 2024-03-01 09:30:00"));
        assert!(empty.contains("Loaded Databases: 0"));
        assert!(empty.contains("No databases loaded yet."));

        let mut store = DatasetStore::new();
        let record = Record::new()
            .with("a", CellValue::Integer(1))
            .with("b", CellValue::Integer(2))
            .with("c", CellValue::Integer(3))
            .with("d", CellValue::Integer(4))
            .with("e", CellValue::Integer(5))
            .with("f", CellValue::Integer(6));
        store.insert(dataset("Call Log", Category::Calls, vec![record]));
        store.insert(dataset("Messages", Category::Messages, Vec::new()));

        let text = overview(&store, now);
        assert!(text.contains("Loaded Databases: 2"));
        assert!(text.contains("Total Records: 1\n"));
        assert!(text.contains(&format!("{:<20}: 1 records", "Call Log")));
        assert!(text.contains("CALL LOG:"));
        assert!(text.contains("  Type: calls"));
        assert!(text.contains("  Sample fields: a, b, c, d, e\n"));
        assert!(text.contains("  Matched query: none"));
    }

    #[test]
    fn test_timeline_text() {
        assert!(timeline_text(&[]).contains("No timeline data available."));

        let events = vec![TimelineEvent {
            timestamp: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
            description: "Call: 1 - +15550100".to_string(),
            source_name: "Call Log".to_string(),
        }];
        let text = timeline_text(&events);
        assert!(text.starts_with("=== FORENSIC TIMELINE ==="));
        assert!(text.contains("2023-11-14 22:13:20 | Call Log        | Call: 1 - +15550100\n"));
    }
}
