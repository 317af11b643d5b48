//! Cross-artifact timeline correlation
//!
//! Each category names its event time differently:
//!
//! | Field        | Source                      | Description                        |
//! |--------------|-----------------------------|------------------------------------|
//! | `date`       | calls, messages (+ others)  | direction label and counterpart    |
//! | `dtstart`    | calendar                    | event title                        |
//! | `lastmod`    | legacy download providers   | file title                         |
//! | `start_time` | Chrome downloads            | target path or URL, status         |
//!
//! The first field present wins. Values may be epoch seconds, epoch
//! milliseconds or ISO-8601 text; see [`normalize_timestamp`].
//!
//! The timeline is derived on demand from the store and never cached.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::artifact::{Category, CellValue, Record};
use crate::config::TimelineLimits;
use crate::store::DatasetStore;

/// Numeric timestamps above this are milliseconds since the epoch.
///
/// Millisecond values before 2001-09-09 are read as seconds, and seconds
/// values after the year 33658 as milliseconds. Known approximation.
pub const MILLIS_THRESHOLD: f64 = 1_000_000_000_000.0;

/// One correlated event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Display name of the dataset the event came from
    pub source_name: String,
}

/// Build the timeline from every dataset in the store, most recent first.
///
/// At most `records_per_dataset` leading records of each dataset are
/// scanned and at most `max_events` events are returned. Events with equal
/// timestamps keep store order.
pub fn correlate(store: &DatasetStore, limits: &TimelineLimits) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    for dataset in store.iter() {
        for record in dataset.records().iter().take(limits.records_per_dataset) {
            if let Some(event) = record_event(record, dataset.category(), dataset.name()) {
                events.push(event);
            }
        }
    }

    // Stable: ties keep their input order
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events.truncate(limits.max_events);
    events
}

/// Turn one record into an event, if it carries a usable timestamp
pub fn record_event(record: &Record, category: Category, source_name: &str) -> Option<TimelineEvent> {
    let (raw, description) = if let Some(raw) = record.get("date") {
        let description = match category {
            Category::Calls => format!(
                "Call: {} - {}",
                label_or(record, "call_type", "Unknown"),
                label_or(record, "number", "Unknown")
            ),
            Category::Messages => format!(
                "SMS: {} - {}",
                label_or(record, "message_type", "Unknown"),
                label_or(record, "address", "Unknown")
            ),
            _ => String::new(),
        };
        (raw, description)
    } else if let Some(raw) = record.get("dtstart") {
        (raw, format!("Calendar: {}", label_or(record, "title", "No title")))
    } else if let Some(raw) = record.get("lastmod") {
        (raw, format!("Download: {}", label_or(record, "title", "Unknown file")))
    } else if let Some(raw) = record.get("start_time") {
        let target = record
            .label("target_path")
            .or_else(|| record.label("url"))
            .unwrap_or_else(|| "Unknown file".to_string());
        let status = label_or(record, "download_status", "Unknown");
        (raw, format!("Download: {} ({})", target, status))
    } else {
        return None;
    };

    match normalize_timestamp(raw) {
        Some(timestamp) => Some(TimelineEvent {
            timestamp,
            description,
            source_name: source_name.to_string(),
        }),
        None => {
            trace!(source = source_name, value = %raw, "Dropping record with unusable timestamp");
            None
        }
    }
}

fn label_or(record: &Record, column: &str, fallback: &str) -> String {
    record.label(column).unwrap_or_else(|| fallback.to_string())
}

/// Normalize a raw timestamp cell to a UTC instant.
///
/// Numbers above [`MILLIS_THRESHOLD`] are milliseconds, other numbers are
/// seconds. Text is parsed as ISO-8601 with any `Z` removed; text without an
/// offset is taken as UTC. Null, zero and empty text are "no timestamp".
pub fn normalize_timestamp(value: &CellValue) -> Option<DateTime<Utc>> {
    match value {
        CellValue::Null => None,
        CellValue::Integer(0) => None,
        CellValue::Integer(i) => {
            if *i as f64 > MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(*i)
            } else {
                DateTime::from_timestamp(*i, 0)
            }
        }
        CellValue::Real(r) => {
            if *r == 0.0 || !r.is_finite() {
                return None;
            }
            let seconds = if *r > MILLIS_THRESHOLD { r / 1000.0 } else { *r };
            from_fractional_seconds(seconds)
        }
        CellValue::Text(s) | CellValue::Marker(s) => {
            if s.is_empty() {
                return None;
            }
            parse_iso8601(&s.replace('Z', ""))
        }
    }
}

fn from_fractional_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::dataset;
    use chrono::{Datelike, TimeZone};
    use proptest::prelude::*;

    fn call(number: &str, kind: &str, date: CellValue) -> Record {
        Record::new()
            .with("number", CellValue::Text(number.into()))
            .with("date", date)
            .with("call_type", CellValue::Text(kind.into()))
    }

    #[test]
    fn test_seconds_and_millis_agree() {
        let secs = normalize_timestamp(&CellValue::Integer(1_700_000_000)).unwrap();
        let millis = normalize_timestamp(&CellValue::Integer(1_700_000_000_000)).unwrap();
        assert_eq!(secs, millis);
        assert_eq!(secs, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly 10^12 is still read as seconds
        let at = normalize_timestamp(&CellValue::Integer(1_000_000_000_000)).unwrap();
        assert!(at.year() > 30_000);

        let above = normalize_timestamp(&CellValue::Integer(1_000_000_000_001)).unwrap();
        assert_eq!(above.year(), 2001);
    }

    #[test]
    fn test_real_timestamps() {
        let t = normalize_timestamp(&CellValue::Real(1_700_000_000.5)).unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
        assert_eq!(t.timestamp_subsec_millis(), 500);

        let ms = normalize_timestamp(&CellValue::Real(1_700_000_000_000.0)).unwrap();
        assert_eq!(ms.timestamp(), 1_700_000_000);
        assert!(normalize_timestamp(&CellValue::Real(f64::NAN)).is_none());
    }

    #[test]
    fn test_iso_timestamps() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        for text in [
            "2023-11-14T22:13:20Z",
            "2023-11-14T22:13:20",
            "2023-11-14 22:13:20",
            "2023-11-14T22:13:20.000",
            "2023-11-15T00:13:20+02:00",
        ] {
            assert_eq!(
                normalize_timestamp(&CellValue::Text(text.into())),
                Some(expected),
                "failed on {text}"
            );
        }
        assert_eq!(
            normalize_timestamp(&CellValue::Text("2023-11-14".into())),
            Some(Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unusable_timestamps() {
        assert!(normalize_timestamp(&CellValue::Null).is_none());
        assert!(normalize_timestamp(&CellValue::Integer(0)).is_none());
        assert!(normalize_timestamp(&CellValue::Text(String::new())).is_none());
        assert!(normalize_timestamp(&CellValue::Text("yesterday".into())).is_none());
        // Numeric text is not a number
        assert!(normalize_timestamp(&CellValue::Text("1700000000".into())).is_none());
        assert!(normalize_timestamp(&CellValue::Marker("<Hex: 00>".into())).is_none());
        // Chrome's WebKit microseconds overflow even after the millisecond division
        assert!(normalize_timestamp(&CellValue::Integer(13_346_000_000_000_000)).is_none());
    }

    #[test]
    fn test_descriptions_by_field() {
        let call = call("+15550001", "Missed", CellValue::Integer(1_700_000_000));
        let event = record_event(&call, Category::Calls, "Call Log").unwrap();
        assert_eq!(event.description, "Call: Missed - +15550001");
        assert_eq!(event.source_name, "Call Log");

        let sms = Record::new()
            .with("address", CellValue::Null)
            .with("date", CellValue::Integer(1_700_000_000_000))
            .with("message_type", CellValue::Text("Sent".into()));
        let event = record_event(&sms, Category::Messages, "Messages").unwrap();
        assert_eq!(event.description, "SMS: Sent - Unknown");

        let cal = Record::new()
            .with("title", CellValue::Text("Dentist".into()))
            .with("dtstart", CellValue::Integer(1_700_000_000_000));
        assert_eq!(
            record_event(&cal, Category::Calendar, "Calendar").unwrap().description,
            "Calendar: Dentist"
        );

        let legacy = Record::new()
            .with("title", CellValue::Null)
            .with("lastmod", CellValue::Integer(1_700_000_000));
        assert_eq!(
            record_event(&legacy, Category::Generic, "Downloads").unwrap().description,
            "Download: Unknown file"
        );

        let dl = Record::new()
            .with("url", CellValue::Text("https://example.com/a.apk".into()))
            .with("target_path", CellValue::Null)
            .with("start_time", CellValue::Integer(1_700_000_000))
            .with("download_status", CellValue::Text("Complete".into()));
        assert_eq!(
            record_event(&dl, Category::Downloads, "Chrome Downloads").unwrap().description,
            "Download: https://example.com/a.apk (Complete)"
        );
    }

    #[test]
    fn test_date_takes_priority_over_other_fields() {
        let record = Record::new()
            .with("dtstart", CellValue::Integer(1_600_000_000))
            .with("date", CellValue::Integer(1_700_000_000));
        let event = record_event(&record, Category::Generic, "Mixed").unwrap();
        assert_eq!(event.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(event.description, "");
    }

    #[test]
    fn test_record_without_time_fields() {
        let record = Record::new().with("name", CellValue::Text("Ann".into()));
        assert!(record_event(&record, Category::Contacts, "Contacts").is_none());
    }

    #[test]
    fn test_correlate_orders_and_limits() {
        let mut store = DatasetStore::new();
        store.insert(dataset(
            "Call Log",
            Category::Calls,
            vec![
                call("1", "Incoming", CellValue::Integer(1_700_000_100)),
                call("2", "Outgoing", CellValue::Text("garbage".into())),
                call("3", "Missed", CellValue::Integer(1_700_000_300_000)),
            ],
        ));
        store.insert(dataset(
            "Calendar",
            Category::Calendar,
            vec![Record::new()
                .with("title", CellValue::Text("Standup".into()))
                .with("dtstart", CellValue::Text("2023-11-14T22:20:00Z".into()))],
        ));

        let events = correlate(&store, &TimelineLimits::default());
        let descriptions: Vec<_> = events.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Calendar: Standup", "Call: Missed - 3", "Call: Incoming - 1"]
        );
    }

    #[test]
    fn test_ties_keep_store_order() {
        let mut store = DatasetStore::new();
        let same = || CellValue::Integer(1_700_000_000);
        store.insert(dataset("First", Category::Calls, vec![call("a", "Incoming", same()), call("b", "Incoming", same())]));
        store.insert(dataset("Second", Category::Calls, vec![call("c", "Incoming", same())]));

        let events = correlate(&store, &TimelineLimits::default());
        let order: Vec<_> = events.iter().map(|e| e.description.clone()).collect();
        assert_eq!(
            order,
            vec!["Call: Incoming - a", "Call: Incoming - b", "Call: Incoming - c"]
        );
    }

    #[test]
    fn test_caps_per_dataset_and_total() {
        let mut store = DatasetStore::new();
        for d in 0..5 {
            let records = (0..150)
                .map(|i| call(&i.to_string(), "Incoming", CellValue::Integer(1_600_000_000 + d * 1000 + i)))
                .collect();
            store.insert(dataset(&format!("calls-{d}"), Category::Calls, records));
        }

        let limits = TimelineLimits::default();
        let events = correlate(&store, &limits);
        assert_eq!(events.len(), 200);

        // Only the first 100 records of each dataset are scanned
        assert!(events.iter().all(|e| {
            let n: i64 = e.description.rsplit(' ').next().unwrap().parse().unwrap();
            n < 100
        }));
        assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    proptest! {
        #[test]
        fn seconds_and_millis_normalize_identically(secs in 1i64..4_000_000_000i64) {
            let from_secs = normalize_timestamp(&CellValue::Integer(secs));
            let from_millis = normalize_timestamp(&CellValue::Integer(secs * 1000));
            if secs * 1000 > 1_000_000_000_000 {
                prop_assert_eq!(from_secs, from_millis);
            }
        }
    }
}
