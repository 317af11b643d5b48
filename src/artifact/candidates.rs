//! Candidate query sets, one per category
//!
//! Each category maps to an ordered list of candidates, most specific schema
//! first. The resolver walks the list and stops at the first accepted one, so
//! adding an artifact type means adding a list here, never touching the
//! resolver loop.
//!
//! Every query carries a row cap and an ORDER BY where the schema has a
//! meaningful sort key.

use crate::config::EngineConfig;

use super::types::Category;

/// Rule deciding whether a candidate's rows are accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// At least one row
    AnyRow,
    /// At least one row, and some column name contains this token
    /// (case-insensitive)
    ColumnContaining(String),
}

impl Acceptance {
    pub fn accepts(&self, columns: &[String], row_count: usize) -> bool {
        if row_count == 0 {
            return false;
        }
        match self {
            Acceptance::AnyRow => true,
            Acceptance::ColumnContaining(token) => {
                let token = token.to_lowercase();
                columns.iter().any(|c| c.to_lowercase().contains(&token))
            }
        }
    }
}

/// A single SQL statement plus its acceptance rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub label: String,
    pub sql: String,
    pub acceptance: Acceptance,
}

impl RecordQuery {
    pub fn new(label: &str, sql: &str) -> Self {
        Self {
            label: label.to_string(),
            sql: sql.to_string(),
            acceptance: Acceptance::AnyRow,
        }
    }
}

/// One entry in a category's fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Fixed query
    Query(RecordQuery),
    /// Dump each table whose name contains one of `keywords`, accepting the
    /// first whose columns include `required_column`
    DiscoverTables {
        label: String,
        keywords: Vec<String>,
        required_column: String,
        row_limit: usize,
    },
    /// Dump the first table listed in the schema
    FirstTable { label: String, row_limit: usize },
}

impl Candidate {
    pub fn label(&self) -> &str {
        match self {
            Candidate::Query(q) => &q.label,
            Candidate::DiscoverTables { label, .. } | Candidate::FirstTable { label, .. } => label,
        }
    }
}

// ============================================================================
// Contacts (contacts2.db)
// ============================================================================

const CONTACTS_BY_MIMETYPE: &str = r#"
    SELECT
        raw_contacts._id AS contact_id,
        name_data.data1 AS name,
        phone_data.data1 AS phone_number
    FROM raw_contacts
    LEFT JOIN data AS name_data
        ON name_data.raw_contact_id = raw_contacts._id
        AND name_data.mimetype_id = (SELECT _id FROM mimetypes WHERE mimetype = 'vnd.android.cursor.item/name')
    LEFT JOIN data AS phone_data
        ON phone_data.raw_contact_id = raw_contacts._id
        AND phone_data.mimetype_id = (SELECT _id FROM mimetypes WHERE mimetype = 'vnd.android.cursor.item/phone_v2')
    ORDER BY name_data.data1
    LIMIT 1000
"#;

const CONTACTS_BY_MIMETYPE_LIKE: &str = r#"
    SELECT
        raw_contacts._id AS contact_id,
        name_data.data1 AS name,
        phone_data.data1 AS phone_number
    FROM raw_contacts
    LEFT JOIN data AS name_data
        ON name_data.raw_contact_id = raw_contacts._id
        AND name_data.mimetype_id = (SELECT _id FROM mimetypes WHERE mimetype LIKE '%name%')
    LEFT JOIN data AS phone_data
        ON phone_data.raw_contact_id = raw_contacts._id
        AND phone_data.mimetype_id = (SELECT _id FROM mimetypes WHERE mimetype LIKE '%phone%')
    ORDER BY name_data.data1
    LIMIT 1000
"#;

const CONTACTS_RAW_NAMES: &str = r#"
    SELECT
        _id AS contact_id,
        display_name AS name,
        '' AS phone_number
    FROM raw_contacts
    WHERE display_name IS NOT NULL
    ORDER BY display_name
    LIMIT 1000
"#;

const CONTACTS_DATA_SCAN: &str = r#"
    SELECT
        raw_contact_id AS contact_id,
        data1 AS name,
        data2 AS phone_number
    FROM data
    WHERE mimetype_id IN (SELECT _id FROM mimetypes WHERE mimetype LIKE '%name%' OR mimetype LIKE '%phone%')
    ORDER BY data1
    LIMIT 1000
"#;

// ============================================================================
// Calls / Messages
// ============================================================================

const CALLS: &str = r#"
    SELECT number, type, date, duration, name,
        CASE type
            WHEN 1 THEN 'Incoming'
            WHEN 2 THEN 'Outgoing'
            WHEN 3 THEN 'Missed'
            ELSE 'Unknown'
        END AS call_type
    FROM calls
    ORDER BY date DESC
    LIMIT 1000
"#;

const MESSAGES: &str = r#"
    SELECT address, body, date, type, read,
        CASE type
            WHEN 1 THEN 'Received'
            WHEN 2 THEN 'Sent'
            ELSE 'Unknown'
        END AS message_type
    FROM sms
    ORDER BY date DESC
    LIMIT 1000
"#;

// ============================================================================
// Browser (Chrome History)
// ============================================================================

const BROWSER_URLS: &str = r#"
    SELECT url, title, visit_count AS visits, last_visit_time AS date,
        CASE WHEN url IN (SELECT url FROM bookmarks) THEN 1 ELSE 0 END AS bookmark
    FROM urls
    WHERE url IS NOT NULL
    ORDER BY last_visit_time DESC
    LIMIT 1000
"#;

const BROWSER_BOOKMARKS: &str = r#"
    SELECT url, title, visits, date, bookmark
    FROM bookmarks
    WHERE url IS NOT NULL
    ORDER BY date DESC
    LIMIT 1000
"#;

const BROWSER_URLS_DUMP: &str = "SELECT * FROM urls LIMIT 100";

const BROWSER_HISTORY_DUMP: &str = "SELECT * FROM history LIMIT 100";

const DOWNLOADS: &str = r#"
    SELECT
        downloads.id,
        downloads_url_chains.url,
        downloads.target_path,
        downloads.start_time,
        downloads.received_bytes,
        downloads.total_bytes,
        downloads.state,
        CASE downloads.state
            WHEN 1 THEN 'Complete'
            WHEN 2 THEN 'Cancelled'
            WHEN 3 THEN 'Interrupted'
            WHEN 4 THEN 'In Progress'
            ELSE 'Unknown'
        END AS download_status
    FROM downloads
    JOIN downloads_url_chains
        ON downloads.id = downloads_url_chains.id
    ORDER BY downloads.start_time DESC
    LIMIT 1000
"#;

const META: &str = "SELECT key, value FROM meta LIMIT 1000";

// ============================================================================
// Calendar / Accounts
// ============================================================================

const CALENDAR_EVENTS: &str = r#"
    SELECT title, description, dtstart, dtend,
        eventLocation, allDay
    FROM Events
    ORDER BY dtstart DESC
    LIMIT 500
"#;

const ACCOUNTS: &str = r#"
    SELECT name, type, password
    FROM accounts
    ORDER BY type, name
    LIMIT 1000
"#;

const ACCOUNTS_DUMP: &str = "SELECT * FROM accounts LIMIT 100";

const ACCOUNTS_AUTHTOKENS: &str = r#"
    SELECT a.name, a.type, at.authtoken
    FROM accounts a
    LEFT JOIN authtokens at ON a._id = at.accounts_id
    LIMIT 100
"#;

/// Ordered candidates for a category
pub fn candidate_set(category: Category, config: &EngineConfig) -> Vec<Candidate> {
    let q = |label: &str, sql: &str| Candidate::Query(RecordQuery::new(label, sql));

    match category {
        Category::Contacts => vec![
            q("contacts:mimetype-join", CONTACTS_BY_MIMETYPE),
            q("contacts:mimetype-like-join", CONTACTS_BY_MIMETYPE_LIKE),
            q("contacts:raw-contacts", CONTACTS_RAW_NAMES),
            q("contacts:data-scan", CONTACTS_DATA_SCAN),
        ],
        Category::Calls => vec![q("calls:canonical", CALLS)],
        Category::Messages => vec![q("messages:canonical", MESSAGES)],
        Category::Browser => vec![
            q("browser:urls", BROWSER_URLS),
            q("browser:bookmarks", BROWSER_BOOKMARKS),
            q("browser:urls-dump", BROWSER_URLS_DUMP),
            q("browser:history-dump", BROWSER_HISTORY_DUMP),
            Candidate::DiscoverTables {
                label: "browser:discover".to_string(),
                keywords: config.discovery.table_keywords.clone(),
                required_column: config.discovery.required_column_token.clone(),
                row_limit: config.discovery.row_limit,
            },
        ],
        Category::Downloads => vec![q("downloads:url-chains", DOWNLOADS)],
        Category::Meta => vec![q("meta:key-value", META)],
        Category::Calendar => vec![q("calendar:events", CALENDAR_EVENTS)],
        Category::Accounts => vec![
            q("accounts:credentials", ACCOUNTS),
            q("accounts:dump", ACCOUNTS_DUMP),
            q("accounts:authtokens", ACCOUNTS_AUTHTOKENS),
        ],
        Category::Generic => vec![Candidate::FirstTable {
            label: "generic:first-table".to_string(),
            row_limit: config.generic_row_limit,
        }],
    }
}
