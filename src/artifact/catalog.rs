//! Artifact catalog
//!
//! Fixed list of the databases an examiner is expected to pull from a
//! handset, paired with the category that resolves them. Front ends read this
//! as data to build their load menus.

use serde::Serialize;

use super::types::Category;

/// One loadable artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Display name; datasets are stored under this key
    pub label: &'static str,
    /// Expected file name (or file hint) on the device
    pub file_hint: &'static str,
    /// Category that resolves this artifact
    pub category: Category,
}

/// All known artifacts, in menu order
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { label: "Contacts", file_hint: "contacts2.db", category: Category::Contacts },
    CatalogEntry { label: "Call Log", file_hint: "calllog.db", category: Category::Calls },
    CatalogEntry { label: "Messages", file_hint: "mmssms.db", category: Category::Messages },
    CatalogEntry { label: "Chrome History", file_hint: "chrome_history.db", category: Category::Browser },
    CatalogEntry { label: "Chrome Downloads", file_hint: "chrome_downloads", category: Category::Downloads },
    CatalogEntry { label: "Chrome Metadata", file_hint: "chrome_meta", category: Category::Meta },
    CatalogEntry { label: "Calendar", file_hint: "calendar.db", category: Category::Calendar },
    CatalogEntry { label: "Facebook Messenger", file_hint: "threads_db2.db", category: Category::Generic },
    CatalogEntry { label: "WhatsApp", file_hint: "whatsapp_messages", category: Category::Generic },
    CatalogEntry { label: "Skype Calls", file_hint: "skype_calls", category: Category::Generic },
    CatalogEntry { label: "WiFi Passwords", file_hint: "wifi_passwords", category: Category::Generic },
    CatalogEntry { label: "Accounts", file_hint: "accounts.db", category: Category::Accounts },
];

/// Find a catalog entry by label (case-insensitive)
pub fn lookup(label: &str) -> Option<&'static CatalogEntry> {
    let wanted = label.trim();
    CATALOG.iter().find(|e| e.label.eq_ignore_ascii_case(wanted))
}

/// Find the catalog entry whose file hint matches a file name exactly
pub fn lookup_file(file_name: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.file_hint.eq_ignore_ascii_case(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_hints_agree_with_categories() {
        for entry in CATALOG {
            assert_eq!(
                Category::from_file_hint(entry.file_hint),
                entry.category,
                "hint {} disagrees with catalog",
                entry.file_hint
            );
        }
    }

    #[test]
    fn test_catalog_labels_unique() {
        let mut labels: Vec<_> = CATALOG.iter().map(|e| e.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), CATALOG.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("call log").unwrap().category, Category::Calls);
        assert_eq!(lookup_file("CALLLOG.DB").unwrap().label, "Call Log");
        assert!(lookup("Signal").is_none());
    }
}
