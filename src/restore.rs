/// URL screening and fallbacks for restoring archived groups
use crate::archive::ArchiveEntry;
use crate::error::ExtensionError;
use crate::tab_data::GroupColor;

/// Title applied when an archive entry carries none.
pub const RESTORED_GROUP_FALLBACK_TITLE: &str = "Restored Group";

/// Only plain web pages come back as tabs. Everything else (extension pages,
/// ftp, file URLs, empty strings) is skipped, never an error.
pub fn is_restorable_url(url: &str) -> bool {
    url.starts_with("http:") || url.starts_with("https:")
}

/// Split an entry's URLs into the ones to recreate and the ones to skip,
/// preserving order. A skipped URL is recorded as `InvalidUrl`, never
/// surfaced as a failure of the restore itself.
pub fn partition_restorable(urls: &[String]) -> (Vec<String>, Vec<ExtensionError>) {
    let mut restorable = Vec::new();
    let mut skipped = Vec::new();
    for url in urls {
        if is_restorable_url(url) {
            restorable.push(url.clone());
        } else {
            skipped.push(ExtensionError::InvalidUrl(url.clone()));
        }
    }
    (restorable, skipped)
}

/// Group title for the restored group.
pub fn restored_title(entry: &ArchiveEntry) -> String {
    if entry.title.is_empty() {
        RESTORED_GROUP_FALLBACK_TITLE.to_string()
    } else {
        entry.title.clone()
    }
}

/// Group color for the restored group. Grey when the entry has none recorded.
pub fn restored_color(entry: &ArchiveEntry) -> GroupColor {
    entry.color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_restorable_url() {
        assert!(is_restorable_url("https://github.com"));
        assert!(is_restorable_url("http://example.com/page"));
        assert!(!is_restorable_url(""));
        assert!(!is_restorable_url("ftp://files.example.com"));
        assert!(!is_restorable_url("chrome://extensions"));
        assert!(!is_restorable_url("not-a-url"));
    }

    #[test]
    fn test_partition_keeps_order() {
        let (restorable, skipped) = partition_restorable(&urls(&[
            "https://a.example.com",
            "ftp://x",
            "http://b.example.com",
            "",
        ]));

        assert_eq!(restorable, urls(&["https://a.example.com", "http://b.example.com"]));
        assert_eq!(
            skipped,
            vec![
                ExtensionError::InvalidUrl("ftp://x".to_string()),
                ExtensionError::InvalidUrl("".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_invalid_yields_nothing_restorable() {
        let (restorable, skipped) = partition_restorable(&urls(&["ftp://x", "", "not-a-url"]));
        assert!(restorable.is_empty());
        assert_eq!(skipped.len(), 3);
    }

    #[test]
    fn test_archived_snapshot_survives_screening() {
        use crate::archive::build_entry;
        use crate::tab_data::TabInfo;

        let tabs: Vec<TabInfo> = ["https://a.example.com", "ftp://legacy.example.com", "https://c.example.com"]
            .iter()
            .enumerate()
            .map(|(i, url)| TabInfo {
                id: i as i32,
                url: url.to_string(),
                title: String::new(),
                pinned: false,
                window_id: 1,
                group_id: 5,
                status: None,
            })
            .collect();

        let entry = build_entry("Work", GroupColor::Blue, &tabs, "2026-08-28T09:00:00.000Z", "a".to_string())
            .unwrap();
        let (restorable, skipped) = partition_restorable(&entry.tab_urls);

        // Exactly the http(s) tabs come back, in their original order.
        assert_eq!(restorable, urls(&["https://a.example.com", "https://c.example.com"]));
        assert_eq!(
            skipped,
            vec![ExtensionError::InvalidUrl("ftp://legacy.example.com".to_string())]
        );
        assert_eq!(restored_title(&entry), "Work");
        assert_eq!(restored_color(&entry), GroupColor::Blue);
    }

    #[test]
    fn test_restored_title_fallback() {
        let mut entry = ArchiveEntry {
            id: "a".to_string(),
            title: String::new(),
            color: GroupColor::Grey,
            archived_at: "2026-08-28T09:00:00.000Z".to_string(),
            tab_urls: Vec::new(),
        };
        assert_eq!(restored_title(&entry), "Restored Group");

        entry.title = "Research".to_string();
        assert_eq!(restored_title(&entry), "Research");
    }
}
