/// Archived tab groups: durable snapshots stored under chrome.storage.sync
use crate::error::ExtensionError;
use crate::tab_data::{GroupColor, TabInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key for the archive list in the durable synced store.
pub const ARCHIVED_GROUPS_KEY: &str = "archivedGroups";

/// A durable snapshot of one closed group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub id: String,
    pub title: String,
    pub color: GroupColor,
    /// ISO-8601 timestamp of when the group was archived.
    pub archived_at: String,
    pub tab_urls: Vec<String>,
}

/// Time + random archive id. Collision-improbable, not cryptographic.
pub fn archive_id(now_ms: f64) -> String {
    let rand = Uuid::new_v4().simple().to_string();
    format!("archive_{}_{}", now_ms as u64, &rand[..12])
}

/// Snapshot a live group's tabs into an archive entry. Empty groups are
/// refused before any storage mutation happens; tabs without a URL are
/// dropped from the snapshot.
pub fn build_entry(
    title: &str,
    color: GroupColor,
    tabs: &[TabInfo],
    archived_at: &str,
    id: String,
) -> Result<ArchiveEntry, ExtensionError> {
    if tabs.is_empty() {
        return Err(ExtensionError::EmptyGroup);
    }

    let tab_urls: Vec<String> = tabs
        .iter()
        .filter(|tab| !tab.url.is_empty())
        .map(|tab| tab.url.clone())
        .collect();

    let title = if title.is_empty() { "Untitled Group" } else { title };

    Ok(ArchiveEntry {
        id,
        title: title.to_string(),
        color,
        archived_at: archived_at.to_string(),
        tab_urls,
    })
}

/// The whole `archivedGroups` list as stored (a bare JSON array).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ArchiveList {
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveList {
    pub fn new() -> ArchiveList {
        ArchiveList { entries: Vec::new() }
    }

    pub fn add(&mut self, entry: ArchiveEntry) {
        self.entries.push(entry);
    }

    /// Remove exactly the entry with this id; everything else keeps its order.
    pub fn remove(&mut self, archive_id: &str) -> bool {
        let original_len = self.entries.len();
        self.entries.retain(|e| e.id != archive_id);
        self.entries.len() < original_len
    }

    /// Display order for the popup: most recently archived first. ISO-8601
    /// strings sort chronologically as plain strings.
    pub fn sorted_recent_first(&self) -> Vec<ArchiveEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        entries
    }
}
