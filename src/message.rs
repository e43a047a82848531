/// One-way command channel from the popup to the background coordinator
use crate::archive::ArchiveEntry;
use serde::{Deserialize, Serialize};

/// Commands the popup fires at the long-lived background context. The sender
/// never waits for a result beyond delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Recreate the tabs of an archived group. The popup removes the archive
    /// entry right after dispatch, without waiting for the restore to finish.
    #[serde(rename_all = "camelCase")]
    RestoreGroup { group_data: ArchiveEntry },

    /// A consumer found a last-active record pointing at a vanished tab;
    /// drop the record.
    #[serde(rename_all = "camelCase")]
    ClearStaleSwitchData { storage_key: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::GroupColor;

    #[test]
    fn test_restore_command_wire_format() {
        let cmd = Command::RestoreGroup {
            group_data: ArchiveEntry {
                id: "archive_1_ab".to_string(),
                title: "Work".to_string(),
                color: GroupColor::Blue,
                archived_at: "2026-08-28T09:00:00.000Z".to_string(),
                tab_urls: vec!["https://github.com".to_string()],
            },
        };

        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "restoreGroup");
        assert_eq!(json["groupData"]["id"], "archive_1_ab");
        assert_eq!(json["groupData"]["tabUrls"][0], "https://github.com");

        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_clear_stale_command_wire_format() {
        let json = serde_json::json!({
            "action": "clearStaleSwitchData",
            "storageKey": "lastActiveTab_42",
        });

        let cmd: Command = serde_json::from_value(json).unwrap();
        assert_eq!(
            cmd,
            Command::ClearStaleSwitchData {
                storage_key: "lastActiveTab_42".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let json = serde_json::json!({ "action": "defragmentTabs" });
        assert!(serde_json::from_value::<Command>(json).is_err());
    }
}
