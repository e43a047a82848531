/// Data structures mirroring the browser's tab and tab-group records
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel group id for tabs that belong to no group (chrome.tabGroups.TAB_GROUP_ID_NONE).
pub const TAB_GROUP_ID_NONE: i32 = -1;

fn group_id_none() -> i32 {
    TAB_GROUP_ID_NONE
}

/// A browser tab as delivered by the tabs API. Fields the browser may omit
/// (url on restricted pages, status mid-load) are defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    pub window_id: i32,
    #[serde(default = "group_id_none")]
    pub group_id: i32,
    #[serde(default)]
    pub status: Option<String>,
}

/// A tab group as delivered by the tabGroups API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
    pub window_id: i32,
}

/// The nine colors the browser accepts for tab groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    /// Lowercase name, as stored and as used for CSS color dots.
    pub fn name(&self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }

    /// Parse a form value back into a color (options page color select).
    pub fn parse(value: &str) -> Option<GroupColor> {
        GroupColor::ALL.iter().copied().find(|c| c.name() == value)
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a tab should be considered for auto-grouping at all.
/// Pinned tabs, tabs without a URL, and non-http(s) pages never reach the matcher.
pub fn eligible_for_grouping(tab: &TabInfo) -> bool {
    !tab.url.is_empty() && !tab.pinned && tab.url.starts_with("http")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(url: &str, pinned: bool) -> TabInfo {
        TabInfo {
            id: 1,
            url: url.to_string(),
            title: String::new(),
            pinned,
            window_id: 10,
            group_id: TAB_GROUP_ID_NONE,
            status: None,
        }
    }

    #[test]
    fn test_eligible_for_grouping() {
        assert!(eligible_for_grouping(&tab("https://github.com", false)));
        assert!(eligible_for_grouping(&tab("http://example.com", false)));
        assert!(!eligible_for_grouping(&tab("", false)));
        assert!(!eligible_for_grouping(&tab("https://github.com", true)));
        assert!(!eligible_for_grouping(&tab("chrome://newtab", false)));
        assert!(!eligible_for_grouping(&tab("ftp://files.example.com", false)));
    }

    #[test]
    fn test_tab_info_defaults_missing_fields() {
        let json = r#"{"id": 7, "windowId": 3}"#;
        let tab: TabInfo = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, 7);
        assert_eq!(tab.window_id, 3);
        assert_eq!(tab.url, "");
        assert_eq!(tab.group_id, TAB_GROUP_ID_NONE);
        assert!(!tab.pinned);
    }

    #[test]
    fn test_group_info_wire_format() {
        let json = r#"{"id": 42, "title": "GitHub", "color": "blue", "collapsed": true, "windowId": 3}"#;
        let group: GroupInfo = serde_json::from_str(json).unwrap();

        assert_eq!(group.id, 42);
        assert_eq!(group.title, "GitHub");
        assert_eq!(group.color, GroupColor::Blue);
        assert!(group.collapsed);
    }

    #[test]
    fn test_group_color_round_trip() {
        for color in GroupColor::ALL {
            let json = serde_json::to_string(&color).unwrap();
            assert_eq!(json, format!("\"{}\"", color.name()));
            assert_eq!(GroupColor::parse(color.name()), Some(color));
        }
        assert_eq!(GroupColor::parse("magenta"), None);
    }
}
