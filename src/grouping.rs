/// Collapse planning and last-active-tab bookkeeping for the activation tracker
use crate::tab_data::GroupInfo;

/// Prefix for per-group last-active-tab keys in the session store.
/// A key exists only while its group does.
pub const LAST_ACTIVE_TAB_KEY_PREFIX: &str = "lastActiveTab_";

/// Session-store key recording the last active tab of a group.
pub fn last_active_key(group_id: i32) -> String {
    format!("{LAST_ACTIVE_TAB_KEY_PREFIX}{group_id}")
}

/// Guard for externally-supplied stale-clear requests: only keys we own may
/// be removed through the command channel.
pub fn is_last_active_key(key: &str) -> bool {
    key.starts_with(LAST_ACTIVE_TAB_KEY_PREFIX)
}

/// A single collapsed-state change to issue against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseUpdate {
    pub group_id: i32,
    pub collapsed: bool,
}

/// Decide which groups in a window need their collapsed state flipped after a
/// tab in `activated_group_id` became active: every other group collapses,
/// the activated one expands. Groups already in the target state are skipped,
/// so planning twice with no intervening activation yields nothing.
pub fn plan_collapse_updates(groups: &[GroupInfo], activated_group_id: i32) -> Vec<CollapseUpdate> {
    groups
        .iter()
        .filter_map(|group| {
            let should_collapse = group.id != activated_group_id;
            if group.collapsed != should_collapse {
                Some(CollapseUpdate {
                    group_id: group.id,
                    collapsed: should_collapse,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::{GroupColor, TAB_GROUP_ID_NONE};

    fn group(id: i32, collapsed: bool) -> GroupInfo {
        GroupInfo {
            id,
            title: format!("Group {id}"),
            color: GroupColor::Grey,
            collapsed,
            window_id: 1,
        }
    }

    /// Replay a plan against the in-memory snapshot, as the host would.
    fn apply(groups: &mut [GroupInfo], plan: &[CollapseUpdate]) {
        for update in plan {
            if let Some(g) = groups.iter_mut().find(|g| g.id == update.group_id) {
                g.collapsed = update.collapsed;
            }
        }
    }

    #[test]
    fn test_plan_expands_activated_and_collapses_rest() {
        let groups = vec![group(1, false), group(2, false), group(3, true)];

        let plan = plan_collapse_updates(&groups, 1);

        // Group 1 already expanded, group 3 already collapsed: only group 2 changes.
        assert_eq!(
            plan,
            vec![CollapseUpdate {
                group_id: 2,
                collapsed: true
            }]
        );
    }

    #[test]
    fn test_plan_expands_collapsed_activated_group() {
        let groups = vec![group(1, true), group(2, true)];

        let plan = plan_collapse_updates(&groups, 1);

        assert_eq!(
            plan,
            vec![CollapseUpdate {
                group_id: 1,
                collapsed: false
            }]
        );
    }

    #[test]
    fn test_plan_is_idempotent() {
        let mut groups = vec![group(1, false), group(2, false), group(3, false)];

        let plan = plan_collapse_updates(&groups, 2);
        assert_eq!(plan.len(), 2);
        apply(&mut groups, &plan);

        // Second pass with no intervening activation: nothing left to do.
        assert!(plan_collapse_updates(&groups, 2).is_empty());
    }

    #[test]
    fn test_ungrouped_activation_collapses_everything() {
        let mut groups = vec![group(1, false), group(2, true)];

        let plan = plan_collapse_updates(&groups, TAB_GROUP_ID_NONE);
        apply(&mut groups, &plan);

        assert!(groups.iter().all(|g| g.collapsed));
    }

    #[test]
    fn test_sequential_activations_leave_last_group_expanded() {
        let mut groups = vec![group(1, false), group(2, false), group(3, false)];

        let plan = plan_collapse_updates(&groups, 1);
        apply(&mut groups, &plan);
        let plan = plan_collapse_updates(&groups, 3);
        apply(&mut groups, &plan);

        let expanded: Vec<i32> = groups.iter().filter(|g| !g.collapsed).map(|g| g.id).collect();
        assert_eq!(expanded, vec![3]);
    }

    #[test]
    fn test_last_active_key() {
        assert_eq!(last_active_key(42), "lastActiveTab_42");
        assert!(is_last_active_key("lastActiveTab_42"));
        assert!(!is_last_active_key("archivedGroups"));
        assert!(!is_last_active_key("lastActive_42"));
    }
}
