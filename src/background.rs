/// Background coordinator: auto-grouping, activation tracking, restore handling
use crate::archive::ArchiveEntry;
use crate::error::{classify_js_error, ExtensionError};
use crate::grouping::{is_last_active_key, last_active_key, plan_collapse_updates, CollapseUpdate};
use crate::message::Command;
use crate::restore::{partition_restorable, restored_color, restored_title};
use crate::rules::{default_rules, Rule, RuleStore, GROUPING_PATTERNS_KEY};
use crate::tab_data::{eligible_for_grouping, GroupColor, GroupInfo, TabInfo, TAB_GROUP_ID_NONE};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

// Import JS bridge functions (thin passthroughs over chrome.* in the service worker)
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, props: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabsExisting(tab_ids: JsValue, group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabsNew(tab_ids: JsValue, window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str, active: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn discardTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sessionSet(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sessionRemove(key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncGet(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncSet(key: &str, value: JsValue) -> Result<(), JsValue>;
}

// The background context is a single-threaded service worker; the rule store
// lives in a thread-local cell and is only swapped wholesale.
thread_local! {
    static RULES: RefCell<RuleStore> = RefCell::new(RuleStore::new());
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveInfo {
    tab_id: i32,
    window_id: i32,
}

#[derive(Deserialize)]
struct GroupRef {
    id: i32,
}

#[derive(Deserialize)]
struct TabChangeInfo {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    window_id: i32,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroupUpdateProps<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<GroupColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapsed: Option<bool>,
}

// --- Typed wrappers over the bridge (error classification happens here) ---

async fn fetch_tab(tab_id: i32) -> Result<TabInfo, ExtensionError> {
    let js = getTab(tab_id)
        .await
        .map_err(|e| classify_js_error("tab", &e))?;
    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("tab", format!("malformed tab record: {e}")))
}

async fn query_groups(title: Option<&str>, window_id: i32) -> Result<Vec<GroupInfo>, ExtensionError> {
    let query = serde_wasm_bindgen::to_value(&GroupQuery { title, window_id })
        .map_err(|e| ExtensionError::host_api("group query", e.to_string()))?;
    let js = queryGroups(query)
        .await
        .map_err(|e| classify_js_error("group query", &e))?;
    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("group query", format!("malformed group list: {e}")))
}

async fn update_group(group_id: i32, props: &GroupUpdateProps<'_>) -> Result<(), ExtensionError> {
    let props = serde_wasm_bindgen::to_value(props)
        .map_err(|e| ExtensionError::host_api("group update", e.to_string()))?;
    updateGroup(group_id, props)
        .await
        .map(|_| ())
        .map_err(|e| classify_js_error("group update", &e))
}

async fn add_tab_to_group(tab_id: i32, group_id: i32) -> Result<(), ExtensionError> {
    let ids = serde_wasm_bindgen::to_value(&[tab_id])
        .map_err(|e| ExtensionError::host_api("group add", e.to_string()))?;
    groupTabsExisting(ids, group_id)
        .await
        .map(|_| ())
        .map_err(|e| classify_js_error("group add", &e))
}

async fn group_tabs_in_new_group(tab_ids: &[i32], window_id: i32) -> Result<i32, ExtensionError> {
    let ids = serde_wasm_bindgen::to_value(tab_ids)
        .map_err(|e| ExtensionError::host_api("group create", e.to_string()))?;
    let js = groupTabsNew(ids, window_id)
        .await
        .map_err(|e| classify_js_error("group create", &e))?;
    js.as_f64()
        .map(|id| id as i32)
        .ok_or_else(|| ExtensionError::host_api("group create", "no group id returned"))
}

async fn create_inactive_tab(url: &str) -> Result<TabInfo, ExtensionError> {
    let js = createTab(url, false)
        .await
        .map_err(|e| classify_js_error("tab create", &e))?;
    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("tab create", format!("malformed tab record: {e}")))
}

// --- Startup and rule-change handling ---

/// Load rules from the durable store, seeding the built-in defaults (and
/// persisting them) when nothing is stored yet.
pub(crate) async fn init() {
    let rules = match load_or_seed_rules().await {
        Ok(rules) => rules,
        Err(e) => {
            log::error!("failed to load grouping patterns: {e}");
            default_rules()
        }
    };
    RULES.with(|r| {
        let mut store = r.borrow_mut();
        store.replace(rules);
        log::info!("rule store loaded with {} rules", store.current().len());
    });
}

async fn load_or_seed_rules() -> Result<Vec<Rule>, ExtensionError> {
    let js = syncGet(GROUPING_PATTERNS_KEY)
        .await
        .map_err(|e| classify_js_error("rule load", &e))?;

    if js.is_null() || js.is_undefined() {
        let defaults = default_rules();
        let value = serde_wasm_bindgen::to_value(&defaults)
            .map_err(|e| ExtensionError::host_api("rule seed", e.to_string()))?;
        syncSet(GROUPING_PATTERNS_KEY, value)
            .await
            .map_err(|e| classify_js_error("rule seed", &e))?;
        return Ok(defaults);
    }

    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("rule load", format!("malformed rule list: {e}")))
}

/// Storage change notification: the options page rewrote the rule list.
/// No validation here; the options surface is trusted.
pub(crate) fn rules_changed(new_rules: JsValue) {
    match serde_wasm_bindgen::from_value::<Vec<Rule>>(new_rules) {
        Ok(rules) => RULES.with(|r| {
            let mut store = r.borrow_mut();
            store.replace(rules);
            log::info!("rule store replaced with {} rules", store.current().len());
        }),
        Err(e) => log::error!("ignoring malformed rule update: {e}"),
    }
}

// --- Auto-grouping (tab created / tab updated) ---

pub(crate) async fn tab_created(tab: JsValue) {
    let Ok(tab) = serde_wasm_bindgen::from_value::<TabInfo>(tab) else {
        return;
    };
    maybe_group_tab(&tab).await;
}

pub(crate) async fn tab_updated(change: JsValue, tab: JsValue) {
    let Ok(change) = serde_wasm_bindgen::from_value::<TabChangeInfo>(change) else {
        return;
    };
    let Ok(tab) = serde_wasm_bindgen::from_value::<TabInfo>(tab) else {
        return;
    };
    // Only react once the navigation landed somewhere.
    if change.url.is_some() && tab.status.as_deref() == Some("complete") {
        maybe_group_tab(&tab).await;
    }
}

async fn maybe_group_tab(tab: &TabInfo) {
    if !eligible_for_grouping(tab) {
        return;
    }
    let rule = RULES.with(|r| r.borrow().find_match(&tab.url).cloned());
    if let Some(rule) = rule {
        reconcile(tab, &rule).await;
    }
}

/// Find-or-create the group a matched tab belongs in, then best-effort
/// re-apply the rule's color. Creation failure aborts for this tab; the next
/// tab event retries implicitly.
async fn reconcile(tab: &TabInfo, rule: &Rule) {
    let group_id = match resolve_group(tab, rule).await {
        Ok(id) => id,
        Err(e) => {
            log::error!("could not group tab {} under \"{}\": {e}", tab.id, rule.group_title);
            return;
        }
    };

    // Color drift is cosmetic; failure here is swallowed.
    let recolor = GroupUpdateProps {
        color: Some(rule.color),
        ..Default::default()
    };
    if let Err(e) = update_group(group_id, &recolor).await {
        log::debug!("color update for group {group_id} skipped: {e}");
    }
}

async fn resolve_group(tab: &TabInfo, rule: &Rule) -> Result<i32, ExtensionError> {
    let existing = query_groups(Some(&rule.group_title), tab.window_id).await?;

    // Take the first group the host returns; the API does not guarantee
    // creation order, only that each returned group matched the title.
    if let Some(group) = existing.first() {
        match add_tab_to_group(tab.id, group.id).await {
            Ok(()) => return Ok(group.id),
            // The group vanished between query and add; make a fresh one.
            Err(ExtensionError::NotFound(_)) => {
                log::debug!("group {} vanished during reconcile, creating anew", group.id);
            }
            Err(e) => return Err(e),
        }
    }

    create_group_for(tab, rule).await
}

async fn create_group_for(tab: &TabInfo, rule: &Rule) -> Result<i32, ExtensionError> {
    let group_id = group_tabs_in_new_group(&[tab.id], tab.window_id).await?;
    let props = GroupUpdateProps {
        title: Some(&rule.group_title),
        color: Some(rule.color),
        ..Default::default()
    };
    update_group(group_id, &props).await?;
    Ok(group_id)
}

// --- Activation tracking and group collapse ---

pub(crate) async fn tab_activated(active_info: JsValue) {
    let Ok(info) = serde_wasm_bindgen::from_value::<ActiveInfo>(active_info) else {
        return;
    };

    let tab = match fetch_tab(info.tab_id).await {
        Ok(tab) => tab,
        // The tab closed before we could look at it; nothing to track.
        Err(ExtensionError::NotFound(_)) => return,
        Err(e) => {
            log::error!("activation lookup for tab {} failed: {e}", info.tab_id);
            return;
        }
    };

    let activated_group_id = tab.group_id;
    if activated_group_id != TAB_GROUP_ID_NONE {
        let key = last_active_key(activated_group_id);
        if let Err(e) = sessionSet(&key, JsValue::from_f64(tab.id as f64)).await {
            log::warn!("could not record last active tab: {:?}", e);
        }
    }

    let groups = match query_groups(None, info.window_id).await {
        Ok(groups) => groups,
        Err(ExtensionError::NotFound(_)) => return,
        Err(e) => {
            log::error!("group query for window {} failed: {e}", info.window_id);
            return;
        }
    };

    apply_collapse_plan(plan_collapse_updates(&groups, activated_group_id)).await;
}

/// Issue every collapse/expand update concurrently and wait for all of them
/// to settle. A group that vanished mid-flight is expected; anything else is
/// surfaced. No single failure blocks a sibling.
async fn apply_collapse_plan(plan: Vec<CollapseUpdate>) {
    join_all(plan.into_iter().map(|update| async move {
        let props = GroupUpdateProps {
            collapsed: Some(update.collapsed),
            ..Default::default()
        };
        match update_group(update.group_id, &props).await {
            Ok(()) => {}
            Err(ExtensionError::NotFound(_)) => {
                log::debug!("group {} removed before collapse update", update.group_id);
            }
            Err(e) => log::error!("collapse update for group {} failed: {e}", update.group_id),
        }
    }))
    .await;
}

/// A group disappeared; its last-active record must not outlive it.
pub(crate) async fn group_removed(group: JsValue) {
    let Ok(group) = serde_wasm_bindgen::from_value::<GroupRef>(group) else {
        return;
    };
    let key = last_active_key(group.id);
    if let Err(e) = sessionRemove(&key).await {
        log::warn!("could not clear {key}: {:?}", e);
    }
}

// --- Command channel ---

pub(crate) async fn runtime_message(message: JsValue) {
    let command = match serde_wasm_bindgen::from_value::<Command>(message) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("ignoring unrecognized message: {e}");
            return;
        }
    };

    match command {
        Command::RestoreGroup { group_data } => restore_group(group_data).await,
        Command::ClearStaleSwitchData { storage_key } => {
            if is_last_active_key(&storage_key) {
                if let Err(e) = sessionRemove(&storage_key).await {
                    log::warn!("could not clear stale key {storage_key}: {:?}", e);
                }
            } else {
                log::warn!("refusing to clear non-owned key {storage_key}");
            }
        }
    }
}

// --- Restore ---

/// Recreate an archived group: one inactive tab per valid URL, all attempts
/// awaited independently, then discard, group, and collapse. Tabs that were
/// created stay open even if the grouping step fails afterwards.
async fn restore_group(entry: ArchiveEntry) {
    let (restorable, skipped) = partition_restorable(&entry.tab_urls);
    for e in &skipped {
        log::warn!("skipping tab restore: {e}");
    }
    if restorable.is_empty() {
        log::warn!("archive \"{}\" has no restorable urls", entry.title);
        return;
    }

    let results = join_all(restorable.iter().map(|url| create_inactive_tab(url))).await;
    let mut created: Vec<TabInfo> = Vec::new();
    for (url, result) in restorable.iter().zip(results) {
        match result {
            Ok(tab) => created.push(tab),
            Err(e) => log::error!("failed to create tab for {url}: {e}"),
        }
    }
    if created.is_empty() {
        return;
    }

    // Free the memory of tabs nobody has looked at yet. Purely an
    // optimization; a tab that refuses to discard is left alone.
    join_all(created.iter().map(|tab| async move {
        let _ = discardTab(tab.id).await;
    }))
    .await;

    let window_id = created[0].window_id;
    let tab_ids: Vec<i32> = created.iter().map(|tab| tab.id).collect();

    let group_id = match group_tabs_in_new_group(&tab_ids, window_id).await {
        Ok(id) => id,
        Err(e) => {
            log::error!("restored tabs left ungrouped: {e}");
            return;
        }
    };

    let title = restored_title(&entry);
    let props = GroupUpdateProps {
        title: Some(&title),
        color: Some(restored_color(&entry)),
        // A bulk restore must not flood the window with expanded groups.
        collapsed: Some(true),
    };
    if let Err(e) = update_group(group_id, &props).await {
        log::error!("restored group {group_id} metadata update failed: {e}");
    }
}
