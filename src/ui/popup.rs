/// Popup UI: live groups (switch/archive) and archived groups (restore/delete)

use crate::archive::{self, ArchiveEntry, ArchiveList, ARCHIVED_GROUPS_KEY};
use crate::error::{classify_js_error, ExtensionError};
use crate::grouping::last_active_key;
use crate::message::Command;
use crate::tab_data::{GroupInfo, TabInfo, TAB_GROUP_ID_NONE};
use patternfly_yew::prelude::*;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryCurrentWindowGroups() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryCurrentWindowTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroupTabs(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sessionGetMany(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncGet(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncSet(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn focusWindow(window_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: i32) -> Result<(), JsValue>;
}

/// A live group plus what the popup shows about it.
#[derive(Clone, PartialEq)]
struct GroupView {
    info: GroupInfo,
    tab_count: usize,
    last_active_tab: Option<i32>,
}

#[derive(Clone, PartialEq)]
struct Status {
    text: String,
    is_error: bool,
}

#[function_component(App)]
pub fn app() -> Html {
    let status = use_state(|| None::<Status>);
    let groups = use_state(Vec::<GroupView>::new);
    let archives = use_state(Vec::<ArchiveEntry>::new);
    let reload = use_state(|| 0u32);

    // Load live groups and archives on mount and after every action.
    {
        let status = status.clone();
        let groups = groups.clone();
        let archives = archives.clone();
        use_effect_with(*reload, move |_| {
            spawn_local(async move {
                match load_group_views().await {
                    Ok(views) => groups.set(views),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error loading groups: {e}"),
                        is_error: true,
                    })),
                }
                match load_archives().await {
                    Ok(list) => archives.set(list.sorted_recent_first()),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error loading archives: {e}"),
                        is_error: true,
                    })),
                }
            });
            || ()
        });
    }

    let on_switch = {
        let status = status.clone();
        Callback::from(move |(tab_id, window_id, group_id): (i32, i32, i32)| {
            let status = status.clone();
            spawn_local(async move {
                match switch_to_tab(tab_id, window_id).await {
                    Ok(()) => {}
                    Err(ExtensionError::StaleReference(_)) => {
                        status.set(Some(Status {
                            text: "Cannot switch: tab no longer exists.".to_string(),
                            is_error: true,
                        }));
                        // The remembered tab is gone; have the coordinator drop the record.
                        let command = Command::ClearStaleSwitchData {
                            storage_key: last_active_key(group_id),
                        };
                        if let Err(e) = send_command(&command).await {
                            log::warn!("stale-clear dispatch failed: {e}");
                        }
                    }
                    // Something else vanished mid-switch (the window, or the
                    // tab after its existence check); say which.
                    Err(e @ ExtensionError::NotFound(_)) => status.set(Some(Status {
                        text: format!("Cannot switch: {e}."),
                        is_error: true,
                    })),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error switching tab: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    let on_archive = {
        let status = status.clone();
        let reload = reload.clone();
        Callback::from(move |group: GroupInfo| {
            let status = status.clone();
            let reload = reload.clone();
            status.set(Some(Status {
                text: format!("Archiving group \"{}\"...", display_title(&group.title)),
                is_error: false,
            }));
            spawn_local(async move {
                match archive_group(&group).await {
                    Ok(entry) => {
                        status.set(Some(Status {
                            text: format!("Group \"{}\" archived successfully.", entry.title),
                            is_error: false,
                        }));
                        reload.set(*reload + 1);
                    }
                    Err(e) => status.set(Some(Status {
                        text: format!("Error archiving group: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    let on_restore = {
        let status = status.clone();
        let reload = reload.clone();
        Callback::from(move |entry: ArchiveEntry| {
            let status = status.clone();
            let reload = reload.clone();
            status.set(Some(Status {
                text: format!("Restoring group \"{}\"...", entry.title),
                is_error: false,
            }));
            spawn_local(async move {
                let command = Command::RestoreGroup {
                    group_data: entry.clone(),
                };
                match send_command(&command).await {
                    Ok(()) => {
                        // Eager: the entry is consumed once the restore is
                        // dispatched, not once it is confirmed.
                        match delete_archive(&entry.id).await {
                            Ok(_) => reload.set(*reload + 1),
                            Err(e) => status.set(Some(Status {
                                text: format!("Error deleting archive: {e}"),
                                is_error: true,
                            })),
                        }
                    }
                    Err(e) => status.set(Some(Status {
                        text: format!("Error initiating restore: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    let on_delete = {
        let status = status.clone();
        let reload = reload.clone();
        Callback::from(move |archive_id: String| {
            let status = status.clone();
            let reload = reload.clone();
            spawn_local(async move {
                match delete_archive(&archive_id).await {
                    Ok(true) => {
                        status.set(Some(Status {
                            text: "Archive deleted.".to_string(),
                            is_error: false,
                        }));
                        reload.set(*reload + 1);
                    }
                    Ok(false) => status.set(Some(Status {
                        text: "Archive not found.".to_string(),
                        is_error: true,
                    })),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error deleting archive: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    html! {
        <div class="popup-container">
            <h1 class="popup-title">{"Tab Shepherd"}</h1>

            {match &*status {
                Some(s) if s.is_error => html! {
                    <Alert r#type={AlertType::Danger} title={s.text.clone()} inline={true}></Alert>
                },
                Some(s) => html! { <p class="status-text">{&s.text}</p> },
                None => html! {},
            }}

            <div class="groups-list">
                <h2>{"Active Groups"}</h2>
                if groups.is_empty() {
                    <p>{"No active tab groups in this window."}</p>
                } else {
                    {for groups.iter().map(|view| {
                        let info = view.info.clone();
                        let archive_click = {
                            let on_archive = on_archive.clone();
                            let info = info.clone();
                            Callback::from(move |_| on_archive.emit(info.clone()))
                        };
                        html! {
                            <div class="group-item">
                                <div class="group-title">
                                    <span
                                        class="color-dot"
                                        style={format!("background-color: {};", info.color.name())}
                                    ></span>
                                    <span>{display_title(&info.title)}</span>
                                    <span class="tab-count">{tab_count_label(view.tab_count)}</span>
                                </div>
                                <div class="group-actions">
                                    if let Some(tab_id) = view.last_active_tab {
                                        <Button
                                            onclick={on_switch.reform({
                                                let window_id = info.window_id;
                                                let group_id = info.id;
                                                move |_| (tab_id, window_id, group_id)
                                            })}
                                            variant={ButtonVariant::Secondary}
                                        >
                                            {"Switch"}
                                        </Button>
                                    }
                                    <Button onclick={archive_click} variant={ButtonVariant::Secondary}>
                                        {"Archive"}
                                    </Button>
                                </div>
                            </div>
                        }
                    })}
                }
            </div>

            <div class="archived-list">
                <h2>{"Archived Groups"}</h2>
                if archives.is_empty() {
                    <p>{"No archived groups found."}</p>
                } else {
                    {for archives.iter().map(|entry| {
                        let restore_click = {
                            let on_restore = on_restore.clone();
                            let entry = entry.clone();
                            Callback::from(move |_| on_restore.emit(entry.clone()))
                        };
                        let delete_click = on_delete.reform({
                            let id = entry.id.clone();
                            move |_| id.clone()
                        });
                        html! {
                            <div class="archived-item">
                                <div class="archived-details">
                                    <span>
                                        <strong>{&entry.title}</strong>
                                        <span
                                            class="color-dot"
                                            style={format!("background-color: {};", entry.color.name())}
                                        ></span>
                                    </span>
                                    <span>{tab_count_label(entry.tab_urls.len())}</span>
                                    <span>{format!("Archived: {}", format_archived_at(&entry.archived_at))}</span>
                                </div>
                                <div class="archived-actions">
                                    <Button onclick={restore_click}>{"Restore"}</Button>
                                    <Button onclick={delete_click} variant={ButtonVariant::Danger}>
                                        {"Delete"}
                                    </Button>
                                </div>
                            </div>
                        }
                    })}
                }
            </div>
        </div>
    }
}

// Helper functions

fn display_title(title: &str) -> String {
    if title.is_empty() {
        "Untitled Group".to_string()
    } else {
        title.to_string()
    }
}

fn tab_count_label(count: usize) -> String {
    if count == 1 {
        "1 tab".to_string()
    } else {
        format!("{count} tabs")
    }
}

/// "2026-08-28T09:15:00.000Z" -> "2026-08-28 09:15"
fn format_archived_at(iso: &str) -> String {
    iso.replace('T', " ").chars().take(16).collect()
}

async fn load_group_views() -> Result<Vec<GroupView>, ExtensionError> {
    let js = queryCurrentWindowGroups()
        .await
        .map_err(|e| classify_js_error("group query", &e))?;
    let mut groups: Vec<GroupInfo> = serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("group query", format!("malformed group list: {e}")))?;
    groups.sort_by(|a, b| a.title.cmp(&b.title));

    let js = queryCurrentWindowTabs()
        .await
        .map_err(|e| classify_js_error("tab query", &e))?;
    let tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("tab query", format!("malformed tab list: {e}")))?;

    let mut counts: HashMap<i32, usize> = HashMap::new();
    for tab in &tabs {
        if tab.group_id != TAB_GROUP_ID_NONE {
            *counts.entry(tab.group_id).or_insert(0) += 1;
        }
    }

    // Batch-fetch the last-active record of every group in the window.
    let keys: Vec<String> = groups.iter().map(|g| last_active_key(g.id)).collect();
    let keys_js = serde_wasm_bindgen::to_value(&keys)
        .map_err(|e| ExtensionError::host_api("session get", e.to_string()))?;
    let last_active_js = sessionGetMany(keys_js)
        .await
        .map_err(|e| classify_js_error("session get", &e))?;
    let last_active: HashMap<String, i32> = serde_wasm_bindgen::from_value(last_active_js)
        .unwrap_or_default();

    Ok(groups
        .into_iter()
        .map(|info| {
            let tab_count = counts.get(&info.id).copied().unwrap_or(0);
            let last_active_tab = last_active.get(&last_active_key(info.id)).copied();
            GroupView {
                info,
                tab_count,
                last_active_tab,
            }
        })
        .collect())
}

async fn load_archives() -> Result<ArchiveList, ExtensionError> {
    let js = syncGet(ARCHIVED_GROUPS_KEY)
        .await
        .map_err(|e| classify_js_error("archive load", &e))?;
    if js.is_null() || js.is_undefined() {
        return Ok(ArchiveList::new());
    }
    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("archive load", format!("malformed archive list: {e}")))
}

async fn save_archives(list: &ArchiveList) -> Result<(), ExtensionError> {
    let js = serde_wasm_bindgen::to_value(list)
        .map_err(|e| ExtensionError::host_api("archive save", e.to_string()))?;
    syncSet(ARCHIVED_GROUPS_KEY, js)
        .await
        .map_err(|e| classify_js_error("archive save", &e))
}

/// Snapshot a group's tabs into the durable archive, then close them. The
/// entry is persisted before any tab closes, so a failure mid-close cannot
/// lose the snapshot; a persist failure aborts with the tabs untouched.
async fn archive_group(group: &GroupInfo) -> Result<ArchiveEntry, ExtensionError> {
    let js = queryGroupTabs(group.id)
        .await
        .map_err(|e| classify_js_error("tab query", &e))?;
    let tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("tab query", format!("malformed tab list: {e}")))?;

    let archived_at: String = js_sys::Date::new_0().to_iso_string().into();
    let entry = archive::build_entry(
        &group.title,
        group.color,
        &tabs,
        &archived_at,
        archive::archive_id(js_sys::Date::now()),
    )?;

    let mut archives = load_archives().await?;
    archives.add(entry.clone());
    save_archives(&archives).await?;

    let tab_ids: Vec<i32> = tabs.iter().map(|t| t.id).collect();
    let ids_js = serde_wasm_bindgen::to_value(&tab_ids)
        .map_err(|e| ExtensionError::host_api("tab close", e.to_string()))?;
    removeTabs(ids_js)
        .await
        .map_err(|e| classify_js_error("tab close", &e))?;

    Ok(entry)
}

async fn delete_archive(archive_id: &str) -> Result<bool, ExtensionError> {
    let mut archives = load_archives().await?;
    if !archives.remove(archive_id) {
        return Ok(false);
    }
    save_archives(&archives).await?;
    Ok(true)
}

async fn send_command(command: &Command) -> Result<(), ExtensionError> {
    let js = serde_wasm_bindgen::to_value(command)
        .map_err(|e| ExtensionError::host_api("message", e.to_string()))?;
    sendMessage(js)
        .await
        .map_err(|e| classify_js_error("message", &e))
}

async fn switch_to_tab(tab_id: i32, window_id: i32) -> Result<(), ExtensionError> {
    // Confirm the remembered tab still exists before touching focus. A miss
    // here means the stored last-active record went stale, not that a live
    // lookup raced a close.
    getTab(tab_id)
        .await
        .map_err(|e| classify_js_error("tab", &e).into_stale("last active tab"))?;
    focusWindow(window_id)
        .await
        .map_err(|e| classify_js_error("window", &e))?;
    activateTab(tab_id)
        .await
        .map_err(|e| classify_js_error("tab", &e))?;
    if let Some(window) = web_sys::window() {
        let _ = window.close();
    }
    Ok(())
}
