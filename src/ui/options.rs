/// Options UI: manage the ordered grouping-rule list

use crate::error::{classify_js_error, ExtensionError};
use crate::rules::{validate_new_rule, Rule, GROUPING_PATTERNS_KEY};
use crate::tab_data::GroupColor;
use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/options.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn syncGet(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn syncSet(key: &str, value: JsValue) -> Result<(), JsValue>;
}

#[derive(Clone, PartialEq)]
struct Status {
    text: String,
    is_error: bool,
}

#[function_component(Options)]
pub fn options() -> Html {
    let rules = use_state(Vec::<Rule>::new);
    let status = use_state(|| None::<Status>);
    let pattern_input = use_state(String::new);
    let title_input = use_state(String::new);
    let color_input = use_state(|| GroupColor::Grey);

    // Load the stored rule list on mount.
    {
        let rules = rules.clone();
        let status = status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_rules().await {
                    Ok(list) => rules.set(list),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error loading patterns: {e}"),
                        is_error: true,
                    })),
                }
            });
            || ()
        });
    }

    let on_pattern_input = {
        let pattern_input = pattern_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                pattern_input.set(input.value());
            }
        })
    };

    let on_title_input = {
        let title_input = title_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                title_input.set(input.value());
            }
        })
    };

    let on_color_change = {
        let color_input = color_input.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                if let Some(color) = GroupColor::parse(&select.value()) {
                    color_input.set(color);
                }
            }
        })
    };

    let on_add = {
        let rules = rules.clone();
        let status = status.clone();
        let pattern_input = pattern_input.clone();
        let title_input = title_input.clone();
        let color_input = color_input.clone();

        Callback::from(move |_| {
            let pattern = pattern_input.trim().to_string();
            let title = title_input.trim().to_string();

            if let Err(e) = validate_new_rule(&rules, &pattern, &title) {
                status.set(Some(Status {
                    text: e.to_string(),
                    is_error: true,
                }));
                return;
            }

            let mut updated = (*rules).clone();
            updated.push(Rule::new(&pattern, &title, *color_input));
            rules.set(updated.clone());
            pattern_input.set(String::new());
            title_input.set(String::new());
            color_input.set(GroupColor::Grey);

            let status = status.clone();
            spawn_local(async move {
                match save_rules(&updated).await {
                    Ok(()) => status.set(Some(Status {
                        text: "Patterns saved successfully!".to_string(),
                        is_error: false,
                    })),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error saving patterns: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    let on_remove = {
        let rules = rules.clone();
        let status = status.clone();

        Callback::from(move |index: usize| {
            let mut updated = (*rules).clone();
            if index >= updated.len() {
                return;
            }
            updated.remove(index);
            rules.set(updated.clone());

            let status = status.clone();
            spawn_local(async move {
                match save_rules(&updated).await {
                    Ok(()) => status.set(Some(Status {
                        text: "Patterns saved successfully!".to_string(),
                        is_error: false,
                    })),
                    Err(e) => status.set(Some(Status {
                        text: format!("Error saving patterns: {e}"),
                        is_error: true,
                    })),
                }
            });
        })
    };

    html! {
        <div class="options-container">
            <h1>{"Tab Shepherd Options"}</h1>

            {match &*status {
                Some(s) if s.is_error => html! {
                    <Alert r#type={AlertType::Danger} title={s.text.clone()} inline={true}></Alert>
                },
                Some(s) => html! { <p class="status-text">{&s.text}</p> },
                None => html! {},
            }}

            <div class="patterns-list">
                <h2>{"Grouping Patterns"}</h2>
                if rules.is_empty() {
                    <p>{"No patterns defined yet."}</p>
                } else {
                    {for rules.iter().enumerate().map(|(index, rule)| {
                        let remove_click = on_remove.reform(move |_| index);
                        html! {
                            <div class="pattern-item">
                                <div class="pattern-details">
                                    <span>{"Pattern: "}<strong>{format!("\"{}\"", rule.pattern)}</strong></span>
                                    <span>{"Title: "}<strong>{format!("\"{}\"", rule.group_title)}</strong></span>
                                    <span>
                                        {"Color: "}
                                        <span
                                            class="color-preview"
                                            style={format!("background-color: {};", rule.color.name())}
                                        ></span>
                                    </span>
                                </div>
                                <Button onclick={remove_click} variant={ButtonVariant::Danger}>
                                    {"Remove"}
                                </Button>
                            </div>
                        }
                    })}
                }
            </div>

            <div class="add-pattern-form">
                <h2>{"Add Pattern"}</h2>
                <input
                    type="text"
                    placeholder="URL pattern (e.g. github.com)"
                    value={(*pattern_input).clone()}
                    oninput={on_pattern_input}
                />
                <input
                    type="text"
                    placeholder="Group title"
                    value={(*title_input).clone()}
                    oninput={on_title_input}
                />
                <select onchange={on_color_change}>
                    {for GroupColor::ALL.iter().map(|color| html! {
                        <option value={color.name()} selected={*color == *color_input}>
                            {color.name()}
                        </option>
                    })}
                </select>
                <Button onclick={on_add}>{"Add"}</Button>
            </div>
        </div>
    }
}

// Helper functions

async fn load_rules() -> Result<Vec<Rule>, ExtensionError> {
    let js = syncGet(GROUPING_PATTERNS_KEY)
        .await
        .map_err(|e| classify_js_error("rule load", &e))?;
    if js.is_null() || js.is_undefined() {
        return Ok(Vec::new());
    }
    serde_wasm_bindgen::from_value(js)
        .map_err(|e| ExtensionError::host_api("rule load", format!("malformed rule list: {e}")))
}

async fn save_rules(rules: &[Rule]) -> Result<(), ExtensionError> {
    let js = serde_wasm_bindgen::to_value(rules)
        .map_err(|e| ExtensionError::host_api("rule save", e.to_string()))?;
    syncSet(GROUPING_PATTERNS_KEY, js)
        .await
        .map_err(|e| classify_js_error("rule save", &e))
}
