/// Error taxonomy and classification of raw browser-API failures
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Every failure the extension core reasons about. Raw JsValue errors are
/// classified into these kinds at the bridge boundary; nothing downstream
/// inspects error message text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtensionError {
    /// A tab, group, or window vanished underneath us. Expected under
    /// concurrent mutation and usually swallowed with a diagnostic note.
    #[error("{0} no longer exists")]
    NotFound(String),

    /// Archiving a group that has no tabs.
    #[error("Cannot archive an empty group.")]
    EmptyGroup,

    /// A URL that cannot be restored as a tab.
    #[error("invalid url: {0:?}")]
    InvalidUrl(String),

    /// A remembered tab or group id that no longer resolves.
    #[error("stale reference: {0}")]
    StaleReference(String),

    /// Anything else the browser API threw at us.
    #[error("browser api failure in {context}: {message}")]
    HostApi { context: String, message: String },
}

impl ExtensionError {
    pub fn host_api(context: &str, message: impl Into<String>) -> ExtensionError {
        ExtensionError::HostApi {
            context: context.to_string(),
            message: message.into(),
        }
    }

    /// Reinterpret a vanished target as a stale remembered reference. Used
    /// when a stored id (not a live one) failed to resolve, which should
    /// trigger cleanup of the stored record rather than a plain miss.
    pub fn into_stale(self, what: &str) -> ExtensionError {
        match self {
            ExtensionError::NotFound(_) => ExtensionError::StaleReference(what.to_string()),
            other => other,
        }
    }
}

/// Message families the browser uses when an id no longer resolves.
const NOT_FOUND_MARKERS: [&str; 3] = ["No tab with id", "No group with id", "No window with id"];

/// Classify a raw error message from the host API. This is the only place
/// that matches on human-readable text.
pub fn classify_message(context: &str, message: &str) -> ExtensionError {
    if NOT_FOUND_MARKERS.iter().any(|m| message.contains(m)) {
        ExtensionError::NotFound(context.to_string())
    } else {
        ExtensionError::host_api(context, message)
    }
}

/// Pull the message out of a thrown JsValue (plain string or Error object)
/// and classify it.
pub fn classify_js_error(context: &str, err: &JsValue) -> ExtensionError {
    let message = err
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"));
    classify_message(context, &message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanished_ids_classify_as_not_found() {
        let err = classify_message("tab", "No tab with id: 42.");
        assert_eq!(err, ExtensionError::NotFound("tab".to_string()));

        assert_eq!(
            classify_message("group", "Error: No group with id: 7"),
            ExtensionError::NotFound("group".to_string())
        );
        assert_eq!(
            classify_message("window", "No window with id: 3"),
            ExtensionError::NotFound("window".to_string())
        );
    }

    #[test]
    fn test_other_failures_classify_as_host_api() {
        let err = classify_message("group update", "Tabs cannot be edited right now");
        assert_eq!(
            err,
            ExtensionError::host_api("group update", "Tabs cannot be edited right now")
        );
    }

    #[test]
    fn test_into_stale_only_remaps_not_found() {
        let err = classify_message("tab", "No tab with id: 42.").into_stale("last active tab 42");
        assert_eq!(err, ExtensionError::StaleReference("last active tab 42".to_string()));

        let err = classify_message("tab", "quota exceeded").into_stale("last active tab 42");
        assert_eq!(err, ExtensionError::host_api("tab", "quota exceeded"));
    }

    #[test]
    fn test_empty_group_message() {
        assert_eq!(
            ExtensionError::EmptyGroup.to_string(),
            "Cannot archive an empty group."
        );
    }
}
