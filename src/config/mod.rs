use leptos::logging::warn;
use serde::{Deserialize, Serialize};

/// Runtime settings read from `window.ENV`.
///
/// The host page may already define `window.ENV` for its own needs; unknown
/// keys are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Log every structural edit to the console.
    #[serde(rename = "CHECKLIST_DEBUG", default)]
    pub debug: bool,

    /// Delay caret placement with a timer of this many ms instead of waiting
    /// for the next animation frame.
    #[serde(rename = "CHECKLIST_CARET_DELAY_MS", default)]
    pub caret_delay_ms: Option<u32>,

    /// Mount the demo note page on start.
    #[serde(rename = "CHECKLIST_DEMO", default)]
    pub mount_demo: bool,
}

impl EnvConfig {
    pub fn new() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Some(env) = window.get("ENV") else {
            return Self::default();
        };
        if env.is_undefined() || !env.is_object() {
            return Self::default();
        }

        match js_sys::JSON::stringify(&env).ok().and_then(|s| s.as_string()) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            warn!("[checklist] ignoring malformed window.ENV: {e}");
            Self::default()
        })
    }
}
