use serde::{Deserialize, Serialize};

/// Id of the optional `<script type="application/json">` element holding
/// overrides for [`TrackerConfig`].
pub const CONFIG_ELEMENT_ID: &str = "tracker-config";

/// Leaflet popup options applied to every workout marker.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopupConfig {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Storage key the workout list is saved under.
    pub storage_key: String,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub popup: PopupConfig,
    /// How long the form stays `display: none` after a submit.
    pub form_reset_delay_ms: u64,
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: "workouts".to_string(),
            zoom: 13,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            popup: PopupConfig::default(),
            form_reset_delay_ms: 1000,
            log_level: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid tracker config: {}", e))
    }

    /// Read overrides from the host page.
    ///
    /// Returns the config in effect plus the parse error, if any, so the
    /// caller can report it once logging is up.
    pub fn load() -> (Self, Option<String>) {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content())
            .filter(|t| !t.trim().is_empty());

        match text {
            Some(json) => match Self::from_json(&json) {
                Ok(config) => (config, None),
                Err(e) => (Self::default(), Some(e)),
            },
            None => (Self::default(), None),
        }
    }
}
