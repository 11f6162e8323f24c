//! Tracking configuration.
//!
//! [`TrackingConfig`] is the resolved, immutable configuration a dispatcher
//! mount runs with. Callers supply a partial [`TrackingOptions`] which is
//! merged field by field over the defaults.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default quiet period before an input edit is emitted.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Default snapshot text limit, in characters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 100;

const DEFAULT_SKIP_TAGS: &[&str] = &["html", "body", "script", "style"];
const DEFAULT_SKIP_CLASSES: &[&str] = &["no-audit", "no-track"];

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lowercase_set(items: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    items.into_iter().map(|s| s.trim().to_ascii_lowercase()).collect()
}

/// Which elements are audit-worthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Tags never tracked (lower-case).
    pub skip_tags: BTreeSet<String>,
    /// Classes that opt an element out.
    pub skip_classes: BTreeSet<String>,
    /// Ids never tracked.
    pub skip_ids: BTreeSet<String>,
    /// When set, only these tags are tracked.
    pub track_only_tags: Option<BTreeSet<String>>,
    /// When set, only elements carrying one of these classes are tracked.
    pub track_only_classes: Option<BTreeSet<String>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_tags: set_of(DEFAULT_SKIP_TAGS),
            skip_classes: set_of(DEFAULT_SKIP_CLASSES),
            skip_ids: BTreeSet::new(),
            track_only_tags: None,
            track_only_classes: None,
        }
    }
}

/// What a record may reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyConfig {
    /// Include submitted form values.
    pub log_form_values: bool,
    /// Include literal input values (never for passwords).
    pub log_input_values: bool,
    /// Snapshot text limit, in characters.
    pub max_text_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            log_form_values: false,
            log_input_values: false,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

/// Resolved tracking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    pub enable_route_tracking: bool,
    pub enable_click_tracking: bool,
    pub enable_form_tracking: bool,
    pub enable_input_tracking: bool,
    /// Quiet period for input edits, in milliseconds.
    pub debounce_time: u64,
    pub filter: FilterConfig,
    pub privacy: PrivacyConfig,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enable_route_tracking: true,
            enable_click_tracking: true,
            enable_form_tracking: true,
            enable_input_tracking: true,
            debounce_time: DEFAULT_DEBOUNCE_MS,
            filter: FilterConfig::default(),
            privacy: PrivacyConfig::default(),
        }
    }
}

impl TrackingConfig {
    /// Debounce period as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_time)
    }
}

/// Partial [`FilterConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub skip_tags: Option<Vec<String>>,
    pub skip_classes: Option<Vec<String>>,
    pub skip_ids: Option<Vec<String>>,
    pub track_only_tags: Option<Vec<String>>,
    pub track_only_classes: Option<Vec<String>>,
}

/// Partial [`PrivacyConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyOptions {
    pub log_form_values: Option<bool>,
    pub log_input_values: Option<bool>,
    pub max_text_length: Option<usize>,
}

/// Caller-supplied options; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingOptions {
    pub enable_route_tracking: Option<bool>,
    pub enable_click_tracking: Option<bool>,
    pub enable_form_tracking: Option<bool>,
    pub enable_input_tracking: Option<bool>,
    pub debounce_time: Option<u64>,
    pub filter: FilterOptions,
    pub privacy: PrivacyOptions,
}

impl TrackingOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Parse options from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)
    }

    /// Merge over the defaults.
    pub fn resolve(self) -> TrackingConfig {
        self.merge_over(TrackingConfig::default())
    }

    /// Merge over `base`, field by field.
    pub fn merge_over(self, base: TrackingConfig) -> TrackingConfig {
        let filter = self.filter;
        let privacy = self.privacy;

        TrackingConfig {
            enable_route_tracking: self.enable_route_tracking.unwrap_or(base.enable_route_tracking),
            enable_click_tracking: self.enable_click_tracking.unwrap_or(base.enable_click_tracking),
            enable_form_tracking: self.enable_form_tracking.unwrap_or(base.enable_form_tracking),
            enable_input_tracking: self.enable_input_tracking.unwrap_or(base.enable_input_tracking),
            debounce_time: self.debounce_time.unwrap_or(base.debounce_time),
            filter: FilterConfig {
                skip_tags: filter.skip_tags.map(lowercase_set).unwrap_or(base.filter.skip_tags),
                skip_classes: filter
                    .skip_classes
                    .map(|v| v.into_iter().collect())
                    .unwrap_or(base.filter.skip_classes),
                skip_ids: filter
                    .skip_ids
                    .map(|v| v.into_iter().collect())
                    .unwrap_or(base.filter.skip_ids),
                track_only_tags: filter
                    .track_only_tags
                    .map(lowercase_set)
                    .or(base.filter.track_only_tags),
                track_only_classes: filter
                    .track_only_classes
                    .map(|v| v.into_iter().collect())
                    .or(base.filter.track_only_classes),
            },
            privacy: PrivacyConfig {
                log_form_values: privacy.log_form_values.unwrap_or(base.privacy.log_form_values),
                log_input_values: privacy.log_input_values.unwrap_or(base.privacy.log_input_values),
                max_text_length: privacy.max_text_length.unwrap_or(base.privacy.max_text_length),
            },
        }
    }
}

impl From<TrackingOptions> for TrackingConfig {
    fn from(options: TrackingOptions) -> Self {
        options.resolve()
    }
}
