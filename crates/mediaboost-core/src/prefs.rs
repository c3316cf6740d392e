//! Per-site preferences persisted by the host extension.
//!
//! The core never reads these on its own. A host loads the preference for
//! the active site and replays it as a [`DesiredConfig`].

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, DesiredConfig, EqualizerSetting};

const SITE_KEY_PREFIX: &str = "volume_";
const DEFAULT_SITE: &str = "default";

/// The equalizer mode name that means "no equalizer".
pub const EQUALIZER_MODE_OFF: &str = "off";

/// The storage key for a site, derived from the hostname of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey(String);

impl SiteKey {
    /// The key used when a page has no usable hostname.
    pub fn fallback() -> Self {
        Self(format!("{SITE_KEY_PREFIX}{DEFAULT_SITE}"))
    }

    pub fn from_hostname(hostname: &str) -> Self {
        Self(format!("{SITE_KEY_PREFIX}{}", hostname.to_ascii_lowercase()))
    }

    /// Derive the key from a page URL, falling back to
    /// [`SiteKey::fallback`] if no hostname can be found.
    ///
    /// The URL is parsed the way a browser parses it, so internationalized
    /// hostnames end up in their punycode form.
    pub fn from_url(url: &str) -> Self {
        Url::parse(url.trim())
            .ok()
            .and_then(|url| {
                url.host_str()
                    .filter(|host| !host.is_empty())
                    .map(Self::from_hostname)
            })
            .unwrap_or_else(Self::fallback)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The last settings a user chose to remember for a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePreference {
    pub volume: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equalizer_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equalizer_values: Option<Vec<f32>>,
}

impl SitePreference {
    pub fn from_desired_config(config: &DesiredConfig, equalizer_mode: Option<&str>) -> Self {
        let equalizer_values = config.equalizer.gains().map(|g| g.to_vec());
        let equalizer_mode = match equalizer_values {
            Some(_) => equalizer_mode.map(str::to_owned),
            None => Some(EQUALIZER_MODE_OFF.to_owned()),
        };

        Self {
            volume: config.volume_percent,
            equalizer_mode,
            equalizer_values,
        }
    }

    /// The configuration to replay when the site is loaded again.
    ///
    /// The equalizer is enabled only when explicit band values were
    /// stored and the mode is not [`EQUALIZER_MODE_OFF`].
    pub fn to_desired_config(&self) -> DesiredConfig {
        let equalizer = match (&self.equalizer_mode, &self.equalizer_values) {
            (Some(mode), _) if mode == EQUALIZER_MODE_OFF => EqualizerSetting::Disabled,
            (_, Some(values)) => EqualizerSetting::enabled(values),
            (_, None) => EqualizerSetting::Disabled,
        };

        DesiredConfig {
            volume_percent: self.volume,
            equalizer,
        }
    }
}

/// Storage for [`SitePreference`]s, keyed by [`SiteKey`].
pub trait SitePreferenceStore {
    fn load(&self, key: &SiteKey) -> Result<Option<SitePreference>, ConfigError>;

    fn save(&mut self, key: &SiteKey, pref: &SitePreference) -> Result<(), ConfigError>;

    /// Remove the preference for a site. Returns `true` if one existed.
    fn remove(&mut self, key: &SiteKey) -> bool;
}

/// A [`SitePreferenceStore`] that keeps serialized preferences in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    entries: AHashMap<SiteKey, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw serialized value stored under a key.
    pub fn raw(&self, key: &SiteKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert_raw(&mut self, key: SiteKey, json: impl Into<String>) {
        self.entries.insert(key, json.into());
    }
}

impl SitePreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &SiteKey) -> Result<Option<SitePreference>, ConfigError> {
        self.entries
            .get(key)
            .map(|json| serde_json::from_str(json).map_err(ConfigError::from))
            .transpose()
    }

    fn save(&mut self, key: &SiteKey, pref: &SitePreference) -> Result<(), ConfigError> {
        let json = serde_json::to_string(pref)?;
        self.entries.insert(key.clone(), json);
        Ok(())
    }

    fn remove(&mut self, key: &SiteKey) -> bool {
        self.entries.remove(key).is_some()
    }
}
