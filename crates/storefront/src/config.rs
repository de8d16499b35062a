//! Storefront configuration from environment variables.

use std::path::PathBuf;

use thiserror::Error;

use boutique_session::FileStore;

pub const API_URL_VAR: &str = "BOUTIQUE_API_URL";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "BOUTIQUE_LOW_STOCK_THRESHOLD";
pub const DATA_DIR_VAR: &str = "BOUTIQUE_DATA_DIR";

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Base URL of the external catalog service (image uploads are served from it).
    pub api_url: String,
    /// Stock at or below which a product shows the "last units" badge.
    pub low_stock_threshold: u32,
    /// Directory of the file-backed session store.
    pub data_dir: PathBuf,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            data_dir: default_data_dir(),
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank variables fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_url = match get(API_URL_VAR) {
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: API_URL_VAR,
                        reason: format!("expected an http(s) URL, got {url:?}"),
                    });
                }
                url
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let low_stock_threshold = match get(LOW_STOCK_THRESHOLD_VAR) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: LOW_STOCK_THRESHOLD_VAR,
                reason: e.to_string(),
            })?,
            None => DEFAULT_LOW_STOCK_THRESHOLD,
        };

        let data_dir = get(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_url,
            low_stock_threshold,
            data_dir,
        })
    }

    pub fn session_store(&self) -> FileStore {
        FileStore::new(self.data_dir.clone())
    }
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("boutique")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.low_stock_threshold, 5);
        assert!(config.data_dir.ends_with("boutique"));
    }

    #[test]
    fn variables_override_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.boutique.test/"),
            (LOW_STOCK_THRESHOLD_VAR, " 2 "),
            (DATA_DIR_VAR, "/tmp/boutique-session"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.boutique.test");
        assert_eq!(config.low_stock_threshold, 2);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/boutique-session"));
        assert_eq!(config.session_store().dir(), config.data_dir.as_path());
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = StorefrontConfig::from_lookup(lookup(&[(LOW_STOCK_THRESHOLD_VAR, "few")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == LOW_STOCK_THRESHOLD_VAR));

        let err =
            StorefrontConfig::from_lookup(lookup(&[(API_URL_VAR, "localhost:3000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == API_URL_VAR));
    }

    #[test]
    fn blank_variables_count_as_unset() {
        let config = StorefrontConfig::from_lookup(lookup(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
    }
}
