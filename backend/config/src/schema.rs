//! Showroom console configuration schema.
//!
//! Every section is optional in the file; [`crate::defaults`] fills the gaps.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root of `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowroomConfig {
    /// Hosted backend endpoint and project key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    /// Media bucket settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Product catalog settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abcd.supabase.co`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Public (anon) project key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// `Cache-Control: max-age` for uploaded objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `trace` | `debug` | `info` | `warn` | `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling NDJSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Emit JSON on the console as well
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Allowed values of a product's `category`
    #[serde(default)]
    pub product_categories: Vec<String>,
}

impl ShowroomConfig {
    pub fn backend_url(&self) -> Option<&str> {
        self.backend.as_ref()?.url.as_deref()
    }

    pub fn anon_key(&self) -> Option<&str> {
        self.backend.as_ref()?.anon_key.as_deref()
    }

    pub fn bucket(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.bucket.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_BUCKET)
    }

    pub fn cache_control_secs(&self) -> u64 {
        self.storage
            .as_ref()
            .and_then(|s| s.cache_control_secs)
            .unwrap_or(crate::defaults::DEFAULT_CACHE_CONTROL_SECS)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }

    pub fn product_categories(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(|c| c.product_categories.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(crate::defaults::default_product_categories)
    }
}
