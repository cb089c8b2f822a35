//! Config defaults: applies default values to a parsed config.

use crate::schema::{CatalogConfig, LoggingConfig, ShowroomConfig, StorageConfig};

/// Bucket holding every record type's media.
pub const DEFAULT_BUCKET: &str = "product-images";

/// `Cache-Control: max-age` for uploads.
pub const DEFAULT_CACHE_CONTROL_SECS: u64 = 3600;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directory (relative to the config dir) for rolling log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

pub fn default_product_categories() -> Vec<String> {
    ["Living Room", "Bedroom", "Office", "Kitchen"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ShowroomConfig) -> ShowroomConfig {
    let config = apply_storage_defaults(config);
    let config = apply_logging_defaults(config);
    apply_catalog_defaults(config)
}

fn apply_storage_defaults(mut config: ShowroomConfig) -> ShowroomConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    if storage.bucket.is_none() {
        storage.bucket = Some(DEFAULT_BUCKET.to_string());
    }
    if storage.cache_control_secs.is_none() {
        storage.cache_control_secs = Some(DEFAULT_CACHE_CONTROL_SECS);
    }
    config
}

fn apply_logging_defaults(mut config: ShowroomConfig) -> ShowroomConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(DEFAULT_LOG_DIR.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

fn apply_catalog_defaults(mut config: ShowroomConfig) -> ShowroomConfig {
    let catalog = config.catalog.get_or_insert_with(CatalogConfig::default);
    if catalog.product_categories.is_empty() {
        catalog.product_categories = default_product_categories();
    }
    config
}
