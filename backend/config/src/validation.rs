//! Config validation: field checks with user-friendly messages.

use crate::schema::ShowroomConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ShowroomConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_backend(config, &mut report);
    validate_storage(config, &mut report);
    validate_logging(config, &mut report);
    validate_catalog(config, &mut report);
    report
}

fn validate_backend(config: &ShowroomConfig, report: &mut ValidationReport) {
    match config.backend_url() {
        None | Some("") => report.error("backend.url", "Backend URL is required"),
        Some(url) if !url.starts_with("https://") && !url.starts_with("http://") => {
            report.error("backend.url", format!("'{url}' is not an http(s) URL"));
        }
        Some(url) if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") => {
            report.warn("backend.url", "Plain http to a remote host sends tokens unencrypted");
        }
        _ => {}
    }
    if config.anon_key().map(str::is_empty).unwrap_or(true) {
        report.error("backend.anonKey", "Project anon key is required");
    }
}

fn validate_storage(config: &ShowroomConfig, report: &mut ValidationReport) {
    let bucket = config.bucket();
    if bucket.trim().is_empty() {
        report.error("storage.bucket", "Bucket name cannot be empty");
    } else if bucket.contains('/') {
        report.error("storage.bucket", "Bucket name cannot contain '/'");
    }
}

fn validate_logging(config: &ShowroomConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    if !matches!(level, "trace" | "debug" | "info" | "warn" | "error") {
        report.warn(
            "logging.level",
            format!("Unknown level '{level}'; RUST_LOG-style directives are passed through as-is"),
        );
    }
}

fn validate_catalog(config: &ShowroomConfig, report: &mut ValidationReport) {
    let Some(catalog) = &config.catalog else { return };
    for (i, category) in catalog.product_categories.iter().enumerate() {
        if category.trim().is_empty() {
            report.error(format!("catalog.productCategories[{i}]"), "Category cannot be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BackendConfig;

    fn configured() -> ShowroomConfig {
        ShowroomConfig {
            backend: Some(BackendConfig {
                url: Some("https://abcd.supabase.co".to_string()),
                anon_key: Some("anon".to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn configured_backend_is_valid() {
        let report = validate(&configured());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn missing_backend_is_error() {
        let report = validate(&ShowroomConfig::default());
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.path == "backend.url"));
        assert!(report.errors.iter().any(|e| e.path == "backend.anonKey"));
    }

    #[test]
    fn remote_plain_http_is_warning() {
        let mut cfg = configured();
        cfg.backend.as_mut().unwrap().url = Some("http://db.example.com".to_string());
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "backend.url");
    }
}
