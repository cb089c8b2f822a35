//! `${VAR}` substitution in config values, plus the well-known variables that
//! override individual settings.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are recognised. `$${VAR}` is an
//! escape for a literal `${VAR}`.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{BackendConfig, ShowroomConfig, StorageConfig};

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Backend URL override.
pub const ENV_BACKEND_URL: &str = "SUPABASE_URL";
/// Project anon key override.
pub const ENV_ANON_KEY: &str = "SUPABASE_ANON_KEY";
/// Bucket override.
pub const ENV_BUCKET: &str = "SHOWROOM_BUCKET";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references across a config value tree using the
/// process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute(value, env, "")?)
}

fn substitute(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_str(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                out.insert(key.clone(), substitute(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn substitute_str(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }
    let mut missing = None;
    let out = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });
    match missing {
        Some(err) => Err(err),
        None => Ok(out.into_owned()),
    }
}

/// Apply `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SHOWROOM_BUCKET` on top of
/// the file's values. Empty variables are ignored.
pub fn apply_env_overrides(config: ShowroomConfig) -> ShowroomConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

pub fn apply_env_overrides_with(
    mut config: ShowroomConfig,
    env: &HashMap<String, String>,
) -> ShowroomConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();

    if let Some(url) = get(ENV_BACKEND_URL) {
        config.backend.get_or_insert_with(BackendConfig::default).url = Some(url);
    }
    if let Some(key) = get(ENV_ANON_KEY) {
        config.backend.get_or_insert_with(BackendConfig::default).anon_key = Some(key);
    }
    if let Some(bucket) = get(ENV_BUCKET) {
        config.storage.get_or_insert_with(StorageConfig::default).bucket = Some(bucket);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_reference() {
        let v = json!({"backend": {"anonKey": "${SUPABASE_ANON_KEY}"}});
        let out = resolve_env_vars_with(&v, &env(&[("SUPABASE_ANON_KEY", "eyJ-anon")])).unwrap();
        assert_eq!(out["backend"]["anonKey"], "eyJ-anon");
    }

    #[test]
    fn missing_var_names_path() {
        let v = json!({"backend": {"url": "https://${PROJECT_REF}.supabase.co"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("PROJECT_REF"));
        assert!(err.contains("backend.url"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "$${NOT_A_VAR}"});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["note"], "${NOT_A_VAR}");
    }

    #[test]
    fn overrides_win_over_file() {
        let mut cfg = ShowroomConfig::default();
        cfg.backend = Some(BackendConfig {
            url: Some("https://file.supabase.co".to_string()),
            anon_key: Some("file-key".to_string()),
        });
        let cfg = apply_env_overrides_with(
            cfg,
            &env(&[(ENV_BACKEND_URL, "https://env.supabase.co"), (ENV_ANON_KEY, ""), (ENV_BUCKET, "media")]),
        );
        assert_eq!(cfg.backend_url(), Some("https://env.supabase.co"));
        assert_eq!(cfg.anon_key(), Some("file-key"));
        assert_eq!(cfg.bucket(), "media");
    }
}
