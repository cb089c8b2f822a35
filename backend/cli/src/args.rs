//! Arguments shared by several subcommands.

use clap::Args;
use serde_json::Value;

use showroom_console::{ListView, SortOrder};

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive text to look for
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl ListArgs {
    pub fn view(&self) -> ListView {
        match &self.sort {
            Some(field) => {
                let order = if self.desc { SortOrder::Desc } else { SortOrder::Asc };
                ListView::sorted_by(field.as_str(), order)
            }
            None => ListView::default(),
        }
    }
}

/// Row ids are numeric in most tables and text (UUID) in others.
pub fn parse_id(raw: &str) -> Value {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Parse repeated `column=value` pairs into an update row.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), json!(42));
        assert_eq!(parse_id(" 7c9e-11 "), json!("7c9e-11"));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("requirements=Sofa, 3 seats").unwrap(),
            ("requirements".to_string(), "Sofa, 3 seats".to_string())
        );
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("city").is_err());
    }

    #[test]
    fn test_view_defaults_to_fetch_order() {
        assert_eq!(ListArgs::default().view(), ListView::default());
        let args = ListArgs {
            sort: Some("price".into()),
            desc: true,
            ..Default::default()
        };
        assert_eq!(args.view(), ListView::sorted_by("price", SortOrder::Desc));
    }
}
