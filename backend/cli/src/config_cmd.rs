//! `showroom config` subcommands.

use anyhow::{bail, Result};
use clap::Subcommand;

use showroom_config::{collect_redacted_paths, redact, validate};

use crate::config::AppContext;
use crate::terminal_output::{note_error, note_success, note_warn};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config with secrets masked
    Show,
    /// Print the config file location
    Path,
    /// Check the config and report problems
    Validate,
}

pub async fn run(ctx: &AppContext, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let value = serde_json::to_value(&ctx.config)?;
            let masked = redact(&value);
            print!("{}", serde_yaml::to_string(&masked)?);
            let hidden = collect_redacted_paths(&value);
            if !hidden.is_empty() {
                eprintln!("# masked: {}", hidden.join(", "));
            }
        }
        ConfigCommands::Path => {
            println!("{}", ctx.config_path().display());
        }
        ConfigCommands::Validate => {
            let report = validate(&ctx.config);
            for warning in &report.warnings {
                note_warn(&format!("{}: {}", warning.path, warning.message));
            }
            for error in &report.errors {
                note_error(&format!("{}: {}", error.path, error.message));
            }
            if !report.is_valid() {
                bail!("{} config error(s)", report.errors.len());
            }
            note_success("Config is valid");
        }
    }
    Ok(())
}
