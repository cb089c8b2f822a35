mod admins_cmd;
mod args;
mod auth_cmd;
mod config;
mod config_cmd;
mod records_cmd;
mod tables_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use showroom_config::validate;
use showroom_core::Notice;
use showroom_logging::init_logger;

use admins_cmd::AdminCommands;
use config::AppContext;
use config_cmd::ConfigCommands;
use records_cmd::{GalleryCommands, ProductCommands, StoryCommands, TeamCommands};
use tables_cmd::TableCommands;
use terminal_output::{note_warn, print_notice};

#[derive(Parser)]
#[command(name = "showroom")]
#[command(about = "Showroom admin console: catalog, gallery, stories, team, and customers")]
#[command(version)]
struct Cli {
    /// Config directory (defaults to $SHOWROOM_CONFIG_DIR or ~/.showroom)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as an admin
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Register a new user (an admin must then grant access)
    Signup {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Manage products
    #[command(subcommand)]
    Products(ProductCommands),
    /// Manage gallery projects
    #[command(subcommand)]
    Gallery(GalleryCommands),
    /// Manage stories
    #[command(subcommand)]
    Stories(StoryCommands),
    /// Manage team members
    #[command(subcommand)]
    Team(TeamCommands),
    /// Customer quote requests
    #[command(subcommand)]
    Quotes(TableCommands),
    /// Customer profiles
    #[command(subcommand)]
    Profiles(TableCommands),
    /// Console admins
    #[command(subcommand)]
    Admins(AdminCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(showroom_config::config_dir);

    let ctx = match AppContext::load(config_dir).await {
        Ok(ctx) => ctx,
        Err(e) => return fail(&e),
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| ctx.config.log_level().to_string());
    let _guard = match init_logger(ctx.log_dir(), &level, ctx.json_logs()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            note_warn(&format!("File logging disabled: {e:#}"));
            None
        }
    };

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(e: &anyhow::Error) -> ExitCode {
    error!(error = %format!("{e:#}"), "Command failed");
    print_notice(&Notice::error(format!("{e:#}")));
    ExitCode::FAILURE
}

/// Refuse to talk to the backend with a config that has errors.
fn require_valid_config(ctx: &AppContext) -> Result<()> {
    let report = validate(&ctx.config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    if !report.is_valid() {
        let problems: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        bail!(
            "Invalid config ({}); run `showroom config validate`:\n  {}",
            ctx.config_path().display(),
            problems.join("\n  ")
        );
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    if let Commands::Config(cmd) = command {
        return config_cmd::run(ctx, cmd).await;
    }
    require_valid_config(ctx)?;

    match command {
        Commands::Login { email, password } => auth_cmd::login(ctx, &email, password).await,
        Commands::Logout => auth_cmd::logout(ctx).await,
        Commands::Whoami => auth_cmd::whoami(ctx).await,
        Commands::Signup { email, password } => auth_cmd::signup(ctx, &email, password).await,
        Commands::Config(_) => unreachable!("handled above"),
        command => {
            let session = ctx.load_session().await?;
            let console = ctx.console(&session)?;
            info!(role = %session.role(), "Running console command");
            match command {
                Commands::Products(cmd) => records_cmd::products(&console, cmd).await,
                Commands::Gallery(cmd) => records_cmd::gallery(&console, cmd).await,
                Commands::Stories(cmd) => records_cmd::stories(&console, cmd).await,
                Commands::Team(cmd) => records_cmd::team(&console, cmd).await,
                Commands::Quotes(cmd) => tables_cmd::quotes(&console, cmd).await,
                Commands::Profiles(cmd) => tables_cmd::profiles(&console, cmd).await,
                Commands::Admins(cmd) => admins_cmd::run(&console, &session, cmd).await,
                _ => unreachable!("session-free commands are handled above"),
            }
        }
    }
}
