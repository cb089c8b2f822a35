//! `showroom admins` subcommands.

use anyhow::Result;
use clap::Subcommand;

use showroom_console::row::id_text;
use showroom_console::{Admin, BookEntry, Console, SessionContext};
use showroom_core::Role;

use crate::args::{parse_id, ListArgs};
use crate::terminal_output::{blank, print_notice, render_table, Column};

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value.trim()).ok_or_else(|| format!("unknown role '{value}' (admin, superadmin)"))
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List admins
    List(ListArgs),
    /// Grant console access to a registered user (superadmin only)
    Add {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role, default_value = "admin")]
        role: Role,
    },
    /// Revoke console access (superadmin only)
    Remove { admin_id: String },
}

pub async fn run(console: &Console, session: &SessionContext, cmd: AdminCommands) -> Result<()> {
    let roster = console.admins();
    match cmd {
        AdminCommands::List(args) => {
            let admins = roster.list().await?;
            let rows: Vec<Vec<String>> = args
                .view()
                .apply(&admins, &args.search, Admin::SEARCH_FIELDS)
                .into_iter()
                .map(|a| {
                    vec![
                        id_text(&a.admin_id),
                        a.email.clone().unwrap_or_else(blank),
                        a.role.clone().unwrap_or_else(blank),
                    ]
                })
                .collect();
            print!(
                "{}",
                render_table(
                    &[Column::left("Admin ID"), Column::left("Email"), Column::left("Role")],
                    &rows
                )
            );
        }
        AdminCommands::Add { email, role } => {
            let notice = roster.add(session, &email, role).await?;
            print_notice(&notice);
        }
        AdminCommands::Remove { admin_id } => {
            let notice = roster.remove(session, &parse_id(&admin_id)).await?;
            print_notice(&notice);
        }
    }
    Ok(())
}
