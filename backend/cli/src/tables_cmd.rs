//! Subcommands for customer tables without media: quotes and profiles.

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;

use showroom_console::row::id_text;
use showroom_console::{BookEntry, Console, Profile, Quote, TableBook};
use showroom_core::Row;

use crate::args::{parse_assignment, parse_id, ListArgs};
use crate::terminal_output::{blank, note_info, print_notice, render_table, truncate, Column};

#[derive(Subcommand)]
pub enum TableCommands {
    /// List rows, newest first unless sorted
    List(ListArgs),
    /// Overwrite columns of one row
    Update {
        id: String,
        /// COLUMN=VALUE to write (repeatable)
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    /// Delete one row
    Delete { id: String },
}

fn cell(value: &Option<String>, max: usize) -> String {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => truncate(text, max),
        _ => blank(),
    }
}

fn quote_row(q: &Quote) -> Vec<String> {
    vec![
        id_text(&q.id),
        cell(&q.name, 24),
        cell(&q.email, 32),
        cell(&q.phone, 16),
        cell(&q.requirements, 40),
        truncate(q.address().trim(), 40),
    ]
}

fn profile_row(p: &Profile) -> Vec<String> {
    vec![
        id_text(&p.id),
        cell(&p.full_name, 24),
        cell(&p.email, 32),
        cell(&p.phone, 16),
        truncate(p.address().trim(), 40),
    ]
}

async fn run_table<T: BookEntry>(
    book: TableBook<T>,
    cmd: TableCommands,
    columns: &[Column],
    to_row: fn(&T) -> Vec<String>,
) -> Result<()> {
    match cmd {
        TableCommands::List(args) => {
            let entries = book.list().await?;
            let rows: Vec<Vec<String>> = args
                .view()
                .apply(&entries, &args.search, T::SEARCH_FIELDS)
                .into_iter()
                .map(to_row)
                .collect();
            if rows.is_empty() {
                note_info("Nothing to show");
            } else {
                print!("{}", render_table(columns, &rows));
            }
        }
        TableCommands::Update { id, set } => {
            let changes: Row = set
                .into_iter()
                .map(|(column, value)| (column, Value::String(value)))
                .collect();
            let notice = book.update(&parse_id(&id), changes).await?;
            print_notice(&notice);
        }
        TableCommands::Delete { id } => {
            let notice = book.delete(&parse_id(&id)).await?;
            print_notice(&notice);
        }
    }
    Ok(())
}

pub async fn quotes(console: &Console, cmd: TableCommands) -> Result<()> {
    let columns = [
        Column::left("ID"),
        Column::left("Name"),
        Column::left("Email"),
        Column::left("Phone"),
        Column::left("Requirements"),
        Column::left("Address"),
    ];
    run_table(console.quotes(), cmd, &columns, quote_row).await
}

pub async fn profiles(console: &Console, cmd: TableCommands) -> Result<()> {
    let columns = [
        Column::left("ID"),
        Column::left("Name"),
        Column::left("Email"),
        Column::left("Phone"),
        Column::left("Address"),
    ];
    run_table(console.profiles(), cmd, &columns, profile_row).await
}
