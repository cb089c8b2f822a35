//! Subcommands for the four screens whose records carry media: products,
//! gallery projects, stories, and team members.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;

use showroom_console::row::id_text;
use showroom_console::{
    parse_expiry, Console, Editor, GalleryProject, MediaRecord, Product, ProjectSize,
    ProjectType, Story, TeamMember,
};
use showroom_media::{LocalFile, MediaReference};

use crate::args::{parse_id, ListArgs};
use crate::terminal_output::{blank, note_info, note_warn, print_notice, render_table, truncate, Column};

const PRODUCT_FIELDS: &[&str] = &["name", "category", "price"];
const GALLERY_FIELDS: &[&str] = &["title", "description", "type"];
const STORY_FIELDS: &[&str] = &["title", "description"];
const TEAM_FIELDS: &[&str] = &["name", "role"];

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products
    List(ListArgs),
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        category: String,
        /// Image to upload (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Change a product; new files are added after the existing images
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Position (from 0) of an existing image to drop (repeatable)
        #[arg(long = "detach")]
        detach: Vec<usize>,
    },
    /// Delete a product and its images
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum GalleryCommands {
    /// List gallery projects
    List(ListArgs),
    /// Add a project
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long = "type", value_parser = ProjectType::parse, default_value = "image")]
        project_type: ProjectType,
        #[arg(long, value_parser = ProjectSize::parse, default_value = "medium")]
        size: ProjectSize,
        /// Photo or video to upload (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Change a project; new files are added after the existing media
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", value_parser = ProjectType::parse)]
        project_type: Option<ProjectType>,
        #[arg(long, value_parser = ProjectSize::parse)]
        size: Option<ProjectSize>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        #[arg(long = "detach")]
        detach: Vec<usize>,
    },
    /// Delete a project and its media
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum StoryCommands {
    /// List stories
    List(ListArgs),
    /// Add a story
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// RFC 3339 or YYYY-MM-DDTHH:MM (UTC)
        #[arg(long, value_parser = parse_expiry)]
        expires_at: Option<DateTime<Utc>>,
        /// Photo or video to show
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Change a story; a new file replaces the current one
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_expiry, conflicts_with = "no_expiry")]
        expires_at: Option<DateTime<Utc>>,
        /// Keep the story up indefinitely
        #[arg(long)]
        no_expiry: bool,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a story and its media
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List team members
    List(ListArgs),
    /// Add a team member
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        /// Portrait to upload
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Change a team member; a new file replaces the portrait
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a team member and their portrait
    Delete { id: String },
}

async fn attach_files<R: MediaRecord>(editor: &mut Editor<R>, files: &[PathBuf]) -> Result<()> {
    for path in files {
        let file = LocalFile::read(path).await?;
        editor
            .attach(file)
            .with_context(|| format!("Cannot attach {}", path.display()))?;
    }
    Ok(())
}

/// Drop existing media by position, highest first so earlier positions hold.
fn detach_positions<R: MediaRecord>(editor: &mut Editor<R>, mut positions: Vec<usize>) -> Result<()> {
    positions.sort_unstable_by(|a, b| b.cmp(a));
    positions.dedup();
    for position in positions {
        let entry = editor.detach(position)?;
        note_info(&format!("Detached {}", entry.raw));
    }
    Ok(())
}

async fn fetch<R: MediaRecord>(editor: &mut Editor<R>, id: &str) -> Result<R> {
    editor.refresh().await?;
    editor
        .find(&parse_id(id))
        .cloned()
        .with_context(|| format!("No {} with id {id}", R::LABEL.to_lowercase()))
}

async fn submit<R: MediaRecord>(editor: &mut Editor<R>) -> Result<()> {
    let notice = editor.submit().await?;
    print_notice(&notice);
    Ok(())
}

async fn delete<R: MediaRecord>(editor: &mut Editor<R>, id: &str) -> Result<()> {
    let record = fetch(editor, id).await?;
    let outcome = editor.delete(&record).await?;
    for path in &outcome.cleanup_failed {
        note_warn(&format!("Still in storage: {path}"));
    }
    print_notice(&outcome.notice);
    Ok(())
}

fn id_cell(id: Option<&serde_json::Value>) -> String {
    id.map(id_text).unwrap_or_else(blank)
}

fn first_url(media: &MediaReference) -> String {
    media
        .first()
        .map(|entry| truncate(&entry.resolved_url, 60))
        .unwrap_or_else(blank)
}

fn print_table(columns: &[Column], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        note_info("Nothing to show");
        return;
    }
    print!("{}", render_table(columns, &rows));
}

pub async fn products(console: &Console, cmd: ProductCommands) -> Result<()> {
    let mut editor = console.products();
    match cmd {
        ProductCommands::List(args) => {
            editor.refresh().await?;
            let rows = args
                .view()
                .apply(editor.records(), &args.search, PRODUCT_FIELDS)
                .into_iter()
                .map(|p| {
                    vec![
                        id_cell(p.id.as_ref()),
                        truncate(&p.name, 32),
                        format!("{:.2}", p.price),
                        p.category.clone(),
                        p.images.len().to_string(),
                        first_url(&p.images),
                    ]
                })
                .collect();
            print_table(
                &[
                    Column::left("ID"),
                    Column::left("Name"),
                    Column::right("Price"),
                    Column::left("Category"),
                    Column::right("Images"),
                    Column::left("Cover"),
                ],
                rows,
            );
        }
        ProductCommands::Add { name, price, category, files } => {
            editor.begin_new(Product::new(name, price, category))?;
            attach_files(&mut editor, &files).await?;
            submit(&mut editor).await?;
        }
        ProductCommands::Update { id, name, price, category, files, detach } => {
            let record = fetch(&mut editor, &id).await?;
            editor.begin_edit(record)?;
            if let Some(draft) = editor.draft_mut() {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(price) = price {
                    draft.price = price;
                }
                if let Some(category) = category {
                    draft.category = category;
                }
            }
            detach_positions(&mut editor, detach)?;
            attach_files(&mut editor, &files).await?;
            submit(&mut editor).await?;
        }
        ProductCommands::Delete { id } => delete(&mut editor, &id).await?,
    }
    Ok(())
}

pub async fn gallery(console: &Console, cmd: GalleryCommands) -> Result<()> {
    let mut editor = console.gallery();
    match cmd {
        GalleryCommands::List(args) => {
            editor.refresh().await?;
            let rows = args
                .view()
                .apply(editor.records(), &args.search, GALLERY_FIELDS)
                .into_iter()
                .map(|g| {
                    vec![
                        id_cell(g.id.as_ref()),
                        truncate(&g.title, 32),
                        g.project_type.to_string(),
                        g.size.to_string(),
                        g.media.len().to_string(),
                        first_url(&g.media),
                    ]
                })
                .collect();
            print_table(
                &[
                    Column::left("ID"),
                    Column::left("Title"),
                    Column::left("Type"),
                    Column::left("Size"),
                    Column::right("Media"),
                    Column::left("First"),
                ],
                rows,
            );
        }
        GalleryCommands::Add { title, description, project_type, size, files } => {
            let project = GalleryProject::new(title, description)
                .with_type(project_type)
                .with_size(size);
            editor.begin_new(project)?;
            attach_files(&mut editor, &files).await?;
            submit(&mut editor).await?;
        }
        GalleryCommands::Update { id, title, description, project_type, size, files, detach } => {
            let record = fetch(&mut editor, &id).await?;
            editor.begin_edit(record)?;
            if let Some(draft) = editor.draft_mut() {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(project_type) = project_type {
                    draft.set_type(project_type);
                }
                if let Some(size) = size {
                    draft.set_size(size);
                }
            }
            detach_positions(&mut editor, detach)?;
            attach_files(&mut editor, &files).await?;
            submit(&mut editor).await?;
        }
        GalleryCommands::Delete { id } => delete(&mut editor, &id).await?,
    }
    Ok(())
}

pub async fn stories(console: &Console, cmd: StoryCommands) -> Result<()> {
    let mut editor = console.stories();
    match cmd {
        StoryCommands::List(args) => {
            editor.refresh().await?;
            let now = Utc::now();
            let rows = args
                .view()
                .apply(editor.records(), &args.search, STORY_FIELDS)
                .into_iter()
                .map(|s| {
                    vec![
                        id_cell(s.id.as_ref()),
                        truncate(&s.title, 32),
                        s.expires_at
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(blank),
                        if s.is_active(now) { "yes" } else { "no" }.to_string(),
                        first_url(&s.media),
                    ]
                })
                .collect();
            print_table(
                &[
                    Column::left("ID"),
                    Column::left("Title"),
                    Column::left("Expires"),
                    Column::left("Active"),
                    Column::left("Media"),
                ],
                rows,
            );
        }
        StoryCommands::Add { title, description, expires_at, file } => {
            let story = match expires_at {
                Some(at) => Story::new(title, description).expiring_at(at),
                None => Story::new(title, description),
            };
            editor.begin_new(story)?;
            attach_files(&mut editor, file.as_slice()).await?;
            submit(&mut editor).await?;
        }
        StoryCommands::Update { id, title, description, expires_at, no_expiry, file } => {
            let record = fetch(&mut editor, &id).await?;
            editor.begin_edit(record)?;
            if let Some(draft) = editor.draft_mut() {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if no_expiry {
                    draft.set_expiry(None);
                } else if expires_at.is_some() {
                    draft.set_expiry(expires_at);
                }
            }
            attach_files(&mut editor, file.as_slice()).await?;
            submit(&mut editor).await?;
        }
        StoryCommands::Delete { id } => delete(&mut editor, &id).await?,
    }
    Ok(())
}

pub async fn team(console: &Console, cmd: TeamCommands) -> Result<()> {
    let mut editor = console.team();
    match cmd {
        TeamCommands::List(args) => {
            editor.refresh().await?;
            let rows = args
                .view()
                .apply(editor.records(), &args.search, TEAM_FIELDS)
                .into_iter()
                .map(|m| {
                    vec![
                        id_cell(m.id.as_ref()),
                        m.name.clone(),
                        m.role.clone(),
                        first_url(&m.image),
                    ]
                })
                .collect();
            print_table(
                &[
                    Column::left("ID"),
                    Column::left("Name"),
                    Column::left("Role"),
                    Column::left("Image"),
                ],
                rows,
            );
        }
        TeamCommands::Add { name, role, file } => {
            editor.begin_new(TeamMember::new(name, role))?;
            attach_files(&mut editor, file.as_slice()).await?;
            submit(&mut editor).await?;
        }
        TeamCommands::Update { id, name, role, file } => {
            let record = fetch(&mut editor, &id).await?;
            editor.begin_edit(record)?;
            if let Some(draft) = editor.draft_mut() {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(role) = role {
                    draft.role = role;
                }
            }
            attach_files(&mut editor, file.as_slice()).await?;
            submit(&mut editor).await?;
        }
        TeamCommands::Delete { id } => delete(&mut editor, &id).await?,
    }
    Ok(())
}
