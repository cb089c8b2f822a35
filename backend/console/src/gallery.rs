//! Gallery projects: titled sets of photos and videos.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use showroom_core::{RecordKind, Result, Row, ShowroomError};
use showroom_media::{MediaCodec, MediaReference};

use crate::editor::{FormRules, MediaArity, MediaRecord};
use crate::row::{self, Loaded};
use crate::search::Searchable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Image,
    Video,
    Delivery,
}

impl ProjectType {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "image" => Ok(ProjectType::Image),
            "video" => Ok(ProjectType::Video),
            "delivery" => Ok(ProjectType::Delivery),
            other => Err(ShowroomError::validation(format!(
                "unknown project type '{other}' (image, video, delivery)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Image => "image",
            ProjectType::Video => "video",
            ProjectType::Delivery => "delivery",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tile size on the public gallery grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSize {
    Large,
    #[default]
    Medium,
    Small,
}

impl ProjectSize {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "large" => Ok(ProjectSize::Large),
            "medium" => Ok(ProjectSize::Medium),
            "small" => Ok(ProjectSize::Small),
            other => Err(ShowroomError::validation(format!(
                "unknown size '{other}' (large, medium, small)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectSize::Large => "large",
            ProjectSize::Medium => "medium",
            ProjectSize::Small => "small",
        }
    }
}

impl fmt::Display for ProjectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryProject {
    pub id: Option<Value>,
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
    pub size: ProjectSize,
    pub media: MediaReference,
    stored_type: Option<Loaded<ProjectType>>,
    stored_size: Option<Loaded<ProjectSize>>,
}

impl GalleryProject {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            project_type: ProjectType::default(),
            size: ProjectSize::default(),
            media: MediaReference::new(),
            stored_type: None,
            stored_size: None,
        }
    }

    pub fn with_type(mut self, project_type: ProjectType) -> Self {
        self.set_type(project_type);
        self
    }

    pub fn with_size(mut self, size: ProjectSize) -> Self {
        self.set_size(size);
        self
    }

    /// Sets the type even when it matches what an unrecognised stored value read as.
    pub fn set_type(&mut self, project_type: ProjectType) {
        self.project_type = project_type;
        self.stored_type = None;
    }

    pub fn set_size(&mut self, size: ProjectSize) {
        self.size = size;
        self.stored_size = None;
    }
}

impl MediaRecord for GalleryProject {
    const KIND: RecordKind = RecordKind::Gallery;
    const ARITY: MediaArity = MediaArity::Multiple;
    const MEDIA_COLUMN: &'static str = "media";
    const LABEL: &'static str = "Project";

    fn from_row(row: &Row, codec: &MediaCodec) -> Self {
        let project_type = row::opt_text(row, "type")
            .map(|t| {
                ProjectType::parse(&t).unwrap_or_else(|e| {
                    warn!(error = %e, "Unreadable gallery type; using default");
                    ProjectType::default()
                })
            })
            .unwrap_or_default();
        let size = row::opt_text(row, "size")
            .map(|s| {
                ProjectSize::parse(&s).unwrap_or_else(|e| {
                    warn!(error = %e, "Unreadable gallery size; using default");
                    ProjectSize::default()
                })
            })
            .unwrap_or_default();
        Self {
            id: row::key(row, "id"),
            title: row::text(row, "title"),
            description: row::text(row, "description"),
            project_type,
            size,
            media: codec.normalize(row.get(Self::MEDIA_COLUMN).unwrap_or(&Value::Null)),
            stored_type: row.get("type").map(|raw| Loaded::new(raw.clone(), project_type)),
            stored_size: row.get("size").map(|raw| Loaded::new(raw.clone(), size)),
        }
    }

    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn media(&self) -> &MediaReference {
        &self.media
    }

    fn media_mut(&mut self) -> &mut MediaReference {
        &mut self.media
    }

    fn validate(&self, _rules: &FormRules) -> Result<()> {
        row::require(&self.title, "Title")?;
        row::require(&self.description, "Description")
    }

    fn field_columns(&self) -> Row {
        let mut row = Row::new();
        row.insert("title".into(), json!(self.title.trim()));
        row.insert("description".into(), json!(self.description.trim()));
        row.insert(
            "type".into(),
            Loaded::write_back(
                self.stored_type.as_ref(),
                &self.project_type,
                json!(self.project_type.as_str()),
            ),
        );
        row.insert(
            "size".into(),
            Loaded::write_back(self.stored_size.as_ref(), &self.size, json!(self.size.as_str())),
        );
        row
    }
}

impl Searchable for GalleryProject {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.clone(),
            "title" => Some(json!(self.title)),
            "description" => Some(json!(self.description)),
            "type" => Some(json!(self.project_type.as_str())),
            "size" => Some(json!(self.size.as_str())),
            _ => None,
        }
    }
}
