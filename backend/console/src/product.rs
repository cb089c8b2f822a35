//! Product listings.
//!
//! Products carry two generations of image columns. `images` holds the
//! multi-image list; `legacy_image` (and the older `image`) hold one. Reads
//! prefer `images` and fall back in that order. Writes go to `images`, with
//! the first entry mirrored into `legacy_image` for readers that still use it.

use serde_json::{json, Value};

use showroom_core::{RecordKind, Result, Row, ShowroomError};
use showroom_media::{MediaCodec, MediaReference};

use crate::editor::{FormRules, MediaArity, MediaRecord};
use crate::row;
use crate::search::Searchable;

/// Image columns in read-preference order.
pub const IMAGE_COLUMNS: [&str; 3] = ["images", "legacy_image", "image"];

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Option<Value>,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub images: MediaReference,
    pub created_at: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            category: category.into(),
            images: MediaReference::new(),
            created_at: None,
        }
    }

    /// Thumbnail for list views.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|e| e.resolved_url.as_str())
    }
}

impl MediaRecord for Product {
    const KIND: RecordKind = RecordKind::Product;
    const ARITY: MediaArity = MediaArity::Multiple;
    const MEDIA_COLUMN: &'static str = "images";
    const LABEL: &'static str = "Product";

    fn from_row(row: &Row, codec: &MediaCodec) -> Self {
        Self {
            id: row::key(row, "id"),
            name: row::text(row, "name"),
            price: row::number(row, "price").unwrap_or_default(),
            category: row::text(row, "category"),
            images: codec.normalize_columns(row, &IMAGE_COLUMNS),
            created_at: row::opt_text(row, "created_at"),
        }
    }

    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn media(&self) -> &MediaReference {
        &self.images
    }

    fn media_mut(&mut self) -> &mut MediaReference {
        &mut self.images
    }

    fn validate(&self, rules: &FormRules) -> Result<()> {
        row::require(&self.name, "Name")?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ShowroomError::validation("Price must be a non-negative number"));
        }
        row::require(&self.category, "Category")?;
        if !rules.categories.is_empty() && !rules.categories.iter().any(|c| c == &self.category) {
            return Err(ShowroomError::validation(format!(
                "Category must be one of: {}",
                rules.categories.join(", ")
            )));
        }
        Ok(())
    }

    fn field_columns(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), json!(self.name.trim()));
        row.insert("price".into(), json!(self.price));
        row.insert("category".into(), json!(self.category));
        row
    }

    fn media_columns(&self, codec: &MediaCodec) -> Row {
        let mut row = Row::new();
        row.insert("images".into(), codec.encode(&self.images).to_value());
        row.insert(
            "legacy_image".into(),
            self.images
                .first()
                .map(|e| Value::String(e.raw.clone()))
                .unwrap_or(Value::Null),
        );
        row
    }
}

impl Searchable for Product {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.clone(),
            "name" => Some(json!(self.name)),
            "price" => Some(json!(self.price)),
            "category" => Some(json!(self.category)),
            "created_at" => self.created_at.clone().map(Value::String),
            _ => None,
        }
    }
}
