//! Team members shown on the "about us" page.

use serde_json::{json, Value};

use showroom_core::{Query, RecordKind, Result, Row};
use showroom_media::{MediaCodec, MediaReference};

use crate::editor::{FormRules, MediaArity, MediaRecord};
use crate::row;
use crate::search::Searchable;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub id: Option<Value>,
    pub name: String,
    /// Job title, unrelated to admin roles.
    pub role: String,
    pub image: MediaReference,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            role: role.into(),
            image: MediaReference::new(),
        }
    }
}

impl MediaRecord for TeamMember {
    const KIND: RecordKind = RecordKind::TeamMember;
    const ARITY: MediaArity = MediaArity::Single;
    const MEDIA_COLUMN: &'static str = "image_url";
    const LABEL: &'static str = "Team member";

    fn from_row(row: &Row, codec: &MediaCodec) -> Self {
        Self {
            id: row::key(row, "id"),
            name: row::text(row, "name"),
            role: row::text(row, "role"),
            image: codec.normalize(row.get(Self::MEDIA_COLUMN).unwrap_or(&Value::Null)),
        }
    }

    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn media(&self) -> &MediaReference {
        &self.image
    }

    fn media_mut(&mut self) -> &mut MediaReference {
        &mut self.image
    }

    fn validate(&self, _rules: &FormRules) -> Result<()> {
        row::require(&self.name, "Name")?;
        row::require(&self.role, "Role")
    }

    fn field_columns(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), json!(self.name.trim()));
        row.insert("role".into(), json!(self.role.trim()));
        row
    }

    /// The team page sorts client-side.
    fn list_query() -> Query {
        Query::all()
    }
}

impl Searchable for TeamMember {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.clone(),
            "name" => Some(json!(self.name)),
            "role" => Some(json!(self.role)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_core::InMemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_reads_remote_image_url() {
        let codec = MediaCodec::new(Arc::new(InMemoryStorage::new("product-images")));
        let row = json!({"id": 1, "name": "Meera", "role": "Lead Designer",
            "image_url": "https://cdn.example.com/team-members/1-meera.png"});
        let member = TeamMember::from_row(row.as_object().unwrap(), &codec);
        assert_eq!(member.image.urls().collect::<Vec<_>>(), vec![
            "https://cdn.example.com/team-members/1-meera.png"
        ]);
    }

    #[test]
    fn test_field_columns_exclude_image() {
        let cols = TeamMember::new(" Meera ", "Lead Designer").field_columns();
        assert_eq!(cols["name"], "Meera");
        assert!(!cols.contains_key("image_url"));
    }
}
