//! Stories: time-limited promotional posts with one image or video.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};
use tracing::warn;

use showroom_core::{RecordKind, Result, Row, ShowroomError};
use showroom_media::{MediaCodec, MediaReference};

use crate::editor::{FormRules, MediaArity, MediaRecord};
use crate::row::{self, Loaded};
use crate::search::Searchable;

/// Offset-free forms, taken as UTC: the `datetime-local` form value and what a
/// `timestamp` column returns.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ShowroomError::validation(format!(
                "expiry '{value}' is not RFC 3339 or YYYY-MM-DDTHH:MM[:SS]"
            ))
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: Option<Value>,
    pub title: String,
    pub description: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub media: MediaReference,
    pub created_at: Option<String>,
    stored_expiry: Option<Loaded<Option<DateTime<Utc>>>>,
}

impl Story {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            expires_at: None,
            media: MediaReference::new(),
            created_at: None,
            stored_expiry: None,
        }
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.set_expiry(Some(at));
        self
    }

    /// Replaces the expiry, including one loaded in a format the console cannot read.
    pub fn set_expiry(&mut self, at: Option<DateTime<Utc>>) {
        self.expires_at = at;
        self.stored_expiry = None;
    }

    /// A story without an expiry never lapses.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

impl MediaRecord for Story {
    const KIND: RecordKind = RecordKind::Story;
    const ARITY: MediaArity = MediaArity::Single;
    const MEDIA_COLUMN: &'static str = "media";
    const LABEL: &'static str = "Story";

    fn from_row(row: &Row, codec: &MediaCodec) -> Self {
        let expires_at: Option<DateTime<Utc>> = row::opt_text(row, "expires_at")
            .filter(|s| !s.is_empty())
            .and_then(|s| match parse_expiry(&s) {
                Ok(at) => Some(at),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable story expiry");
                    None
                }
            });
        Self {
            id: row::key(row, "id"),
            title: row::text(row, "title"),
            description: row::text(row, "description"),
            expires_at,
            media: codec.normalize(row.get(Self::MEDIA_COLUMN).unwrap_or(&Value::Null)),
            created_at: row::opt_text(row, "created_at"),
            stored_expiry: row.get("expires_at").map(|raw| Loaded::new(raw.clone(), expires_at)),
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
        let fresh = self.expires_at.map(|at| json!(at.to_rfc3339())).unwrap_or(Value::Null);
        row.insert(
            "expires_at".into(),
            Loaded::write_back(self.stored_expiry.as_ref(), &self.expires_at, fresh),
        );
        row
    }
}

impl Searchable for Story {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.clone(),
            "title" => Some(json!(self.title)),
            "description" => Some(json!(self.description)),
            "expires_at" => self.expires_at.map(|at| json!(at.to_rfc3339())),
            "created_at" => self.created_at.clone().map(Value::String),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use showroom_core::InMemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_parse_expiry_formats() {
        let local = parse_expiry("2026-12-31T18:30").unwrap();
        assert_eq!(local, Utc.with_ymd_and_hms(2026, 12, 31, 18, 30, 0).unwrap());

        let column = parse_expiry("2026-12-31T18:30:00").unwrap();
        assert_eq!(column, local);
        assert_eq!(parse_expiry("2026-12-31 18:30:00.250").unwrap().timestamp_subsec_millis(), 250);

        let rfc = parse_expiry("2026-12-31T18:30:00+05:30").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2026, 12, 31, 13, 0, 0).unwrap());

        assert!(matches!(parse_expiry("next friday"), Err(ShowroomError::Validation(_))));
    }

    #[test]
    fn test_is_active() {
        let now = Utc::now();
        assert!(Story::new("Sale", "20% off").is_active(now));
        assert!(Story::new("Sale", "20% off").expiring_at(now + Duration::days(1)).is_active(now));
        assert!(!Story::new("Sale", "20% off").expiring_at(now - Duration::minutes(1)).is_active(now));
    }

    #[test]
    fn test_from_row_tolerates_bad_expiry() {
        let codec = MediaCodec::new(Arc::new(InMemoryStorage::new("product-images")));
        let row = json!({"id": 3, "title": "Diwali", "description": "Festive", "expires_at": "soon", "media": "stories/1-d.mp4"});
        let story = Story::from_row(row.as_object().unwrap(), &codec);
        assert!(story.expires_at.is_none());
        assert!(story.media.first().unwrap().is_video());
    }

    #[test]
    fn test_field_columns_write_null_expiry() {
        let cols = Story::new("Sale", "20% off").field_columns();
        assert_eq!(cols["expires_at"], Value::Null);
    }

    #[test]
    fn test_untouched_expiry_keeps_stored_text() {
        let codec = MediaCodec::new(Arc::new(InMemoryStorage::new("product-images")));
        let row = json!({"id": 3, "title": "Diwali", "description": "Festive", "expires_at": "soon"});
        let mut story = Story::from_row(row.as_object().unwrap(), &codec);
        story.title = "Diwali Week".into();
        assert_eq!(story.field_columns()["expires_at"], json!("soon"));

        story.set_expiry(None);
        assert_eq!(story.field_columns()["expires_at"], Value::Null);
    }
}
