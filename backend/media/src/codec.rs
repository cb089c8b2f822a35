//! Media reference codec.
//!
//! A media column may hold one of three shapes, depending on when the row
//! was written:
//!
//! - empty / absent
//! - a single bare string (public URL or bucket-relative storage path)
//! - a JSON-encoded array of strings (URLs and paths mixed)
//!
//! [`MediaCodec::normalize`] decodes any of them into a [`MediaReference`]
//! once, at the boundary. Nothing downstream inspects raw strings again.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use showroom_core::{RecordKind, Row, ShowroomError, StorageGateway};

/// Suffixes that mark a bare string as a single media item.
const SINGLE_ITEM_SUFFIXES: [&str; 3] = [".jpg", ".png", ".mp4"];

/// How an entry's raw value is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Fully-qualified fetchable address.
    RemoteUrl,
    /// Bucket-relative key that needs resolving.
    StoragePath,
}

/// One attached media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    pub kind: MediaKind,
    /// The string exactly as persisted. Re-encoding writes this back.
    pub raw: String,
    /// Displayable URL. Equal to `raw` for remote URLs.
    pub resolved_url: String,
}

impl MediaEntry {
    /// Storage path of this entry, if it was persisted as one.
    pub fn storage_path(&self) -> Option<&str> {
        match self.kind {
            MediaKind::StoragePath => Some(&self.raw),
            MediaKind::RemoteUrl => None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.resolved_url.ends_with(".mp4")
    }
}

/// All media attached to one record, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    entries: Vec<MediaEntry>,
}

impl MediaReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&MediaEntry> {
        self.entries.first()
    }

    pub fn push(&mut self, entry: MediaEntry) {
        self.entries.push(entry);
    }

    /// Detach the entry at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<MediaEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resolved URLs in display order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.resolved_url.as_str())
    }

    /// Raw persisted strings in display order.
    pub fn raw_values(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.raw.as_str()).collect()
    }
}

/// The on-the-wire value of a media column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedMediaField {
    Empty,
    Single(String),
    List(Vec<String>),
}

impl PersistedMediaField {
    /// Column value to write: `null`, a bare string, or a JSON array string.
    pub fn to_value(&self) -> Value {
        match self {
            PersistedMediaField::Empty => Value::Null,
            PersistedMediaField::Single(raw) => Value::String(raw.clone()),
            PersistedMediaField::List(items) => {
                let encoded = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
                Value::String(encoded)
            }
        }
    }
}

/// Whether a bare string is read back as one item without JSON parsing.
fn reads_as_single(raw: &str) -> bool {
    raw.starts_with("http") || SINGLE_ITEM_SUFFIXES.iter().any(|s| raw.ends_with(s))
}

/// Split a persisted field into its raw strings.
fn classify(raw: &Value) -> Result<Vec<String>, ShowroomError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) if reads_as_single(s) => Ok(vec![s.clone()]),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => Ok(collect_strings(items)),
            Ok(other) => Err(ShowroomError::ParseAmbiguity(format!(
                "expected a JSON array, found {}",
                json_type(&other)
            ))),
            Err(e) => Err(ShowroomError::ParseAmbiguity(e.to_string())),
        },
        Value::Array(items) => Ok(collect_strings(items.clone())),
        other => Err(ShowroomError::ParseAmbiguity(format!(
            "unsupported column type {}",
            json_type(other)
        ))),
    }
}

fn collect_strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s),
            other => {
                warn!(element = %other, "Skipping non-string media element");
                None
            }
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Final `/`-delimited segment of a URL, without query or fragment.
fn last_segment(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Decodes, encodes, and plans cleanup of media references for one bucket.
#[derive(Clone)]
pub struct MediaCodec {
    storage: Arc<dyn StorageGateway>,
}

impl MediaCodec {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    /// Classify one raw string and resolve its display URL.
    pub fn entry(&self, raw: impl Into<String>) -> MediaEntry {
        let raw = raw.into();
        if raw.starts_with("http") {
            MediaEntry {
                kind: MediaKind::RemoteUrl,
                resolved_url: raw.clone(),
                raw,
            }
        } else {
            MediaEntry {
                kind: MediaKind::StoragePath,
                resolved_url: self.storage.public_url(&raw),
                raw,
            }
        }
    }

    /// Decode a persisted media field. Never fails: anything unreadable
    /// degrades to an empty reference.
    pub fn normalize(&self, raw: &Value) -> MediaReference {
        match classify(raw) {
            Ok(items) => MediaReference {
                entries: items.into_iter().map(|raw| self.entry(raw)).collect(),
            },
            Err(e) => {
                warn!(error = %e, "Media field unreadable; treating as no media");
                MediaReference::default()
            }
        }
    }

    /// Decode the first non-empty column among `columns`.
    ///
    /// Used where a table carries both a multi-item and a legacy
    /// single-item column: the earlier column wins when it yields media.
    pub fn normalize_columns(&self, row: &Row, columns: &[&str]) -> MediaReference {
        for column in columns {
            if let Some(raw) = row.get(*column) {
                let reference = self.normalize(raw);
                if !reference.is_empty() {
                    return reference;
                }
            }
        }
        MediaReference::default()
    }

    /// Encode as a JSON array of raw strings; no entries encodes as empty.
    pub fn encode(&self, reference: &MediaReference) -> PersistedMediaField {
        if reference.is_empty() {
            return PersistedMediaField::Empty;
        }
        PersistedMediaField::List(reference.entries.iter().map(|e| e.raw.clone()).collect())
    }

    /// Encode a single-valued column as a bare string.
    ///
    /// A raw value that would not read back as one item (for example a
    /// `.webp` storage path) is written as a one-element array instead.
    pub fn encode_single(&self, reference: &MediaReference) -> PersistedMediaField {
        match reference.entries.as_slice() {
            [] => PersistedMediaField::Empty,
            [only] if reads_as_single(&only.raw) => PersistedMediaField::Single(only.raw.clone()),
            [only] => PersistedMediaField::List(vec![only.raw.clone()]),
            [first, ..] => {
                warn!(
                    count = reference.len(),
                    "Single-valued media column given several entries; keeping the first"
                );
                let first = MediaReference {
                    entries: vec![first.clone()],
                };
                self.encode_single(&first)
            }
        }
    }

    /// Storage paths to remove when the owning record goes away.
    ///
    /// Storage-path entries are used verbatim. For remote URLs the path is
    /// guessed as `<folder>/<last URL segment>`; a guess that names no real
    /// object simply fails to remove.
    pub fn paths_to_delete(&self, reference: &MediaReference, kind: RecordKind) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        for entry in &reference.entries {
            match entry.kind {
                MediaKind::StoragePath => {
                    paths.insert(entry.raw.clone());
                }
                MediaKind::RemoteUrl => match last_segment(&entry.raw) {
                    Some(segment) => {
                        let name = urlencoding::decode(segment)
                            .map(|name| name.into_owned())
                            .unwrap_or_else(|_| segment.to_string());
                        paths.insert(format!("{}/{}", kind.folder(), name));
                    }
                    None => debug!(url = %entry.raw, "No storage path derivable from URL"),
                },
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use showroom_core::InMemoryStorage;

    fn codec() -> MediaCodec {
        MediaCodec::new(Arc::new(
            InMemoryStorage::new("product-images").with_base_url("https://cdn.test"),
        ))
    }

    fn kinds(reference: &MediaReference) -> Vec<MediaKind> {
        reference.entries().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_shape_coverage() {
        let codec = codec();

        let url = codec.normalize(&json!("https://host/a.png"));
        assert_eq!(kinds(&url), vec![MediaKind::RemoteUrl]);

        let path = codec.normalize(&json!("gallery/1-a.png"));
        assert_eq!(kinds(&path), vec![MediaKind::StoragePath]);
        assert_eq!(
            path.entries()[0].resolved_url,
            "https://cdn.test/storage/v1/object/public/product-images/gallery/1-a.png"
        );

        let list = codec.normalize(&json!(r#"["gallery/1-a.png","https://host/b.mp4"]"#));
        assert_eq!(kinds(&list), vec![MediaKind::StoragePath, MediaKind::RemoteUrl]);
        assert!(list.entries()[1].is_video());

        assert!(codec.normalize(&Value::Null).is_empty());
        assert!(codec.normalize(&json!("")).is_empty());
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let codec = codec();
        assert!(codec.normalize(&json!("{not valid")).is_empty());
        assert!(codec.normalize(&json!(r#"{"a": 1}"#)).is_empty());
        assert!(codec.normalize(&json!(12)).is_empty());
    }

    #[test]
    fn test_already_parsed_array_and_bad_elements() {
        let codec = codec();
        let reference = codec.normalize(&json!(["stories/1-a.webp", 5, "", "https://x/y.jpg"]));
        assert_eq!(reference.raw_values(), vec!["stories/1-a.webp", "https://x/y.jpg"]);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let codec = codec();
        let inputs = [
            Value::Null,
            json!("https://host/a.png"),
            json!("gallery/1-a.png"),
            json!(r#"["gallery/1-a.png","https://host/b.mp4","products/2-c.webp"]"#),
        ];
        for input in inputs {
            let first = codec.normalize(&input);
            let again = codec.normalize(&codec.encode(&first).to_value());
            assert_eq!(again, first, "input {input}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let codec = codec();
        let first = codec.normalize(&json!(r#"["gallery/1-a.png","https://host/b.mp4"]"#));
        let second = codec.normalize(&json!(first.raw_values()));
        assert_eq!(second, first);
    }

    #[test]
    fn test_encode_empty_and_order() {
        let codec = codec();
        assert_eq!(codec.encode(&MediaReference::new()), PersistedMediaField::Empty);
        assert_eq!(PersistedMediaField::Empty.to_value(), Value::Null);

        let mut reference = MediaReference::new();
        reference.push(codec.entry("gallery/2-b.png"));
        reference.push(codec.entry("gallery/1-a.png"));
        assert_eq!(
            codec.encode(&reference).to_value(),
            json!(r#"["gallery/2-b.png","gallery/1-a.png"]"#)
        );
    }

    #[test]
    fn test_encode_single_keeps_round_trip() {
        let codec = codec();
        let mut png = MediaReference::new();
        png.push(codec.entry("stories/1-a.png"));
        assert_eq!(codec.encode_single(&png), PersistedMediaField::Single("stories/1-a.png".into()));

        let mut webp = MediaReference::new();
        webp.push(codec.entry("stories/1-a.webp"));
        let encoded = codec.encode_single(&webp);
        assert_eq!(encoded, PersistedMediaField::List(vec!["stories/1-a.webp".into()]));
        assert_eq!(codec.normalize(&encoded.to_value()), webp);
    }

    #[test]
    fn test_paths_to_delete_from_url() {
        let codec = codec();
        let reference = codec.normalize(&json!("https://host/gallery/42-photo.png"));
        let paths = codec.paths_to_delete(&reference, RecordKind::Gallery);
        assert_eq!(paths.into_iter().collect::<Vec<_>>(), vec!["gallery/42-photo.png"]);
    }

    #[test]
    fn test_paths_to_delete_prefers_stored_path() {
        let codec = codec();
        let reference = codec.normalize(&json!(
            r#"["team-members/9-jo.png","https://cdn.test/storage/v1/object/public/product-images/team-members/3-al.jpg?v=2"]"#
        ));
        let paths: Vec<_> = codec
            .paths_to_delete(&reference, RecordKind::TeamMember)
            .into_iter()
            .collect();
        assert_eq!(paths, vec!["team-members/3-al.jpg", "team-members/9-jo.png"]);
    }

    #[test]
    fn test_normalize_columns_prefers_multi_image() {
        let codec = codec();
        let row: Row = json!({
            "images": r#"["products/2-b.png","products/3-c.png"]"#,
            "legacy_image": "https://host/products/1-a.png"
        })
        .as_object()
        .cloned()
        .unwrap();
        assert_eq!(codec.normalize_columns(&row, &["images", "legacy_image"]).len(), 2);

        let legacy_only: Row = json!({"images": null, "legacy_image": "https://host/products/1-a.png"})
            .as_object()
            .cloned()
            .unwrap();
        let reference = codec.normalize_columns(&legacy_only, &["images", "legacy_image"]);
        assert_eq!(reference.urls().collect::<Vec<_>>(), vec!["https://host/products/1-a.png"]);
    }

    #[test]
    fn test_normalize_columns_falls_back_to_image() {
        let codec = codec();
        let columns = ["images", "legacy_image", "image"];
        let image_only: Row = json!({"images": "", "legacy_image": null, "image": "products/4-d.png"})
            .as_object()
            .cloned()
            .unwrap();
        let reference = codec.normalize_columns(&image_only, &columns);
        assert_eq!(reference.len(), 1);
        assert_eq!(reference.entries()[0].raw, "products/4-d.png");
        assert_eq!(reference.entries()[0].kind, MediaKind::StoragePath);

        let nothing: Row = json!({"images": "[]", "legacy_image": ""}).as_object().cloned().unwrap();
        assert!(codec.normalize_columns(&nothing, &columns).is_empty());
    }

    #[test]
    fn test_cleanup_path_decodes_encoded_url() {
        let codec = codec();
        let reference = codec.normalize(&json!(
            "https://cdn.test/storage/v1/object/public/product-images/gallery/1-a%23b.png"
        ));
        let paths: Vec<_> = codec.paths_to_delete(&reference, RecordKind::Gallery).into_iter().collect();
        assert_eq!(paths, vec!["gallery/1-a#b.png"]);
    }
}
