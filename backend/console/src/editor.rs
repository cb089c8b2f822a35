//! Record editor state machine shared by every screen that owns media.
//!
//! ```text
//! Viewing ──begin_new──▶ EditingNew ──┐
//!    │                                ├─submit─▶ Submitting ─ok─▶ Viewing
//!    └─────begin_edit──▶ EditingExisting ┘           │
//!                              ▲                     │ error
//!                              └─────────────────────┘
//! ```
//!
//! Uploads for one submission run concurrently and all must succeed before
//! the row is written. A failed submission restores the editing state it
//! came from, pending files and field edits included.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use showroom_core::{
    MatchKey, Notice, Query, RecordKind, RecordStore, Result, Row, ShowroomError, StorageGateway,
};
use showroom_logging::{ConsoleEvent, EventLogger};
use showroom_media::{is_listing_media, upload_all, LocalFile, MediaCodec, MediaEntry, MediaReference};

use crate::row::id_text;

/// How many media items a record's media column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaArity {
    /// One item, written as a bare string. A new file replaces the old one.
    Single,
    /// Ordered list, written as a JSON array. New files are appended.
    Multiple,
}

/// Form-level settings the editors validate against.
#[derive(Debug, Clone, Default)]
pub struct FormRules {
    /// Allowed product categories. Empty means any.
    pub categories: Vec<String>,
}

/// A table row that owns uploaded media.
pub trait MediaRecord: Clone + Send + Sync {
    const KIND: RecordKind;
    const ARITY: MediaArity;
    /// Column the media is written to.
    const MEDIA_COLUMN: &'static str;
    /// Name used in operator notices ("Project added successfully").
    const LABEL: &'static str;

    /// Build from a fetched row, decoding media through the codec.
    fn from_row(row: &Row, codec: &MediaCodec) -> Self;

    /// Value of the `id` column; `None` until the row is inserted.
    fn id(&self) -> Option<&Value>;

    fn media(&self) -> &MediaReference;

    fn media_mut(&mut self) -> &mut MediaReference;

    /// Field checks, run before any network call.
    fn validate(&self, rules: &FormRules) -> Result<()>;

    /// Every non-media column to write.
    fn field_columns(&self) -> Row;

    /// Media column(s) to write.
    fn media_columns(&self, codec: &MediaCodec) -> Row {
        let field = match Self::ARITY {
            MediaArity::Single => codec.encode_single(self.media()),
            MediaArity::Multiple => codec.encode(self.media()),
        };
        let mut row = Row::new();
        row.insert(Self::MEDIA_COLUMN.to_string(), field.to_value());
        row
    }

    /// Query used to (re)load the list.
    fn list_query() -> Query {
        Query::all().order_by("created_at", false)
    }

    fn key(&self) -> Option<MatchKey> {
        self.id().cloned().map(MatchKey::id)
    }
}

/// Working copy of one record while it is being edited.
#[derive(Debug, Clone)]
pub struct Draft<R> {
    pub record: R,
    files: Vec<LocalFile>,
    original_media: MediaReference,
}

impl<R: MediaRecord> Draft<R> {
    fn new(record: R) -> Self {
        Self {
            original_media: record.media().clone(),
            record,
            files: Vec::new(),
        }
    }

    /// Local files that will be uploaded on submit.
    pub fn pending_files(&self) -> &[LocalFile] {
        &self.files
    }

    /// Whether the media column needs rewriting.
    pub fn media_changed(&self) -> bool {
        !self.files.is_empty() || self.record.media() != &self.original_media
    }
}

#[derive(Debug, Clone)]
pub enum EditorState<R> {
    Viewing,
    EditingNew(Draft<R>),
    EditingExisting(Draft<R>),
    Submitting,
}

impl<R> EditorState<R> {
    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Viewing => "viewing",
            EditorState::EditingNew(_) => "editing-new",
            EditorState::EditingExisting(_) => "editing-existing",
            EditorState::Submitting => "submitting",
        }
    }

    pub fn is_viewing(&self) -> bool {
        matches!(self, EditorState::Viewing)
    }
}

/// Result of deleting a record.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub removed: Vec<String>,
    /// Storage paths that are still in the bucket.
    pub cleanup_failed: Vec<String>,
    pub notice: Notice,
}

pub struct Editor<R> {
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn StorageGateway>,
    codec: MediaCodec,
    rules: FormRules,
    actor: Option<String>,
    state: EditorState<R>,
    records: Vec<R>,
}

impl<R: MediaRecord> Editor<R> {
    pub fn new(
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn StorageGateway>,
        codec: MediaCodec,
        rules: FormRules,
    ) -> Self {
        Self {
            store,
            storage,
            codec,
            rules,
            actor: None,
            state: EditorState::Viewing,
            records: Vec::new(),
        }
    }

    /// Name recorded against writes in the event log.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn state(&self) -> &EditorState<R> {
        &self.state
    }

    /// Records from the last [`Editor::refresh`].
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn find(&self, id: &Value) -> Option<&R> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    pub fn codec(&self) -> &MediaCodec {
        &self.codec
    }

    /// Re-fetch the list from the store.
    pub async fn refresh(&mut self) -> Result<&[R]> {
        let rows = self.store.select(R::KIND.table(), &R::list_query()).await?;
        self.records = rows.iter().map(|row| R::from_row(row, &self.codec)).collect();
        debug!(table = R::KIND.table(), count = self.records.len(), "Loaded records");
        Ok(&self.records)
    }

    fn require_viewing(&self) -> Result<()> {
        if !self.state.is_viewing() {
            return Err(ShowroomError::validation(format!(
                "finish or cancel the current edit first (editor is {})",
                self.state.name()
            )));
        }
        Ok(())
    }

    /// Start an "add" with the given field values. Media starts empty.
    pub fn begin_new(&mut self, mut record: R) -> Result<()> {
        self.require_viewing()?;
        record.media_mut().clear();
        self.state = EditorState::EditingNew(Draft::new(record));
        Ok(())
    }

    /// Start editing a fetched record. Its normalized media becomes the
    /// working reference.
    pub fn begin_edit(&mut self, record: R) -> Result<()> {
        self.require_viewing()?;
        if record.id().is_none() {
            return Err(ShowroomError::validation(format!("{} has no id", R::LABEL)));
        }
        self.state = EditorState::EditingExisting(Draft::new(record));
        Ok(())
    }

    pub fn draft(&self) -> Option<&Draft<R>> {
        match &self.state {
            EditorState::EditingNew(d) | EditorState::EditingExisting(d) => Some(d),
            _ => None,
        }
    }

    fn draft_state_mut(&mut self) -> Result<&mut Draft<R>> {
        match &mut self.state {
            EditorState::EditingNew(d) | EditorState::EditingExisting(d) => Ok(d),
            other => Err(ShowroomError::validation(format!(
                "nothing is being edited (editor is {})",
                other.name()
            ))),
        }
    }

    /// Mutable access to the record being edited.
    pub fn draft_mut(&mut self) -> Option<&mut R> {
        self.draft_state_mut().ok().map(|d| &mut d.record)
    }

    /// Queue a local file for upload on submit.
    pub fn attach(&mut self, file: LocalFile) -> Result<()> {
        if !is_listing_media(&file.content_type) {
            return Err(ShowroomError::validation(format!(
                "{} is not a supported image or video ({})",
                file.name, file.content_type
            )));
        }
        let draft = self.draft_state_mut()?;
        match R::ARITY {
            MediaArity::Single => draft.files = vec![file],
            MediaArity::Multiple => draft.files.push(file),
        }
        Ok(())
    }

    /// Drop an already-stored entry from the working reference. The object
    /// itself stays in the bucket.
    pub fn detach(&mut self, index: usize) -> Result<MediaEntry> {
        let draft = self.draft_state_mut()?;
        draft
            .record
            .media_mut()
            .remove(index)
            .ok_or_else(|| ShowroomError::validation(format!("no media at position {index}")))
    }

    /// Abandon the edit.
    pub fn cancel(&mut self) {
        self.state = EditorState::Viewing;
    }

    /// Validate, upload, encode, write. On success the editor is back in
    /// `Viewing` with a fresh list; on failure it is back where it was.
    pub async fn submit(&mut self) -> Result<Notice> {
        let (draft, is_new) = match std::mem::replace(&mut self.state, EditorState::Submitting) {
            EditorState::EditingNew(d) => (d, true),
            EditorState::EditingExisting(d) => (d, false),
            other => {
                let name = other.name();
                self.state = other;
                return Err(ShowroomError::validation(format!(
                    "nothing to submit (editor is {name})"
                )));
            }
        };

        match self.persist(&draft, is_new).await {
            Ok(notice) => {
                self.state = EditorState::Viewing;
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, table = R::KIND.table(), "Reload after save failed");
                }
                Ok(notice)
            }
            Err(e) => {
                warn!(error = %e, table = R::KIND.table(), "Submission failed");
                self.state = if is_new {
                    EditorState::EditingNew(draft)
                } else {
                    EditorState::EditingExisting(draft)
                };
                Err(e)
            }
        }
    }

    fn check_media(&self, draft: &Draft<R>, is_new: bool) -> Result<()> {
        let total = draft.record.media().len() + draft.files.len();
        if total == 0 && (is_new || !draft.original_media.is_empty()) {
            return Err(ShowroomError::validation(format!(
                "{} needs at least one image or video",
                R::LABEL
            )));
        }
        Ok(())
    }

    async fn persist(&self, draft: &Draft<R>, is_new: bool) -> Result<Notice> {
        draft.record.validate(&self.rules)?;
        self.check_media(draft, is_new)?;
        let key = if is_new {
            None
        } else {
            Some(
                draft
                    .record
                    .key()
                    .ok_or_else(|| ShowroomError::validation(format!("{} has no id", R::LABEL)))?,
            )
        };

        let uploaded = upload_all(self.storage.as_ref(), R::KIND, &draft.files).await?;

        let mut record = draft.record.clone();
        match R::ARITY {
            MediaArity::Single => {
                if let Some(path) = uploaded.last() {
                    record.media_mut().clear();
                    record.media_mut().push(self.codec.entry(path.clone()));
                }
            }
            MediaArity::Multiple => {
                for path in &uploaded {
                    record.media_mut().push(self.codec.entry(path.clone()));
                }
            }
        }

        let mut row = record.field_columns();
        if is_new || draft.media_changed() {
            row.extend(record.media_columns(&self.codec));
        }

        let table = R::KIND.table();
        let written = match &key {
            None => self.store.insert(table, row).await.map(|stored| ConsoleEvent::RecordCreated {
                table: table.into(),
                id: stored.get("id").map(id_text).unwrap_or_default(),
            }),
            Some(key) => self.store.update(table, row, key).await.map(|()| {
                ConsoleEvent::RecordUpdated {
                    table: table.into(),
                    id: id_text(&key.value),
                }
            }),
        };
        let event = match written {
            Ok(event) => event,
            Err(e) => {
                if !uploaded.is_empty() {
                    EventLogger::log_event(
                        self.actor.as_deref(),
                        ConsoleEvent::OrphanedUploads { paths: uploaded },
                    );
                }
                return Err(e);
            }
        };
        EventLogger::log_event(self.actor.as_deref(), event);

        let verb = if is_new { "added" } else { "updated" };
        info!(table, uploads = uploaded.len(), "{} {}", R::LABEL, verb);
        Ok(Notice::success(format!("{} {} successfully!", R::LABEL, verb)))
    }

    /// Remove the record's media, then the row. The row is deleted even when
    /// some media could not be removed.
    pub async fn delete(&mut self, record: &R) -> Result<DeleteOutcome> {
        self.require_viewing()?;
        let key = record
            .key()
            .ok_or_else(|| ShowroomError::validation(format!("{} has no id", R::LABEL)))?;

        let paths: Vec<String> = self
            .codec
            .paths_to_delete(record.media(), R::KIND)
            .into_iter()
            .collect();
        let report = if paths.is_empty() {
            Default::default()
        } else {
            self.storage.remove(&paths).await
        };

        if let Some(failure) = report.failure() {
            warn!(error = %failure, table = R::KIND.table(), "Media cleanup incomplete");
            EventLogger::log_event(
                self.actor.as_deref(),
                ConsoleEvent::CleanupFailed {
                    paths: report.failed.iter().map(|(p, _)| p.clone()).collect(),
                },
            );
        }

        let table = R::KIND.table();
        self.store.delete(table, &key).await?;
        EventLogger::log_event(
            self.actor.as_deref(),
            ConsoleEvent::RecordDeleted {
                table: table.into(),
                id: id_text(&key.value),
            },
        );

        if let Err(e) = self.refresh().await {
            warn!(error = %e, table, "Reload after delete failed");
        }

        let cleanup_failed: Vec<String> = report.failed.into_iter().map(|(p, _)| p).collect();
        let notice = if cleanup_failed.is_empty() {
            Notice::success(format!("{} deleted successfully!", R::LABEL))
        } else {
            Notice::warning(format!(
                "{} deleted, but {} media file(s) could not be removed",
                R::LABEL,
                cleanup_failed.len()
            ))
        };
        Ok(DeleteOutcome {
            removed: report.removed,
            cleanup_failed,
            notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Console, GalleryProject, Product, Story, TeamMember};
    use serde_json::json;
    use showroom_core::{tables, InMemoryRecordStore, InMemoryStorage, NoticeLevel};

    struct Harness {
        store: Arc<InMemoryRecordStore>,
        storage: Arc<InMemoryStorage>,
        console: Console,
    }

    fn harness(store: InMemoryRecordStore, storage: InMemoryStorage) -> Harness {
        let store = Arc::new(store);
        let storage = Arc::new(storage);
        let console = Console::new(store.clone(), storage.clone())
            .with_categories(vec!["Living Room".into(), "Office".into()]);
        Harness { store, storage, console }
    }

    fn bucket() -> InMemoryStorage {
        InMemoryStorage::new("product-images").with_base_url("https://cdn.test")
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn image(name: &str) -> LocalFile {
        LocalFile::new(name, vec![0xFFu8, 0xD8, 0xFF])
    }

    fn stored_list(value: &Value) -> Vec<String> {
        serde_json::from_str(value.as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_gallery_project_lifecycle() {
        let h = harness(InMemoryRecordStore::new(), bucket());
        let mut gallery = h.console.gallery();

        gallery
            .begin_new(GalleryProject::new("Sofa Set", "Three-seater in teal velvet"))
            .unwrap();
        gallery.attach(image("front view.jpg")).unwrap();
        gallery.attach(image("side.png")).unwrap();
        let notice = gallery.submit().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(gallery.state().is_viewing());
        assert_eq!(h.storage.upload_count(), 2);

        let rows = h.store.rows(tables::GALLERY).await;
        assert_eq!(rows.len(), 1);
        let media = stored_list(&rows[0]["media"]);
        assert_eq!(media.len(), 2);
        assert!(media.iter().all(|p| p.starts_with("gallery/")));
        assert!(media[0].ends_with("-front-view.jpg"));
        assert!(media[1].ends_with("-side.png"));

        // The refreshed list renders both in upload order.
        let project = gallery.records()[0].clone();
        let urls: Vec<&str> = project.media.urls().collect();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].starts_with("https://cdn.test/storage/v1/object/public/product-images/gallery/"));
        assert!(urls[0].ends_with("-front-view.jpg"));
        assert!(urls[1].ends_with("-side.png"));

        let outcome = gallery.delete(&project).await.unwrap();
        let mut removed = h.storage.remove_calls().await.concat();
        removed.sort();
        let mut expected = media.clone();
        expected.sort();
        assert_eq!(removed, expected);
        assert_eq!(outcome.removed.len(), 2);
        assert!(h.store.rows(tables::GALLERY).await.is_empty());
        assert!(gallery.records().is_empty());
    }

    #[tokio::test]
    async fn test_row_deleted_even_when_cleanup_fails() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::GALLERY,
            vec![row(json!({"id": 5, "title": "Desk", "description": "Oak",
                "media": "[\"gallery/1-a.jpg\",\"gallery/2-b.jpg\"]"}))],
        );
        let storage = bucket()
            .with_object("gallery/1-a.jpg", b"a")
            .with_object("gallery/2-b.jpg", b"b")
            .fail_removal_of("gallery/2-b.jpg");
        let h = harness(store, storage);
        let mut gallery = h.console.gallery();
        gallery.refresh().await.unwrap();

        let project = gallery.records()[0].clone();
        let outcome = gallery.delete(&project).await.unwrap();
        assert_eq!(outcome.removed, vec!["gallery/1-a.jpg"]);
        assert_eq!(outcome.cleanup_failed, vec!["gallery/2-b.jpg"]);
        assert_eq!(outcome.notice.level, NoticeLevel::Warning);
        assert!(h.store.rows(tables::GALLERY).await.is_empty());
        assert!(h.storage.contains("gallery/2-b.jpg").await);
    }

    #[tokio::test]
    async fn test_remote_url_media_is_cleaned_up_by_folder() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::GALLERY,
            vec![row(json!({"id": 42, "title": "Old", "description": "Legacy",
                "media": "https://host/gallery/42-photo.png"}))],
        );
        let h = harness(store, bucket().with_object("gallery/42-photo.png", b"x"));
        let mut gallery = h.console.gallery();
        gallery.refresh().await.unwrap();
        let project = gallery.records()[0].clone();
        gallery.delete(&project).await.unwrap();
        assert_eq!(h.storage.remove_calls().await, vec![vec!["gallery/42-photo.png".to_string()]]);
        assert!(!h.storage.contains("gallery/42-photo.png").await);
    }

    #[tokio::test]
    async fn test_team_edit_without_new_file_keeps_image() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::TEAM_MEMBERS,
            vec![row(json!({"id": 1, "name": "Meera", "role": "Designer",
                "image_url": "team-members/1700000000000-meera.png"}))],
        );
        let h = harness(store, bucket());
        let mut team = h.console.team();
        team.refresh().await.unwrap();

        team.begin_edit(team.records()[0].clone()).unwrap();
        team.draft_mut().unwrap().role = "Head of Design".into();
        team.submit().await.unwrap();

        assert_eq!(h.storage.upload_count(), 0);
        let rows = h.store.rows(tables::TEAM_MEMBERS).await;
        assert_eq!(rows[0]["role"], "Head of Design");
        assert_eq!(rows[0]["image_url"], "team-members/1700000000000-meera.png");
    }

    #[tokio::test]
    async fn test_new_team_member_requires_image() {
        let h = harness(InMemoryRecordStore::new(), bucket());
        let mut team = h.console.team();
        team.begin_new(TeamMember::new("Arun", "Carpenter")).unwrap();
        let err = team.submit().await.unwrap_err();
        assert!(matches!(err, ShowroomError::Validation(_)));
        assert!(matches!(team.state(), EditorState::EditingNew(_)));

        team.attach(image("arun.png")).unwrap();
        team.submit().await.unwrap();
        let rows = h.store.rows(tables::TEAM_MEMBERS).await;
        let stored = rows[0]["image_url"].as_str().unwrap();
        assert!(stored.starts_with("team-members/") && stored.ends_with("-arun.png"));
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_upload() {
        let h = harness(InMemoryRecordStore::new(), bucket());
        let mut gallery = h.console.gallery();
        gallery.begin_new(GalleryProject::new("", "no title")).unwrap();
        gallery.attach(image("a.jpg")).unwrap();
        assert!(matches!(gallery.submit().await, Err(ShowroomError::Validation(_))));
        assert_eq!(h.storage.upload_count(), 0);
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_before_write_and_keeps_draft() {
        let h = harness(InMemoryRecordStore::new(), bucket().fail_uploads_named("broken.png"));
        let mut gallery = h.console.gallery();
        gallery.begin_new(GalleryProject::new("Sofa Set", "Velvet")).unwrap();
        gallery.attach(image("ok.jpg")).unwrap();
        gallery.attach(image("broken.png")).unwrap();

        let err = gallery.submit().await.unwrap_err();
        assert!(matches!(err, ShowroomError::UploadFailed { .. }));
        assert_eq!(h.store.write_count(), 0);
        match gallery.state() {
            EditorState::EditingNew(draft) => {
                assert_eq!(draft.pending_files().len(), 2);
                assert_eq!(draft.record.title, "Sofa Set");
            }
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_failed_write_returns_to_editing_existing() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::STORIES,
            vec![row(json!({"id": 3, "title": "Sale", "description": "Weekend", "media": "stories/1-sale.jpg"}))],
        );
        let h = harness(store, bucket());
        let mut stories = h.console.stories();
        stories.refresh().await.unwrap();
        stories.begin_edit(stories.records()[0].clone()).unwrap();
        stories.draft_mut().unwrap().title = "Mega Sale".into();

        h.store.fail_next_write();
        assert!(matches!(stories.submit().await, Err(ShowroomError::Persist { .. })));
        match stories.state() {
            EditorState::EditingExisting(draft) => assert_eq!(draft.record.title, "Mega Sale"),
            other => panic!("unexpected state {}", other.name()),
        }

        stories.submit().await.unwrap();
        assert_eq!(h.store.rows(tables::STORIES).await[0]["title"], "Mega Sale");
    }

    #[tokio::test]
    async fn test_story_new_file_replaces_media() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::STORIES,
            vec![row(json!({"id": 3, "title": "Sale", "description": "Weekend", "media": "stories/1-sale.jpg"}))],
        );
        let h = harness(store, bucket());
        let mut stories = h.console.stories();
        stories.refresh().await.unwrap();
        stories.begin_edit(stories.records()[0].clone()).unwrap();
        stories.attach(image("first.png")).unwrap();
        stories.attach(LocalFile::new("teaser.mp4", vec![0u8; 8])).unwrap();
        assert_eq!(stories.draft().unwrap().pending_files().len(), 1);
        stories.submit().await.unwrap();

        let media = h.store.rows(tables::STORIES).await[0]["media"].clone();
        let media = media.as_str().unwrap();
        assert!(media.starts_with("stories/") && media.ends_with("-teaser.mp4"));
        assert_eq!(h.storage.upload_count(), 1);

        let story: &Story = &stories.records()[0];
        assert!(story.media.first().unwrap().is_video());
    }

    #[tokio::test]
    async fn test_product_edit_appends_and_mirrors_legacy_column() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::PRODUCTS,
            vec![row(json!({"id": 9, "name": "Recliner", "price": 499, "category": "Living Room",
                "images": "[\"products/1-a.png\"]", "legacy_image": "products/1-a.png"}))],
        );
        let h = harness(store, bucket());
        let mut products = h.console.products();
        products.refresh().await.unwrap();
        products.begin_edit(products.records()[0].clone()).unwrap();
        products.attach(image("back.jpg")).unwrap();
        products.submit().await.unwrap();

        let rows = h.store.rows(tables::PRODUCTS).await;
        let images = stored_list(&rows[0]["images"]);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0], "products/1-a.png");
        assert!(images[1].ends_with("-back.jpg"));
        assert_eq!(rows[0]["legacy_image"], "products/1-a.png");
    }

    #[tokio::test]
    async fn test_product_category_checked_against_catalog() {
        let h = harness(InMemoryRecordStore::new(), bucket());
        let mut products = h.console.products();
        products.begin_new(Product::new("Lamp", 40.0, "Garden")).unwrap();
        products.attach(image("lamp.jpg")).unwrap();
        assert!(matches!(products.submit().await, Err(ShowroomError::Validation(_))));
        assert_eq!(h.storage.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_detach_rewrites_media_without_deleting_objects() {
        let store = InMemoryRecordStore::new().with_rows(
            tables::GALLERY,
            vec![row(json!({"id": 1, "title": "Den", "description": "Cosy",
                "media": "[\"gallery/1-a.jpg\",\"gallery/2-b.jpg\"]"}))],
        );
        let h = harness(store, bucket().with_object("gallery/1-a.jpg", b"a"));
        let mut gallery = h.console.gallery();
        gallery.refresh().await.unwrap();
        gallery.begin_edit(gallery.records()[0].clone()).unwrap();
        let dropped = gallery.detach(0).unwrap();
        assert_eq!(dropped.raw, "gallery/1-a.jpg");
        assert!(gallery.detach(5).is_err());
        gallery.submit().await.unwrap();

        let rows = h.store.rows(tables::GALLERY).await;
        assert_eq!(stored_list(&rows[0]["media"]), vec!["gallery/2-b.jpg"]);
        assert!(h.storage.contains("gallery/1-a.jpg").await);
        assert!(h.storage.remove_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_media_column_is_not_rewritten() {
        // A legacy bare-URL row would be re-encoded as an array if rewritten.
        let store = InMemoryRecordStore::new().with_rows(
            tables::GALLERY,
            vec![row(json!({"id": 1, "title": "Den", "description": "Cosy",
                "media": "https://old.cdn/den.jpg"}))],
        );
        let h = harness(store, bucket());
        let mut gallery = h.console.gallery();
        gallery.refresh().await.unwrap();
        gallery.begin_edit(gallery.records()[0].clone()).unwrap();
        gallery.draft_mut().unwrap().description = "Very cosy".into();
        gallery.submit().await.unwrap();

        let rows = h.store.rows(tables::GALLERY).await;
        assert_eq!(rows[0]["media"], "https://old.cdn/den.jpg");
        assert_eq!(rows[0]["description"], "Very cosy");
    }

    #[tokio::test]
    async fn test_title_edit_keeps_stored_expiry_and_type() {
        let store = InMemoryRecordStore::new()
            .with_rows(
                tables::STORIES,
                vec![row(json!({"id": 3, "title": "Sale", "description": "Weekend",
                    "expires_at": "2026-12-31T18:30:00", "media": "stories/1-sale.jpg"}))],
            )
            .with_rows(
                tables::GALLERY,
                vec![row(json!({"id": 1, "title": "Den", "description": "Cosy",
                    "type": "showcase", "size": "medium", "media": "gallery/1-den.jpg"}))],
            );
        let h = harness(store, bucket());

        let mut stories = h.console.stories();
        stories.refresh().await.unwrap();
        let story = stories.records()[0].clone();
        assert!(story.expires_at.is_some());
        stories.begin_edit(story).unwrap();
        stories.draft_mut().unwrap().title = "Winter Sale".into();
        stories.submit().await.unwrap();

        let rows = h.store.rows(tables::STORIES).await;
        assert_eq!(rows[0]["title"], "Winter Sale");
        assert_eq!(rows[0]["expires_at"], "2026-12-31T18:30:00");

        let mut gallery = h.console.gallery();
        gallery.refresh().await.unwrap();
        gallery.begin_edit(gallery.records()[0].clone()).unwrap();
        gallery.draft_mut().unwrap().title = "Reading Den".into();
        gallery.submit().await.unwrap();

        let rows = h.store.rows(tables::GALLERY).await;
        assert_eq!(rows[0]["title"], "Reading Den");
        assert_eq!(rows[0]["type"], "showcase");
    }

    #[tokio::test]
    async fn test_state_guards() {
        let h = harness(InMemoryRecordStore::new(), bucket());
        let mut gallery = h.console.gallery();
        assert!(gallery.attach(image("a.jpg")).is_err());
        assert!(gallery.submit().await.is_err());
        assert!(gallery.state().is_viewing());

        gallery.begin_new(GalleryProject::new("A", "B")).unwrap();
        assert!(gallery.begin_new(GalleryProject::new("C", "D")).is_err());
        assert!(gallery.attach(LocalFile::new("brochure.pdf", vec![1u8])).is_err());

        let stray = GalleryProject::new("A", "B");
        assert!(gallery.delete(&stray).await.is_err());

        gallery.cancel();
        assert!(gallery.state().is_viewing());
        assert!(gallery.begin_edit(GalleryProject::new("no id", "x")).is_err());
    }
}
