//! Plain tables without media: list, update, delete.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use showroom_core::{MatchKey, Notice, Query, RecordStore, Result, Row, ShowroomError};
use showroom_logging::{ConsoleEvent, EventLogger};

use crate::row::id_text;
use crate::search::Searchable;

/// A row type read straight from its table.
pub trait BookEntry: DeserializeOwned + Searchable + Send + Sync {
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str = "id";
    const LABEL: &'static str;
    /// Fields searched by the list screen.
    const SEARCH_FIELDS: &'static [&'static str];

    fn key_value(&self) -> &Value;

    fn list_query() -> Query {
        Query::all().order_by("created_at", false)
    }
}

pub struct TableBook<T> {
    store: Arc<dyn RecordStore>,
    actor: Option<String>,
    _entry: PhantomData<fn() -> T>,
}

impl<T: BookEntry> TableBook<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            actor: None,
            _entry: PhantomData,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub(crate) fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Fetch every row. Rows that do not fit the entry type are skipped.
    pub async fn list(&self) -> Result<Vec<T>> {
        let rows = self.store.select(T::TABLE, &T::list_query()).await?;
        let total = rows.len();
        let entries: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(table = T::TABLE, error = %e, "Skipping unreadable row");
                    None
                }
            })
            .collect();
        debug!(table = T::TABLE, total, kept = entries.len(), "Loaded rows");
        Ok(entries)
    }

    /// Write `changes` to the row keyed by `id`.
    pub async fn update(&self, id: &Value, changes: Row) -> Result<Notice> {
        if changes.is_empty() {
            return Err(ShowroomError::validation("no changes given"));
        }
        if changes.contains_key(T::KEY_COLUMN) {
            return Err(ShowroomError::validation(format!(
                "{} cannot be changed",
                T::KEY_COLUMN
            )));
        }
        let key = MatchKey::new(T::KEY_COLUMN, id.clone());
        self.store.update(T::TABLE, changes, &key).await?;
        EventLogger::log_event(
            self.actor(),
            ConsoleEvent::RecordUpdated {
                table: T::TABLE.into(),
                id: id_text(id),
            },
        );
        info!(table = T::TABLE, id = %id_text(id), "Row updated");
        Ok(Notice::success(format!("{} updated successfully!", T::LABEL)))
    }

    pub async fn delete(&self, id: &Value) -> Result<Notice> {
        let key = MatchKey::new(T::KEY_COLUMN, id.clone());
        self.store.delete(T::TABLE, &key).await?;
        EventLogger::log_event(
            self.actor(),
            ConsoleEvent::RecordDeleted {
                table: T::TABLE.into(),
                id: id_text(id),
            },
        );
        Ok(Notice::success(format!("{} deleted successfully!", T::LABEL)))
    }
}
