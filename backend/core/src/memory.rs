//! In-memory backends for local runs and tests.
//!
//! Each type mirrors the contract of its trait, including partial removal
//! failure and no-overwrite uploads, and exposes knobs for injecting failures.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, ShowroomError};
use crate::traits::{IdentityProvider, RecordStore, RemovalReport, StorageGateway};
use crate::types::{AuthSession, AuthUser, MatchKey, Query, Row};

type StoredFunction = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Table store kept in process memory.
pub struct InMemoryRecordStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    keys: HashMap<String, String>,
    functions: HashMap<String, StoredFunction>,
    next_id: AtomicU64,
    fail_next_write: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            keys: HashMap::new(),
            functions: HashMap::new(),
            next_id: AtomicU64::new(1),
            fail_next_write: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Use `column` instead of `id` as the generated key of `table`.
    pub fn with_key(mut self, table: &str, column: &str) -> Self {
        self.keys.insert(table.to_string(), column.to_string());
        self
    }

    /// Seed a table with existing rows.
    pub fn with_rows(mut self, table: &str, rows: Vec<Row>) -> Self {
        self.tables
            .get_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Register a stored function reachable through [`RecordStore::call`].
    pub fn with_function<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Box::new(f));
        self
    }

    /// Make the next insert, update, or delete fail with a persist error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, AtomicOrdering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Snapshot of a table.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.lock().await.get(table).cloned().unwrap_or_default()
    }

    fn key_column(&self, table: &str) -> &str {
        self.keys.get(table).map(String::as_str).unwrap_or("id")
    }

    fn check_write(&self, table: &str) -> Result<()> {
        if self.fail_next_write.swap(false, AtomicOrdering::SeqCst) {
            return Err(ShowroomError::persist(table, "simulated write failure"));
        }
        Ok(())
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(row: &Row, column: &str, value: &Value) -> bool {
    row.get(column).map(|v| v == value).unwrap_or(false)
}

/// Total order used for `order by`: numbers, then strings, missing/null last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, &f.column, &f.value)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if let Some(columns) = &query.columns {
            rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter(|(k, _)| columns.contains(k))
                        .collect()
                })
                .collect();
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row> {
        self.check_write(table)?;
        let key = self.key_column(table).to_string();
        if !row.contains_key(&key) {
            let generated = if key == "id" {
                Value::from(self.next_id.fetch_add(1, AtomicOrdering::SeqCst))
            } else {
                Value::from(Uuid::new_v4().to_string())
            };
            row.insert(key, generated);
        }
        row.entry("created_at")
            .or_insert_with(|| Value::from(Utc::now().to_rfc3339()));

        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(table = %table, "In-memory insert");
        Ok(row)
    }

    async fn update(&self, table: &str, changes: Row, key: &MatchKey) -> Result<()> {
        self.check_write(table)?;
        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, &key.column, &key.value)) {
                for (column, value) in &changes {
                    row.insert(column.clone(), value.clone());
                }
            }
        }
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn delete(&self, table: &str, key: &MatchKey) -> Result<()> {
        self.check_write(table)?;
        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !matches(r, &key.column, &key.value));
        }
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn call(&self, function: &str, args: Value) -> Result<Value> {
        let f = self
            .functions
            .get(function)
            .ok_or_else(|| ShowroomError::NotFound(format!("function {function}")))?;
        Ok(f(&args))
    }
}

/// Object bucket kept in process memory.
pub struct InMemoryStorage {
    bucket: String,
    base_url: String,
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    failing_uploads: HashSet<String>,
    failing_removals: HashSet<String>,
    uploads: AtomicUsize,
    remove_calls: Mutex<Vec<Vec<String>>>,
}

impl InMemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: "https://storage.test".to_string(),
            objects: Mutex::new(HashMap::new()),
            failing_uploads: HashSet::new(),
            failing_removals: HashSet::new(),
            uploads: AtomicUsize::new(0),
            remove_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reject uploads whose path ends with `file_name`.
    pub fn fail_uploads_named(mut self, file_name: &str) -> Self {
        self.failing_uploads.insert(file_name.to_string());
        self
    }

    /// Report `path` as not removed on every removal attempt.
    pub fn fail_removal_of(mut self, path: &str) -> Self {
        self.failing_removals.insert(path.to_string());
        self
    }

    /// Seed an object without counting it as an upload.
    pub fn with_object(mut self, path: &str, data: &[u8]) -> Self {
        self.objects.get_mut().insert(
            path.to_string(),
            (Bytes::copy_from_slice(data), "application/octet-stream".to_string()),
        );
        self
    }

    /// Number of successful uploads.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(AtomicOrdering::SeqCst)
    }

    /// Every path set passed to `remove`, in call order.
    pub async fn remove_calls(&self) -> Vec<Vec<String>> {
        self.remove_calls.lock().await.clone()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.lock().await.contains_key(path)
    }

    pub async fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl StorageGateway for InMemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
        if self.failing_uploads.iter().any(|name| path.ends_with(name.as_str())) {
            return Err(ShowroomError::upload(path, "simulated upload failure"));
        }
        let mut objects = self.objects.lock().await;
        if objects.contains_key(path) {
            return Err(ShowroomError::upload(path, "object already exists"));
        }
        objects.insert(path.to_string(), (data, content_type.to_string()));
        self.uploads.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn remove(&self, paths: &[String]) -> RemovalReport {
        self.remove_calls.lock().await.push(paths.to_vec());
        let mut objects = self.objects.lock().await;
        let mut report = RemovalReport::default();
        for path in paths {
            if self.failing_removals.contains(path) {
                report.failed.push((path.clone(), "simulated removal failure".into()));
            } else if objects.remove(path).is_some() {
                report.removed.push(path.clone());
            } else {
                report.failed.push((path.clone(), "object not found".into()));
            }
        }
        report
    }
}

/// Identity provider with a fixed user table.
#[derive(Default)]
pub struct InMemoryIdentity {
    users: Mutex<HashMap<String, (String, Uuid)>>,
    sessions: Mutex<HashMap<String, AuthUser>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: Uuid, email: &str, password: &str) -> Self {
        self.users
            .get_mut()
            .insert(email.to_string(), (password.to_string(), id));
        self
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let users = self.users.lock().await;
        let (stored, id) = users
            .get(email)
            .ok_or_else(|| ShowroomError::Auth("Invalid login credentials".into()))?;
        if stored != password {
            return Err(ShowroomError::Auth("Invalid login credentials".into()));
        }
        let user = AuthUser {
            id: *id,
            email: Some(email.to_string()),
        };
        let token = format!("token-{}", Uuid::new_v4());
        self.sessions.lock().await.insert(token.clone(), user.clone());
        Ok(AuthSession {
            access_token: token,
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let mut users = self.users.lock().await;
        if users.contains_key(email) {
            return Err(ShowroomError::Auth("User already registered".into()));
        }
        let id = Uuid::new_v4();
        users.insert(email.to_string(), (password.to_string(), id));
        Ok(AuthUser {
            id,
            email: Some(email.to_string()),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.sessions
            .lock()
            .await
            .remove(access_token)
            .map(|_| ())
            .ok_or_else(|| ShowroomError::Auth("Session not found".into()))
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        self.sessions
            .lock()
            .await
            .get(access_token)
            .cloned()
            .ok_or_else(|| ShowroomError::Auth("Session expired".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_orders() {
        let store = InMemoryRecordStore::new();
        store.insert("quotes", row(json!({"name": "b"}))).await.unwrap();
        store.insert("quotes", row(json!({"name": "a"}))).await.unwrap();

        let rows = store
            .select("quotes", &Query::all().order_by("name", true))
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "a");
        assert_eq!(rows[0]["id"], 2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_update_delete_and_failure_injection() {
        let store = InMemoryRecordStore::new()
            .with_rows("quotes", vec![row(json!({"id": 7, "name": "old"}))]);
        store
            .update("quotes", row(json!({"name": "new"})), &MatchKey::id(7))
            .await
            .unwrap();
        assert_eq!(store.rows("quotes").await[0]["name"], "new");

        store.fail_next_write();
        assert!(store.delete("quotes", &MatchKey::id(7)).await.is_err());
        store.delete("quotes", &MatchKey::id(7)).await.unwrap();
        assert!(store.rows("quotes").await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_key_and_projection() {
        let store = InMemoryRecordStore::new().with_key("admin", "admin_id");
        let inserted = store
            .insert("admin", row(json!({"email": "a@x.io", "role": "admin"})))
            .await
            .unwrap();
        assert!(inserted["admin_id"].is_string());

        let rows = store
            .select("admin", &Query::all().columns(&["role"]))
            .await
            .unwrap();
        assert_eq!(rows[0].len(), 1);
    }

    #[tokio::test]
    async fn test_storage_refuses_overwrite_and_reports_partial_removal() {
        let storage = InMemoryStorage::new("product-images");
        storage
            .upload("gallery/1-a.png", Bytes::from_static(b"a"), "image/png")
            .await
            .unwrap();
        assert!(storage
            .upload("gallery/1-a.png", Bytes::from_static(b"b"), "image/png")
            .await
            .is_err());

        let report = storage
            .remove(&["gallery/1-a.png".into(), "gallery/missing.png".into()])
            .await;
        assert_eq!(report.removed, vec!["gallery/1-a.png".to_string()]);
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn test_storage_public_url() {
        let storage = InMemoryStorage::new("product-images").with_base_url("https://x.supabase.co/");
        assert_eq!(
            storage.public_url("stories/1-a.png"),
            "https://x.supabase.co/storage/v1/object/public/product-images/stories/1-a.png"
        );
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "ops@store.io", "pw");
        assert!(identity.sign_in("ops@store.io", "nope").await.is_err());

        let session = identity.sign_in("ops@store.io", "pw").await.unwrap();
        assert_eq!(session.user.id, id);
        assert_eq!(identity.current_user(&session.access_token).await.unwrap().id, id);

        identity.sign_out(&session.access_token).await.unwrap();
        assert!(identity.current_user(&session.access_token).await.is_err());
    }
}
