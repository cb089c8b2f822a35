use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::{Result, ShowroomError};
use crate::types::{AuthSession, AuthUser, MatchKey, Query, Row};

/// Hosted relational tables: the system of record.
///
/// Each call is a single request/response round trip with no retry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows from `table` matching the query.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>>;

    /// Insert one row, returning it as stored (with generated keys).
    async fn insert(&self, table: &str, row: Row) -> Result<Row>;

    /// Apply `changes` to the rows matching `key`.
    async fn update(&self, table: &str, changes: Row, key: &MatchKey) -> Result<()>;

    /// Delete the rows matching `key`.
    async fn delete(&self, table: &str, key: &MatchKey) -> Result<()>;

    /// Invoke a stored function with named JSON arguments.
    async fn call(&self, function: &str, args: Value) -> Result<Value>;

    /// Fetch at most one row.
    async fn select_one(&self, table: &str, query: &Query) -> Result<Option<Row>> {
        Ok(self.select(table, query).await?.into_iter().next())
    }
}

/// Hosted object storage bound to a single bucket with folder-prefixed keys.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Name of the bucket this gateway writes to.
    fn bucket(&self) -> &str;

    /// Store `data` at `path`. Never overwrites an existing object.
    /// Returns the bucket-relative storage path.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String>;

    /// Publicly fetchable URL for a storage path. Pure; a missing object
    /// still yields a well-formed URL.
    fn public_url(&self, path: &str) -> String;

    /// Remove a set of objects. Partial failure is reported, never raised.
    async fn remove(&self, paths: &[String]) -> RemovalReport;
}

/// Per-path outcome of a [`StorageGateway::remove`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<String>,
    /// `(path, reason)` for every path that was not removed.
    pub failed: Vec<(String, String)>,
}

impl RemovalReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `CleanupPartialFailure` describing the paths left behind, if any.
    pub fn failure(&self) -> Option<ShowroomError> {
        if self.failed.is_empty() {
            return None;
        }
        Some(ShowroomError::CleanupPartialFailure {
            failed: self.failed.iter().map(|(path, _)| path.clone()).collect(),
        })
    }
}

/// Session-based identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Resolve the user behind a still-valid access token.
    async fn current_user(&self, access_token: &str) -> Result<AuthUser>;
}
