//! Object storage over the Storage API (`/storage/v1`).

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use showroom_core::{RemovalReport, Result, ShowroomError, StorageGateway};

use crate::connection::{error_message, Connection};

/// Default `Cache-Control` max-age applied to uploads.
pub const DEFAULT_CACHE_CONTROL_SECS: u64 = 3600;

/// [`StorageGateway`] for one bucket.
pub struct RestStorage {
    conn: Connection,
    bucket: String,
    cache_control_secs: u64,
}

/// Percent-encodes each segment of an object key, keeping the `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Deserialize)]
struct RemovedObject {
    name: String,
}

impl RestStorage {
    pub fn new(conn: Connection, bucket: impl Into<String>) -> Self {
        Self {
            conn,
            bucket: bucket.into(),
            cache_control_secs: DEFAULT_CACHE_CONTROL_SECS,
        }
    }

    pub fn with_cache_control(mut self, secs: u64) -> Self {
        self.cache_control_secs = secs;
        self
    }

    fn object_url(&self, path: &str) -> String {
        self.conn
            .endpoint(&format!("storage/v1/object/{}/{}", self.bucket, encode_path(path)))
    }

    fn bucket_url(&self) -> String {
        self.conn.endpoint(&format!("storage/v1/object/{}", self.bucket))
    }
}

#[async_trait]
impl StorageGateway for RestStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String> {
        debug!(bucket = %self.bucket, path = %path, bytes = data.len(), "Uploading object");
        let response = self
            .conn
            .authorize(self.conn.client().post(self.object_url(path)))
            .header("Content-Type", content_type)
            .header("Cache-Control", format!("max-age={}", self.cache_control_secs))
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| ShowroomError::upload(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShowroomError::upload(
                path,
                format!("{}: {}", status, error_message(&body)),
            ));
        }
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        self.conn
            .endpoint(&format!(
                "storage/v1/object/public/{}/{}",
                self.bucket,
                encode_path(path)
            ))
    }

    async fn remove(&self, paths: &[String]) -> RemovalReport {
        if paths.is_empty() {
            return RemovalReport::default();
        }
        let all_failed = |reason: String| RemovalReport {
            removed: Vec::new(),
            failed: paths.iter().map(|p| (p.clone(), reason.clone())).collect(),
        };

        let response = match self
            .conn
            .authorize(self.conn.client().delete(self.bucket_url()))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Storage removal request failed");
                return all_failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return all_failed(format!("{}: {}", status, error_message(&body)));
        }

        let removed: Vec<RemovedObject> = match response.json().await {
            Ok(removed) => removed,
            Err(e) => return all_failed(format!("unreadable removal result: {e}")),
        };
        partition_removed(paths, removed.into_iter().map(|o| o.name).collect())
    }
}

/// Split requested paths by whether the service reported them removed.
fn partition_removed(requested: &[String], removed: Vec<String>) -> RemovalReport {
    let mut report = RemovalReport::default();
    for path in requested {
        if removed.iter().any(|name| name == path) {
            report.removed.push(path.clone());
        } else {
            report.failed.push((path.clone(), "object not removed".to_string()));
        }
    }
    report
}
