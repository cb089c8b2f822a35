//! Upload naming and batch uploads.

use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use showroom_core::{RecordKind, ShowroomError, StorageGateway};

use crate::mime_detect::detect_mime_type;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A file selected by the operator, not yet uploaded.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = detect_mime_type(Path::new(&name)).to_string();
        Self {
            name,
            content_type,
            data: data.into(),
        }
    }

    /// Read a file from disk, naming it after the path's final component.
    pub async fn read(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("No usable file name in {}", path.display()))?;
        Ok(Self::new(name, data))
    }
}

/// Replace every run of whitespace with a single hyphen.
pub fn sanitize_file_name(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name, "-").into_owned()
}

/// `<folder>/<timestamp>-<sanitized name>`.
pub fn storage_path(kind: RecordKind, file_name: &str, timestamp_ms: i64) -> String {
    format!("{}/{}-{}", kind.folder(), timestamp_ms, sanitize_file_name(file_name))
}

/// Upload every file concurrently and wait for all of them.
///
/// Returns the storage paths in input order. If any upload fails the whole
/// batch fails; objects that did land stay behind as orphans.
pub async fn upload_all(
    storage: &dyn StorageGateway,
    kind: RecordKind,
    files: &[LocalFile],
) -> Result<Vec<String>, ShowroomError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    // One millisecond apart keeps paths distinct within a batch.
    let base = Utc::now().timestamp_millis();
    let uploads = files.iter().enumerate().map(|(i, file)| {
        let path = storage_path(kind, &file.name, base + i as i64);
        async move {
            storage
                .upload(&path, file.data.clone(), &file.content_type)
                .await
        }
    });

    let results = join_all(uploads).await;

    let mut stored = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(path) => stored.push(path),
            Err(e) => {
                warn!(error = %e, "Upload failed");
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        if !stored.is_empty() {
            warn!(orphans = ?stored, "Submission aborted after partial upload");
        }
        return Err(e);
    }

    info!(count = stored.len(), folder = kind.folder(), "Uploaded media");
    Ok(stored)
}
