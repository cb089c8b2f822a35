//! Console Event Logger
//!
//! Structured events (record writes, media cleanup outcomes, session changes)
//! and operator notices, written through `tracing` so they land in the
//! rolling NDJSON file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use showroom_core::{Notice, NoticeLevel};

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "console_events";
pub const NOTICE_TARGET: &str = "notices";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    RecordCreated { table: String, id: String },
    RecordUpdated { table: String, id: String },
    RecordDeleted { table: String, id: String },
    /// Objects uploaded for a save that then failed; nothing references them.
    OrphanedUploads { paths: Vec<String> },
    /// Objects that could not be removed when their record was deleted.
    CleanupFailed { paths: Vec<String> },
    SignedIn { email: String, role: String },
    SignedOut,
    AdminAdded { email: String, role: String },
    AdminRemoved { admin_id: String },
}

impl ConsoleEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            ConsoleEvent::OrphanedUploads { .. } | ConsoleEvent::CleanupFailed { .. }
        )
    }

    fn redact(mut self) -> Self {
        match &mut self {
            ConsoleEvent::SignedIn { email, .. } | ConsoleEvent::AdminAdded { email, .. } => {
                *email = redact_sensitive_data(email);
            }
            _ => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub event: ConsoleEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs one console event. Failures go out at `warn`.
    pub fn log_event(actor: Option<&str>, event: ConsoleEvent) -> EventLogEntry {
        let entry = EventLogEntry {
            actor: actor.map(str::to_string),
            timestamp: Utc::now(),
            event: event.redact(),
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_failure() {
            warn!(target: EVENT_TARGET, entry = %json, "Console event");
        } else {
            info!(target: EVENT_TARGET, entry = %json, "Console event");
        }
        entry
    }
}

pub struct NoticeLogger;

impl NoticeLogger {
    /// Mirrors a user-visible notice into the log at a matching level.
    pub fn emit(notice: &Notice) {
        let message = redact_sensitive_data(&notice.message);
        match notice.level {
            NoticeLevel::Success => info!(target: NOTICE_TARGET, %message, "Notice"),
            NoticeLevel::Warning => warn!(target: NOTICE_TARGET, %message, "Notice"),
            NoticeLevel::Error => error!(target: NOTICE_TARGET, %message, "Notice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_redacts_email() {
        let entry = EventLogger::log_event(
            Some("ops"),
            ConsoleEvent::SignedIn { email: "owner@store.io".into(), role: "admin".into() },
        );
        assert_eq!(
            entry.event,
            ConsoleEvent::SignedIn { email: "[REDACTED_EMAIL]".into(), role: "admin".into() }
        );
    }

    #[test]
    fn test_entry_serializes_tagged() {
        let entry = EventLogger::log_event(
            None,
            ConsoleEvent::CleanupFailed { paths: vec!["gallery/1-a.jpg".into()] },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "cleanup_failed");
        assert_eq!(json["event"]["paths"][0], "gallery/1-a.jpg");
        assert!(json["actor"].is_null());
    }
}
