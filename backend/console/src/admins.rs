//! The admin roster. Anyone signed in can read it; only a superadmin can
//! change it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use showroom_core::{tables, MatchKey, Notice, Query, RecordStore, Result, Role, Row, ShowroomError};
use showroom_logging::{ConsoleEvent, EventLogger};

use crate::book::{BookEntry, TableBook};
use crate::row::id_text;
use crate::search::Searchable;
use crate::session::SessionContext;

/// Stored function resolving an e-mail to the identity's UUID.
pub const USER_LOOKUP_FUNCTION: &str = "get_user_uuid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub admin_id: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Admin {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }
}

impl BookEntry for Admin {
    const TABLE: &'static str = tables::ADMINS;
    const KEY_COLUMN: &'static str = "admin_id";
    const LABEL: &'static str = "Admin";
    const SEARCH_FIELDS: &'static [&'static str] = &["email", "role"];

    fn key_value(&self) -> &Value {
        &self.admin_id
    }

    fn list_query() -> Query {
        Query::all()
    }
}

impl Searchable for Admin {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "admin_id" => Some(self.admin_id.clone()),
            "email" => self.email.clone().map(Value::String),
            "role" => self.role.clone().map(Value::String),
            "user_id" => self.user_id.clone().map(Value::String),
            _ => None,
        }
    }
}

pub struct AdminRoster {
    book: TableBook<Admin>,
}

impl AdminRoster {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            book: TableBook::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        self.book.list().await
    }

    async fn lookup_user(&self, email: &str) -> Result<String> {
        let found = self
            .book
            .store()
            .call(USER_LOOKUP_FUNCTION, json!({ "email_input": email }))
            .await?;
        match found {
            Value::String(id) if !id.is_empty() => Ok(id),
            _ => Err(ShowroomError::NotFound(format!(
                "user {email} not found, register first"
            ))),
        }
    }

    /// Grant `role` to a registered user.
    pub async fn add(&self, session: &SessionContext, email: &str, role: Role) -> Result<Notice> {
        session.require_superadmin()?;
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ShowroomError::validation("a valid e-mail is required"));
        }

        let user_id = self.lookup_user(email).await?;

        let existing = self
            .book
            .store()
            .select_one(
                tables::ADMINS,
                &Query::all().columns(&["admin_id"]).eq("user_id", user_id.clone()),
            )
            .await?;
        if existing.is_some() {
            return Err(ShowroomError::validation(format!("{email} is already an admin")));
        }

        let mut row = Row::new();
        row.insert("email".into(), json!(email));
        row.insert("role".into(), json!(role.as_str()));
        row.insert("user_id".into(), json!(user_id));
        self.book.store().insert(tables::ADMINS, row).await?;

        EventLogger::log_event(
            Some(&session.actor()),
            ConsoleEvent::AdminAdded {
                email: email.to_string(),
                role: role.to_string(),
            },
        );
        info!(role = %role, "Admin added");
        Ok(Notice::success("Admin added successfully!"))
    }

    pub async fn remove(&self, session: &SessionContext, admin_id: &Value) -> Result<Notice> {
        session.require_superadmin()?;
        self.book
            .store()
            .delete(tables::ADMINS, &MatchKey::new(Admin::KEY_COLUMN, admin_id.clone()))
            .await?;
        EventLogger::log_event(
            Some(&session.actor()),
            ConsoleEvent::AdminRemoved {
                admin_id: id_text(admin_id),
            },
        );
        Ok(Notice::success("Admin removed successfully!"))
    }
}
