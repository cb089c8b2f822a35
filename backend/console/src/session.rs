//! The signed-in operator: identity session plus admin role.
//!
//! A [`SessionContext`] is an explicit value. It is built once by
//! [`SessionContext::sign_in`], handed to whatever needs identity or role,
//! and consumed by [`SessionContext::sign_out`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use showroom_core::{
    tables, AuthSession, AuthUser, IdentityProvider, Query, RecordStore, Result, Role,
    ShowroomError,
};
use showroom_logging::{ConsoleEvent, EventLogger};

/// Minimum password length accepted by the auth service.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    session: AuthSession,
    role: Role,
}

fn check_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ShowroomError::validation("email and password are required"));
    }
    Ok(())
}

impl SessionContext {
    /// Authenticate, then confirm the user has a row in the admin roster.
    ///
    /// A valid login without an admin row is refused and its token revoked.
    pub async fn sign_in(
        identity: &dyn IdentityProvider,
        store: &dyn RecordStore,
        email: &str,
        password: &str,
    ) -> Result<Self> {
        check_credentials(email, password)?;
        let session = identity.sign_in(email.trim(), password).await?;
        Self::authorize(identity, store, session).await
    }

    /// Look up the role of an already authenticated session.
    ///
    /// `store` should act as the session's user when the roster is only
    /// readable by signed-in users.
    pub async fn authorize(
        identity: &dyn IdentityProvider,
        store: &dyn RecordStore,
        session: AuthSession,
    ) -> Result<Self> {
        let query = Query::all()
            .columns(&["role", "user_id"])
            .eq("user_id", session.user.id.to_string());
        let role = match store.select_one(tables::ADMINS, &query).await {
            Ok(Some(row)) => row.get("role").and_then(Value::as_str).and_then(Role::parse),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Admin lookup failed");
                None
            }
        };

        let Some(role) = role else {
            if let Err(e) = identity.sign_out(&session.access_token).await {
                warn!(error = %e, "Failed to revoke non-admin session");
            }
            return Err(ShowroomError::Unauthorized(
                "you are not authorized as an admin".into(),
            ));
        };

        let context = Self { session, role };
        EventLogger::log_event(
            None,
            ConsoleEvent::SignedIn {
                email: context.actor(),
                role: role.to_string(),
            },
        );
        Ok(context)
    }

    /// Register a new identity. It cannot sign in here until a superadmin
    /// adds it to the roster.
    pub async fn sign_up(
        identity: &dyn IdentityProvider,
        email: &str,
        password: &str,
    ) -> Result<AuthUser> {
        check_credentials(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ShowroomError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = identity.sign_up(email.trim(), password).await?;
        info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    /// Revoke the token at the provider and drop the context.
    pub async fn sign_out(self, identity: &dyn IdentityProvider) -> Result<()> {
        identity.sign_out(&self.session.access_token).await?;
        EventLogger::log_event(Some(&self.actor()), ConsoleEvent::SignedOut);
        Ok(())
    }

    /// Ask the provider who this token belongs to. Fails once the token has
    /// been revoked or has expired.
    pub async fn verify(&self, identity: &dyn IdentityProvider) -> Result<AuthUser> {
        if self.is_expired(Utc::now()) {
            return Err(ShowroomError::Auth("session expired, sign in again".into()));
        }
        identity.current_user(&self.session.access_token).await
    }

    pub fn user(&self) -> &AuthUser {
        &self.session.user
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.session.is_expired(now)
    }

    /// Label used in log events: the e-mail when known, else the user id.
    pub fn actor(&self) -> String {
        self.session
            .user
            .email
            .clone()
            .unwrap_or_else(|| self.session.user.id.to_string())
    }

    pub fn require_superadmin(&self) -> Result<()> {
        match self.role {
            Role::Superadmin => Ok(()),
            Role::Admin => Err(ShowroomError::Unauthorized(
                "only a superadmin can manage admins".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use showroom_core::{InMemoryIdentity, InMemoryRecordStore, Row};
    use uuid::Uuid;

    fn admin_row(user_id: Uuid, role: &str) -> Row {
        json!({"admin_id": 1, "email": "x@store.io", "role": role, "user_id": user_id.to_string()})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_reads_role() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "owner@store.io", "s3cret!");
        let store = InMemoryRecordStore::new()
            .with_rows(tables::ADMINS, vec![admin_row(id, "superadmin")]);

        let ctx = SessionContext::sign_in(&identity, &store, "owner@store.io", "s3cret!")
            .await
            .unwrap();
        assert_eq!(ctx.role(), Role::Superadmin);
        assert_eq!(ctx.user().id, id);
        assert!(ctx.require_superadmin().is_ok());
        assert_eq!(ctx.verify(&identity).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_non_admin_is_refused_and_revoked() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "shopper@mail.com", "pw123456");
        let store = InMemoryRecordStore::new();

        let err = SessionContext::sign_in(&identity, &store, "shopper@mail.com", "pw123456")
            .await
            .unwrap_err();
        assert!(matches!(err, ShowroomError::Unauthorized(_)));
        assert_eq!(identity.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_authorize_existing_session() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "staff@store.io", "pw123456");
        let store = InMemoryRecordStore::new().with_rows(tables::ADMINS, vec![admin_row(id, "admin")]);

        let session = identity.sign_in("staff@store.io", "pw123456").await.unwrap();
        let ctx = SessionContext::authorize(&identity, &store, session).await.unwrap();
        assert_eq!(ctx.role(), Role::Admin);
        assert_eq!(ctx.actor(), "staff@store.io");
    }

    #[tokio::test]
    async fn test_unknown_role_is_refused() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "ed@store.io", "pw123456");
        let store = InMemoryRecordStore::new().with_rows(tables::ADMINS, vec![admin_row(id, "editor")]);
        assert!(SessionContext::sign_in(&identity, &store, "ed@store.io", "pw123456")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_plain_admin_is_not_superadmin() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "staff@store.io", "pw123456");
        let store = InMemoryRecordStore::new().with_rows(tables::ADMINS, vec![admin_row(id, "admin")]);
        let ctx = SessionContext::sign_in(&identity, &store, "staff@store.io", "pw123456")
            .await
            .unwrap();
        assert!(matches!(ctx.require_superadmin(), Err(ShowroomError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let id = Uuid::new_v4();
        let identity = InMemoryIdentity::new().with_user(id, "owner@store.io", "s3cret!");
        let store = InMemoryRecordStore::new().with_rows(tables::ADMINS, vec![admin_row(id, "admin")]);
        let ctx = SessionContext::sign_in(&identity, &store, "owner@store.io", "s3cret!")
            .await
            .unwrap();
        let token = ctx.access_token().to_string();
        ctx.sign_out(&identity).await.unwrap();
        assert!(identity.current_user(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_calling_provider() {
        let identity = InMemoryIdentity::new();
        assert!(matches!(
            SessionContext::sign_up(&identity, "new@store.io", "abc").await,
            Err(ShowroomError::Validation(_))
        ));
        let user = SessionContext::sign_up(&identity, "new@store.io", "abcdef").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("new@store.io"));
    }

    #[test]
    fn test_context_round_trips_through_json() {
        let ctx = SessionContext {
            session: AuthSession {
                access_token: "jwt".into(),
                refresh_token: None,
                expires_at: None,
                user: AuthUser { id: Uuid::nil(), email: None },
            },
            role: Role::Admin,
        };
        let back: SessionContext = serde_json::from_value(serde_json::to_value(&ctx).unwrap()).unwrap();
        assert_eq!(back.role(), Role::Admin);
        assert_eq!(back.actor(), Uuid::nil().to_string());
    }
}
