//! Password sign-in against the auth service (`/auth/v1`).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Response;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use showroom_core::{AuthSession, AuthUser, IdentityProvider, Result, ShowroomError};

use crate::connection::{error_message, Connection};

/// [`IdentityProvider`] backed by the hosted auth service.
pub struct RestIdentity {
    conn: Connection,
}

#[derive(Deserialize)]
struct UserPayload {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(user: UserPayload) -> Self {
        AuthUser {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserPayload,
}

impl RestIdentity {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn url(&self, path: &str) -> String {
        self.conn.endpoint(&format!("auth/v1/{path}"))
    }
}

async fn check(response: reqwest::Result<Response>) -> Result<Response> {
    let response = response.map_err(|e| ShowroomError::Auth(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ShowroomError::Auth(error_message(&body)))
}

/// Sign-up answers with either a bare user or `{ "user": ... }` depending on
/// whether e-mail confirmation is enabled.
fn user_from_signup(body: Value) -> Result<AuthUser> {
    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    serde_json::from_value::<UserPayload>(user)
        .map(AuthUser::from)
        .map_err(|e| ShowroomError::Auth(format!("unexpected sign-up response: {e}")))
}

fn session_from_token(token: TokenResponse) -> AuthSession {
    AuthSession {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        user: token.user.into(),
    }
}

#[async_trait]
impl IdentityProvider for RestIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = self
            .conn
            .authorize(self.conn.client().post(self.url("token")))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = check(request.send().await).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ShowroomError::Auth(format!("unexpected token response: {e}")))?;
        info!(user_id = %token.user.id, "Signed in");
        Ok(session_from_token(token))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let request = self
            .conn
            .authorize(self.conn.client().post(self.url("signup")))
            .json(&json!({ "email": email, "password": password }));
        let response = check(request.send().await).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ShowroomError::Auth(format!("unexpected sign-up response: {e}")))?;
        user_from_signup(body)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self
            .conn
            .clone()
            .with_access_token(access_token)
            .authorize(self.conn.client().post(self.url("logout")));
        check(request.send().await).await?;
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        let request = self
            .conn
            .clone()
            .with_access_token(access_token)
            .authorize(self.conn.client().get(self.url("user")));
        let response = check(request.send().await).await?;
        let user: UserPayload = response
            .json()
            .await
            .map_err(|e| ShowroomError::Auth(format!("unexpected user response: {e}")))?;
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_shapes() {
        let id = Uuid::new_v4();
        let bare = json!({"id": id, "email": "new@store.io"});
        assert_eq!(user_from_signup(bare).unwrap().id, id);

        let wrapped = json!({"user": {"id": id, "email": "new@store.io"}, "session": null});
        assert_eq!(
            user_from_signup(wrapped).unwrap().email.as_deref(),
            Some("new@store.io")
        );

        assert!(user_from_signup(json!({"msg": "weird"})).is_err());
    }

    #[test]
    fn test_session_expiry_from_token() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": {"id": Uuid::nil(), "email": "ops@store.io"}
        }))
        .unwrap();
        let session = session_from_token(token);
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn test_auth_url() {
        let identity = RestIdentity::new(Connection::new("https://abc.supabase.co", "anon"));
        assert_eq!(identity.url("token"), "https://abc.supabase.co/auth/v1/token");
    }
}
