use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use showroom_config::{
    config_file_path, load_and_prepare, load_json, remove_file, save_json, session_file_path,
    ShowroomConfig,
};
use showroom_console::{Console, SessionContext};
use showroom_supabase::{Connection, RestIdentity, RestRecordStore, RestStorage};

/// Loaded configuration plus the directory it came from.
pub struct AppContext {
    pub config_dir: PathBuf,
    pub config: ShowroomConfig,
}

impl AppContext {
    pub async fn load(config_dir: PathBuf) -> Result<Self> {
        let config = load_and_prepare(&config_file_path(&config_dir))
            .await
            .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
        Ok(Self { config_dir, config })
    }

    pub fn config_path(&self) -> PathBuf {
        config_file_path(&self.config_dir)
    }

    fn session_path(&self) -> PathBuf {
        session_file_path(&self.config_dir)
    }

    /// Log directory; relative paths are taken from the config dir.
    pub fn log_dir(&self) -> PathBuf {
        let dir = self
            .config
            .logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or(showroom_config::defaults::DEFAULT_LOG_DIR);
        let dir = Path::new(dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.config_dir.join(dir)
        }
    }

    pub fn json_logs(&self) -> bool {
        self.config
            .logging
            .as_ref()
            .and_then(|l| l.json)
            .unwrap_or(false)
    }

    fn connection(&self) -> Result<Connection> {
        let (Some(url), Some(key)) = (self.config.backend_url(), self.config.anon_key()) else {
            bail!(
                "backend.url and backend.anonKey must be set in {} (or SUPABASE_URL / SUPABASE_ANON_KEY)",
                self.config_path().display()
            );
        };
        Ok(Connection::new(url, key))
    }

    pub fn identity(&self) -> Result<RestIdentity> {
        Ok(RestIdentity::new(self.connection()?))
    }

    /// Table client acting as the given access token.
    pub fn store_for(&self, access_token: &str) -> Result<RestRecordStore> {
        Ok(RestRecordStore::new(
            self.connection()?.with_access_token(access_token),
        ))
    }

    /// Console wired to the hosted backend as the signed-in operator.
    pub fn console(&self, session: &SessionContext) -> Result<Console> {
        let conn = self.connection()?.with_access_token(session.access_token());
        let store = Arc::new(RestRecordStore::new(conn.clone()));
        let storage = Arc::new(
            RestStorage::new(conn, self.config.bucket())
                .with_cache_control(self.config.cache_control_secs()),
        );
        Ok(Console::new(store, storage)
            .with_categories(self.config.product_categories())
            .for_session(session))
    }

    /// The saved session, refusing one that has expired.
    pub async fn load_session(&self) -> Result<SessionContext> {
        let session: SessionContext = load_json(&self.session_path())
            .await?
            .context("Not signed in. Run `showroom login` first")?;
        if session.is_expired(chrono::Utc::now()) {
            bail!("Session expired. Run `showroom login` again");
        }
        debug!(role = %session.role(), "Loaded saved session");
        Ok(session)
    }

    pub async fn save_session(&self, session: &SessionContext) -> Result<()> {
        save_json(session, &self.session_path()).await
    }

    pub async fn clear_session(&self) -> Result<()> {
        remove_file(&self.session_path()).await
    }
}
