//! Wiring: one session manager shared by the gateway, the stores and the
//! router.

use crate::{
    api::ApiClient,
    config::ClientConfig,
    error::Result,
    gateway::Gateway,
    router::{Resolution, Router},
    session::SessionManager,
    storage::FileStore,
    stores::{AdminStore, CommentsStore, PostsStore},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct App {
    session: Arc<SessionManager>,
    router: Router,
    posts: PostsStore,
    comments: CommentsStore,
    admin: AdminStore,
}

impl App {
    /// Opens the state file and restores the persisted session.
    ///
    /// # Errors
    /// Returns an error if the state file cannot be read or the HTTP client
    /// cannot be built.
    #[instrument(skip(config), fields(api_url = %config.api_base_url, state_file = %config.state_path.display()))]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage = Arc::new(FileStore::open(&config.state_path)?);
        let api = ApiClient::new(config)?;
        let session = Arc::new(SessionManager::restore(api, storage)?);

        debug!("client ready");

        Ok(Self::with_session(session))
    }

    #[must_use]
    pub fn with_session(session: Arc<SessionManager>) -> Self {
        let gateway = Gateway::new(session.clone());

        Self {
            router: Router::default(),
            posts: PostsStore::new(gateway.clone()),
            comments: CommentsStore::new(gateway.clone()),
            admin: AdminStore::new(gateway),
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn posts(&self) -> &PostsStore {
        &self.posts
    }

    #[must_use]
    pub fn comments(&self) -> &CommentsStore {
        &self.comments
    }

    #[must_use]
    pub fn admin(&self) -> &AdminStore {
        &self.admin
    }

    pub async fn navigate(&self, path: &str) -> Resolution {
        self.router.navigate(path, &self.session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        router::Navigation,
        storage::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY},
    };
    use anyhow::Result;
    use serde_json::json;
    use std::path::PathBuf;
    use uuid::Uuid;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Result<Self> {
            let dir = std::env::temp_dir().join(format!("twitter-client-app-{}", Uuid::new_v4()));
            std::fs::create_dir_all(&dir)?;
            Ok(Self(dir))
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn fresh_state_file_starts_anonymous() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ClientConfig::new("http://localhost:9999/api/v1", dir.0.join("session.json"), 5)?;
        let app = App::new(config)?;

        assert!(!app.session().is_authenticated().await);
        assert_eq!(
            app.navigate("/profile").await,
            Resolution::Navigate {
                route: "profile",
                navigation: Navigation::RedirectToLogin
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn persisted_admin_session_is_restored() -> Result<()> {
        let dir = TempDir::new()?;
        let state = dir.0.join("session.json");
        {
            let store = FileStore::open(&state)?;
            store.set(ACCESS_TOKEN_KEY, "access")?;
            store.set(REFRESH_TOKEN_KEY, "refresh")?;
            store.set(
                USER_KEY,
                &json!({"id": 1, "email": "root@example.com", "role": "admin"}).to_string(),
            )?;
        }

        let app = App::new(ClientConfig::new("http://localhost:9999/api/v1", &state, 5)?)?;

        assert!(app.session().is_admin().await);
        assert_eq!(
            app.navigate("/admin/users").await,
            Resolution::Navigate {
                route: "admin-users",
                navigation: Navigation::Allow
            }
        );
        assert_eq!(
            app.navigate("/login").await,
            Resolution::Navigate {
                route: "login",
                navigation: Navigation::RedirectToHome
            }
        );
        Ok(())
    }
}
