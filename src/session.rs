//! Session manager: the single owner of the access token, refresh token and
//! user profile.
//!
//! Flow Overview:
//! 1. `restore` rehydrates the session from durable storage at startup.
//! 2. `login` exchanges credentials for a token pair, stores it and loads the
//!    profile. It is all-or-nothing: any failure after the tokens were stored
//!    logs the session out again.
//! 3. `refresh` trades the refresh token for a new access token. Refreshes are
//!    serialized; callers that saw an older token generation reuse the result
//!    of the refresh that already ran instead of issuing their own.
//! 4. `fetch_profile` retries at most once, after one refresh.
//! 5. `logout` clears memory and storage and is idempotent.
//!
//! Every change of the access token bumps a generation counter while the
//! session write lock is held. Token values must never be logged.

use crate::{
    api::{
        types::{Credentials, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse, User},
        ApiClient,
    },
    error::{Error, Result},
    router::SessionState,
    storage::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY},
    stores::Loading,
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

#[derive(Default)]
struct Session {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    user: Option<User>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("user", &self.user)
            .finish()
    }
}

pub struct SessionManager {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
    generation: AtomicU64,
    refresh_lock: Mutex<()>,
    loading: Loading,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Anonymous session backed by `storage`. Nothing is read from storage.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_session(api, storage, Session::default())
    }

    /// Rehydrates the session from `storage`. Blank values count as absent and
    /// an unreadable stored user is discarded.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    pub fn restore(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let read = |key: &str| -> Result<Option<String>> {
            Ok(storage.get(key)?.filter(|value| !value.trim().is_empty()))
        };

        let access_token = read(ACCESS_TOKEN_KEY)?.map(SecretString::from);
        let refresh_token = read(REFRESH_TOKEN_KEY)?.map(SecretString::from);
        let user = match read(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!("Discarding stored user: {}", err);
                    None
                }
            },
            None => None,
        };

        debug!(
            authenticated = access_token.is_some(),
            has_user = user.is_some(),
            "session restored"
        );

        let session = Session {
            access_token,
            refresh_token,
            user,
        };

        Ok(Self::with_session(api, storage, session))
    }

    fn with_session(api: ApiClient, storage: Arc<dyn KeyValueStore>, session: Session) -> Self {
        Self {
            api,
            storage,
            state: RwLock::new(session),
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
            loading: Loading::default(),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .is_some_and(User::is_admin)
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn access_token(&self) -> Option<SecretString> {
        self.state.read().await.access_token.clone()
    }

    /// Snapshot used by the route guard.
    pub async fn state(&self) -> SessionState {
        let session = self.state.read().await;
        SessionState {
            authenticated: session.access_token.is_some(),
            admin: session.user.as_ref().is_some_and(User::is_admin),
        }
    }

    /// Current access token together with the generation it belongs to.
    pub(crate) async fn credentials(&self) -> (Option<SecretString>, u64) {
        let session = self.state.read().await;
        (
            session.access_token.clone(),
            self.generation.load(Ordering::SeqCst),
        )
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Stores a token pair. Storage is written first so a failed write leaves
    /// the in-memory session untouched; if the refresh token cannot be written
    /// the stored access token is put back to its previous value.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be persisted.
    pub async fn set_tokens(&self, access_token: SecretString, refresh_token: SecretString) -> Result<()> {
        let mut session = self.state.write().await;

        self.storage
            .set(ACCESS_TOKEN_KEY, access_token.expose_secret())?;
        if let Err(err) = self
            .storage
            .set(REFRESH_TOKEN_KEY, refresh_token.expose_secret())
        {
            let rollback = match &session.access_token {
                Some(previous) => self.storage.set(ACCESS_TOKEN_KEY, previous.expose_secret()),
                None => self.storage.remove(ACCESS_TOKEN_KEY),
            };
            if let Err(rollback_err) = rollback {
                error!("Failed to restore stored access token: {}", rollback_err);
            }
            return Err(err);
        }

        session.access_token = Some(access_token);
        session.refresh_token = Some(refresh_token);
        self.generation.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    /// Clears tokens and user from memory and storage. Storage failures are
    /// logged; the in-memory session is always cleared.
    pub async fn logout(&self) {
        let mut session = self.state.write().await;
        *session = Session::default();
        self.generation.fetch_add(1, Ordering::SeqCst);

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                error!("Failed to remove {} from storage: {}", key, err);
            }
        }

        info!("logged out");
    }

    /// Returns true only if the token exchange and the profile load both
    /// succeed.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> bool {
        let _loading = self.loading.start();

        match self.try_login(credentials).await {
            Ok(()) => {
                info!("login succeeded");
                true
            }
            Err(err) => {
                error!("login failed: {}", err);
                false
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<()> {
        let tokens: LoginResponse = self.api.post_json("/auth/login", credentials).await?;

        if let Err(err) = self
            .set_tokens(
                SecretString::from(tokens.access_token),
                SecretString::from(tokens.refresh_token),
            )
            .await
        {
            self.logout().await;
            return Err(err);
        }

        if self.fetch_profile().await.is_none() {
            self.logout().await;
            return Err(Error::NotAuthenticated);
        }

        Ok(())
    }

    /// Registers a new account. Does not log in.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> bool {
        let _loading = self.loading.start();

        if let Err(err) = validate_credentials(credentials) {
            error!("register failed: {}", err);
            return false;
        }

        match self
            .api
            .post_json::<_, MessageResponse>("/auth/register", credentials)
            .await
        {
            Ok(response) => {
                info!(
                    message = response.message.as_deref().unwrap_or_default(),
                    "registered"
                );
                true
            }
            Err(err) => {
                error!("register failed: {}", err);
                false
            }
        }
    }

    /// Trades the refresh token for a new access token. On failure the session
    /// is logged out.
    pub async fn refresh(&self) -> bool {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refreshes only if the access token is still the one from
    /// `observed_generation`. If another caller refreshed (or logged out) in
    /// the meantime, reports whether the session is still authenticated.
    pub(crate) async fn refresh_after(&self, observed_generation: u64) -> bool {
        let _guard = self.refresh_lock.lock().await;

        let (authenticated, generation) = {
            let session = self.state.read().await;
            (
                session.access_token.is_some(),
                self.generation.load(Ordering::SeqCst),
            )
        };

        if generation != observed_generation {
            debug!(
                observed_generation,
                generation, "access token changed while waiting, reusing it"
            );
            return authenticated;
        }

        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> bool {
        match self.try_refresh().await {
            Ok(true) => {
                debug!("access token refreshed");
                true
            }
            Ok(false) => {
                debug!("session changed while refreshing, ignoring the answer");
                self.is_authenticated().await
            }
            Err(err) => {
                error!("refresh failed: {}", err);
                self.logout().await;
                false
            }
        }
    }

    /// Returns `Ok(false)` when the session was replaced or logged out while
    /// the request was in flight; the answer is then dropped.
    #[instrument(skip(self))]
    async fn try_refresh(&self) -> Result<bool> {
        let (refresh_token, sent_generation) = {
            let session = self.state.read().await;
            (
                session.refresh_token.clone().ok_or(Error::NotAuthenticated)?,
                self.generation.load(Ordering::SeqCst),
            )
        };

        let result: Result<RefreshResponse> = self
            .api
            .post_json(
                "/auth/refresh",
                &RefreshRequest {
                    token: refresh_token.expose_secret(),
                },
            )
            .await;

        let mut session = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != sent_generation {
            return Ok(false);
        }
        let response = result?;

        self.storage
            .set(ACCESS_TOKEN_KEY, &response.access_token)?;
        session.access_token = Some(SecretString::from(response.access_token));
        self.generation.fetch_add(1, Ordering::SeqCst);

        Ok(true)
    }

    /// Loads the current profile. A failure triggers one refresh and one more
    /// attempt; a failed refresh leaves the session logged out.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Option<User> {
        let mut refreshed = false;

        loop {
            let (token, generation) = self.credentials().await;

            match self.load_profile(token.as_ref()).await {
                Ok(user) => return Some(user),
                Err(err) if refreshed => {
                    error!("fetch profile failed after refresh: {}", err);
                    return None;
                }
                Err(err) => {
                    error!("fetch profile failed: {}", err);
                    refreshed = true;

                    // a failed refresh has already logged out
                    if !self.refresh_after(generation).await {
                        return None;
                    }
                }
            }
        }
    }

    async fn load_profile(&self, token: Option<&SecretString>) -> Result<User> {
        let token = token.ok_or(Error::NotAuthenticated)?;
        let user: User = self.api.get_json_with_token("/user/profile", token).await?;

        let encoded = serde_json::to_string(&user)?;
        let mut session = self.state.write().await;
        self.storage.set(USER_KEY, &encoded)?;
        session.user = Some(user.clone());

        Ok(user)
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn validate_credentials(credentials: &Credentials) -> Result<()> {
    if !valid_email(credentials.email.trim()) {
        return Err(Error::InvalidInput("email address is not valid".to_string()));
    }
    if credentials.password.expose_secret().is_empty() {
        return Err(Error::InvalidInput("password is required".to_string()));
    }
    Ok(())
}
