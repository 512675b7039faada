//! # twitter-client (Session-aware API client)
//!
//! `twitter-client` talks to the twitter-api backend (`/api/v1`) on behalf of a
//! single user. It keeps the user's session, attaches credentials to every
//! request and gates navigation on the session state.
//!
//! ## Session
//!
//! The [`session::SessionManager`] owns the access token, the refresh token and
//! the user profile. It is the only writer of that state; everything else reads
//! snapshots. Tokens are persisted to a durable key-value store under the keys
//! `accessToken`, `refreshToken` and `user`, and are rehydrated on startup.
//!
//! ## Request Gateway
//!
//! Every feature call goes through the [`gateway::Gateway`]. It attaches
//! `Authorization: Bearer <token>` and, on the first `401` of a logical request,
//! refreshes the access token once and resubmits the request once. Concurrent
//! `401`s share a single refresh.
//!
//! ## Route Guard
//!
//! [`router::guard`] is a pure function of the route requirements and the
//! session state. Admin checks run before authentication checks, so an
//! authenticated non-admin asking for an admin route is sent home.
//!
//! Tokens are wrapped in `secrecy::SecretString` and must never be logged.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod router;
pub mod session;
pub mod storage;
pub mod stores;

pub use error::{Error, Result};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
