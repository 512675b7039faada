//! Route table and navigation guard.
//!
//! Each route carries static requirements. [`guard`] compares them with a
//! session snapshot, first match wins:
//!
//! 1. admin required and the user is not an admin: home
//! 2. authentication required and the session is anonymous: login
//! 3. guest required and the session is authenticated: home
//! 4. otherwise the navigation is allowed
//!
//! The guard is UX only; the API enforces access on its own.

use crate::session::SessionManager;
use serde::Serialize;
use std::fmt;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouteRequirements {
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub requires_admin: bool,
}

impl RouteRequirements {
    pub const NONE: Self = Self {
        requires_auth: false,
        requires_guest: false,
        requires_admin: false,
    };
    pub const GUEST: Self = Self {
        requires_auth: false,
        requires_guest: true,
        requires_admin: false,
    };
    pub const AUTH: Self = Self {
        requires_auth: true,
        requires_guest: false,
        requires_admin: false,
    };
    pub const ADMIN: Self = Self {
        requires_auth: true,
        requires_guest: false,
        requires_admin: true,
    };
}

/// Session snapshot the guard decides on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub admin: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

impl Navigation {
    /// Path the navigation ends up on, given the requested one.
    #[must_use]
    pub fn destination<'a>(&self, requested: &'a str) -> &'a str {
        match self {
            Self::Allow => requested,
            Self::RedirectToLogin => LOGIN_PATH,
            Self::RedirectToHome => HOME_PATH,
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::RedirectToLogin => write!(f, "redirect to {LOGIN_PATH}"),
            Self::RedirectToHome => write!(f, "redirect to {HOME_PATH}"),
        }
    }
}

#[must_use]
pub fn guard(requirements: RouteRequirements, session: SessionState) -> Navigation {
    if requirements.requires_admin && !session.admin {
        Navigation::RedirectToHome
    } else if requirements.requires_auth && !session.authenticated {
        Navigation::RedirectToLogin
    } else if requirements.requires_guest && session.authenticated {
        Navigation::RedirectToHome
    } else {
        Navigation::Allow
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub meta: RouteRequirements,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Navigate {
        route: &'static str,
        navigation: Navigation,
    },
    NotFound,
}

#[derive(Clone, Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(vec![
            Route {
                name: "home",
                path: HOME_PATH,
                meta: RouteRequirements::NONE,
            },
            Route {
                name: "register",
                path: "/register",
                meta: RouteRequirements::GUEST,
            },
            Route {
                name: "login",
                path: LOGIN_PATH,
                meta: RouteRequirements::GUEST,
            },
            Route {
                name: "profile",
                path: "/profile",
                meta: RouteRequirements::AUTH,
            },
            Route {
                name: "admin-users",
                path: "/admin/users",
                meta: RouteRequirements::ADMIN,
            },
        ])
    }
}

impl Router {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Exact path match; a trailing slash is ignored.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => HOME_PATH,
            other => other,
        };

        self.routes.iter().find(|route| route.path == normalized)
    }

    #[must_use]
    pub fn check(&self, path: &str, session: SessionState) -> Resolution {
        match self.resolve(path) {
            Some(route) => Resolution::Navigate {
                route: route.name,
                navigation: guard(route.meta, session),
            },
            None => Resolution::NotFound,
        }
    }

    /// Resolves `path` and runs the guard against the live session.
    pub async fn navigate(&self, path: &str, session: &SessionManager) -> Resolution {
        self.check(path, session.state().await)
    }
}
