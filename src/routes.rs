//! Dashboard routes and the gate that protects them

use std::sync::Arc;

use crate::session::SessionGuard;

pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const FORGOT_PASSWORD: &str = "/forgot-password";

pub const DASHBOARD: &str = "/dashboard";
pub const MONITORED_HASHTAGS: &str = "/monitored_hashtags";
pub const REPORTS: &str = "/reports";
pub const TRENDS: &str = "/trends";
pub const RELATED_HASHTAGS: &str = "/related_hashtags";
pub const MULTIMODAL_SEARCH: &str = "/multimodal_search";
pub const FETCHED_DATA: &str = "/fetched_data";

/// Reachable without a session
pub const PUBLIC_ROUTES: [&str; 3] = [LOGIN, REGISTER, FORGOT_PASSWORD];

pub fn is_public(path: &str) -> bool {
    let path = normalize(path);
    PUBLIC_ROUTES.contains(&path)
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(String),
    Redirect(&'static str),
}

pub struct RouteGate {
    guard: Arc<SessionGuard>,
}

impl RouteGate {
    pub fn new(guard: Arc<SessionGuard>) -> Self {
        Self { guard }
    }

    /// Decide what a navigation to `path` renders.
    ///
    /// Public routes always render. Everything else asks the guard, which
    /// evicts a stale session as a side effect.
    pub fn resolve(&self, path: &str) -> RouteDecision {
        if is_public(path) {
            return RouteDecision::Render(path.to_string());
        }

        if self.guard.is_authenticated() {
            RouteDecision::Render(path.to_string())
        } else {
            tracing::debug!("Redirecting {} to {}", path, LOGIN);
            RouteDecision::Redirect(LOGIN)
        }
    }
}
