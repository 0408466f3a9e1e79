use crate::manager::SessionManager;

const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Outcome of asking whether a guarded view may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup has not resolved yet; show only a neutral placeholder.
    Loading,
    Render,
    /// Go to the sign-in view, replacing the guarded entry in history.
    Redirect { to: String, replace: bool },
}

/// Gate in front of every view that needs a session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_route: String,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::with_login_route(DEFAULT_LOGIN_ROUTE)
    }

    pub fn with_login_route(route: impl Into<String>) -> Self {
        Self {
            login_route: route.into(),
        }
    }

    pub fn evaluate(&self, session: &SessionManager) -> GuardDecision {
        let snapshot = session.snapshot();
        if snapshot.loading {
            GuardDecision::Loading
        } else if snapshot.authenticated {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect {
                to: self.login_route.clone(),
                replace: true,
            }
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}
