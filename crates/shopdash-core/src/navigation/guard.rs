use crate::auth::SessionState;

use super::route::Route;

/// What the front-end should do with a requested route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Stored credentials are still being checked
    Placeholder,
    Render(Route),
    /// Redirect, replacing history when `replace` is set
    Redirect { to: Route, replace: bool },
}

/// Gates protected routes on the session state.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    redirect_to: Route,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            redirect_to: Route::Login,
        }
    }
}

impl RouteGuard {
    pub fn new(redirect_to: Route) -> Self {
        Self { redirect_to }
    }

    pub fn evaluate(&self, state: SessionState, requested: Route) -> GuardOutcome {
        if !requested.is_protected() {
            return GuardOutcome::Render(requested);
        }
        if state.loading {
            return GuardOutcome::Placeholder;
        }
        if state.authenticated {
            GuardOutcome::Render(requested)
        } else {
            GuardOutcome::Redirect {
                to: self.redirect_to,
                replace: true,
            }
        }
    }
}
