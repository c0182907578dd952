use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::route::Route;

/// How a navigation affects history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    Push,
    /// Replace the current entry so "back" cannot return to it
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub mode: NavigationMode,
}

impl Navigation {
    pub fn push(route: Route) -> Self {
        Self {
            route,
            mode: NavigationMode::Push,
        }
    }

    pub fn replace(route: Route) -> Self {
        Self {
            route,
            mode: NavigationMode::Replace,
        }
    }
}

/// Where the core sends navigation requests.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// Forwards navigation requests to the front-end's event loop.
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Navigation>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, navigation: Navigation) {
        debug!(route = %navigation.route, mode = ?navigation.mode, "Navigation requested");
        if self.tx.send(navigation).is_err() {
            warn!(route = %navigation.route, "Navigation dropped - receiver closed");
        }
    }
}
