//! Routes, navigation requests and the route guard.
//!
//! The core never renders anything. When it needs the front-end to move
//! (after login, logout or a forced logout) it sends a `Navigation` through
//! the `Navigator` it was given; the front-end owns the receiving side.

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{GuardOutcome, RouteGuard};
pub use navigator::{ChannelNavigator, Navigation, NavigationMode, Navigator};
pub use route::Route;
