//! Core library for shopdash.
//!
//! This crate holds everything the dashboard front-ends share:
//!
//! - `auth`: credential store, token backends and the session context
//! - `api`: the request pipeline (bearer interceptor + refresh coordinator)
//!   and the typed resource client
//! - `navigation`: routes, the navigator seam and the route guard
//! - `models`: backend resource types
//! - `config`: persisted application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, LoginError, SessionContext, SessionState, StoreError, TokenKind};
pub use config::{Config, TokenStorage};
pub use navigation::{ChannelNavigator, GuardOutcome, Navigation, NavigationMode, Navigator, Route, RouteGuard};
