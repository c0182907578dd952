//! REST client for the store backend.
//!
//! Every resource call goes through the same pipeline: the bearer
//! interceptor attaches the stored access token, and the refresh
//! coordinator handles a 401 by refreshing once and retrying. Login and
//! refresh themselves bypass the pipeline (see `auth`).

pub mod auth;
pub mod client;
pub mod error;
pub mod refresh;
pub mod request;

pub use auth::{AuthEndpoints, RefreshedTokens, TokenPair};
pub use client::ApiClient;
pub use error::ApiError;
pub use refresh::{Phase, RefreshCoordinator};
pub use request::{BearerInterceptor, FilePart, PendingRequest, RequestBody};
