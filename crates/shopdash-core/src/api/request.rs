//! Outbound requests and the bearer interceptor.
//!
//! A `PendingRequest` keeps everything needed to send the request again
//! (method, path, query, headers, body) so the refresh coordinator can retry
//! it once with a new token.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;

use crate::auth::{CredentialStore, StoreError, TokenKind};

use super::ApiError;

/// A file sent as one part of a multipart body
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

impl RequestBody {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match self {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(value) => Ok(builder.json(value)),
            RequestBody::Multipart { fields, files } => {
                // Forms are consumed on send, so each attempt builds its own
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                for file in files {
                    let part = multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.mime)?;
                    form = form.part(file.field.clone(), part);
                }
                Ok(builder.multipart(form))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: RequestBody,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a header. `Authorization` is owned by the interceptor and ignored.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name != AUTHORIZATION {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<(String, String)>, files: Vec<FilePart>) -> Self {
        self.body = RequestBody::Multipart { fields, files };
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub(crate) fn url(&self, base: &Url) -> Result<Url, ApiError> {
        base.join(self.path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("Bad path {}: {}", self.path, e)))
    }

    /// Build an unauthenticated request; the interceptor adds the credential
    pub(crate) fn builder(&self, client: &Client, base: &Url) -> Result<RequestBuilder, ApiError> {
        let mut builder = client
            .request(self.method.clone(), self.url(base)?)
            .headers(self.headers.clone());
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        self.body.apply(builder)
    }
}

/// Attaches the stored access token to outgoing requests.
pub struct BearerInterceptor {
    store: Arc<CredentialStore>,
}

impl BearerInterceptor {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Read the current access token at send time and attach it.
    /// Returns the token that was attached, if any.
    pub fn intercept(
        &self,
        builder: RequestBuilder,
    ) -> Result<(RequestBuilder, Option<String>), StoreError> {
        match self.store.get(TokenKind::Access)? {
            Some(token) => Ok((builder.bearer_auth(&token), Some(token))),
            None => Ok((builder, None)),
        }
    }
}

/// Pass successful responses through, turn others into `ApiError`
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}
