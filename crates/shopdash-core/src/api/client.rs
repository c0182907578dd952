//! Typed client for the store backend resources.
//!
//! `ApiClient` wraps the refresh coordinator and exposes one method per
//! backend resource. Responses are parsed from text so parse failures carry
//! the endpoint in the error message.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::CredentialStore;
use crate::models::{
    Category, DashboardSummary, Listing, NewProduct, Order, OrderAnalytics, OrderQuery,
    OrderStatus, Page, PasswordChange, Product, ProductPerformance, ProductUpdate, ProfileUpdate,
    RevenueAnalytics, StoreInfo, StoreInfoUpdate, UserProfile,
};
use crate::navigation::Navigator;

use super::auth::AuthEndpoints;
use super::refresh::RefreshCoordinator;
use super::request::{check_response, FilePart, PendingRequest};
use super::ApiError;

/// Multipart field the backend reads the store logo from
const STORE_IMAGE_FIELD: &str = "store_image";

/// The store-info endpoint is a viewset list, but older deployments
/// answer with the single record
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// API client for the store backend.
/// Clone is cheap - all state lives behind one `Arc`.
#[derive(Clone)]
pub struct ApiClient {
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a client for `base_url`. A missing trailing slash is added so
    /// relative resource paths join under it.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let base_url = Self::normalize_base(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        let auth = AuthEndpoints::new(client.clone(), base_url.clone());

        Ok(Self {
            coordinator: Arc::new(RefreshCoordinator::new(
                client, base_url, store, auth, navigator,
            )),
        })
    }

    fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
        let trimmed = base_url.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Url::parse(&with_slash)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid API URL {}: {}", trimmed, e)))
    }

    /// Login and refresh endpoints, sharing this client's connection pool
    pub fn auth(&self) -> &AuthEndpoints {
        self.coordinator.auth()
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        self.coordinator.store()
    }

    pub fn base_url(&self) -> &Url {
        self.coordinator.base_url()
    }

    /// Send an arbitrary request through the pipeline. The response is
    /// returned whatever its status.
    pub async fn execute(&self, request: PendingRequest) -> Result<Response, ApiError> {
        self.coordinator.execute(request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        let path = request.path().to_string();
        let response = check_response(self.execute(request).await?).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    async fn send_empty(&self, request: PendingRequest) -> Result<(), ApiError> {
        check_response(self.execute(request).await?).await?;
        Ok(())
    }

    // ===== Dashboard =====

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.send_json(PendingRequest::get("dashboard/summary/")).await
    }

    // ===== Catalog =====

    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let listing: Listing<Product> = self.send_json(PendingRequest::get("products/")).await?;
        Ok(listing.into_page().results)
    }

    pub async fn product(&self, id: i64) -> Result<Product, ApiError> {
        self.send_json(PendingRequest::get(format!("products/{}/", id)))
            .await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.send_json(PendingRequest::post("products/").json(product)?)
            .await
    }

    pub async fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<Product, ApiError> {
        if update.is_empty() {
            return Err(ApiError::InvalidRequest("Nothing to update".to_string()));
        }
        self.send_json(PendingRequest::patch(format!("products/{}/", id)).json(update)?)
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        debug!(product_id = id, "Deleting product");
        self.send_empty(PendingRequest::delete(format!("products/{}/", id)))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let listing: Listing<Category> = self.send_json(PendingRequest::get("categories/")).await?;
        Ok(listing.into_page().results)
    }

    // ===== Orders =====

    /// One page of orders, optionally filtered by a search term
    pub async fn orders(&self, query: &OrderQuery) -> Result<Page<Order>, ApiError> {
        let mut request = PendingRequest::get("orders/");
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }
        if let Some(page) = query.page {
            request = request.query("page", page);
        }
        let listing: Listing<Order> = self.send_json(request).await?;
        Ok(listing.into_page())
    }

    pub async fn update_order_status(
        &self,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        // Dot segments would be resolved away by URL joining
        if matches!(order_number, "" | "." | "..") {
            return Err(ApiError::InvalidRequest(format!(
                "Invalid order number: {:?}",
                order_number
            )));
        }
        debug!(order_number = order_number, status = %status, "Updating order status");
        let body = serde_json::json!({ "order_status": status.as_str() });
        let path = format!("orders/{}/", urlencoding::encode(order_number));
        self.send_json(PendingRequest::patch(path).json(&body)?)
            .await
    }

    // ===== Analytics =====

    pub async fn product_analytics(&self) -> Result<Vec<ProductPerformance>, ApiError> {
        self.send_json(PendingRequest::get("analytics/products/")).await
    }

    pub async fn order_analytics(&self) -> Result<OrderAnalytics, ApiError> {
        self.send_json(PendingRequest::get("analytics/orders/")).await
    }

    pub async fn revenue_analytics(&self) -> Result<RevenueAnalytics, ApiError> {
        self.send_json(PendingRequest::get("analytics/revenue/")).await
    }

    // ===== Account =====

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.send_json(PendingRequest::get("users/profile/")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.send_json(PendingRequest::patch("users/profile/").json(update)?)
            .await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        if change.new_password.is_empty() {
            return Err(ApiError::InvalidRequest(
                "New password must not be empty".to_string(),
            ));
        }
        self.send_empty(PendingRequest::post("users/change-password/").json(change)?)
            .await
    }

    // ===== Store settings =====

    /// The store record, or `None` when none has been created yet
    pub async fn store_info(&self) -> Result<Option<StoreInfo>, ApiError> {
        let info: OneOrMany<StoreInfo> = self.send_json(PendingRequest::get("store-info/")).await?;
        Ok(match info {
            OneOrMany::Many(list) => list.into_iter().next(),
            OneOrMany::One(info) => Some(info),
        })
    }

    /// Save store settings as multipart. `image`, when given, is sent as
    /// the store logo whatever field name it carries.
    pub async fn update_store_info(
        &self,
        id: i64,
        update: &StoreInfoUpdate,
        image: Option<FilePart>,
    ) -> Result<StoreInfo, ApiError> {
        let files = image
            .map(|mut part| {
                part.field = STORE_IMAGE_FIELD.to_string();
                part
            })
            .into_iter()
            .collect();
        let request =
            PendingRequest::patch(format!("store-info/{}/", id)).multipart(update.fields(), files);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_adds_trailing_slash() {
        let url = ApiClient::normalize_base("https://shop.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/");

        let url = ApiClient::normalize_base(" https://shop.example.com/api/ ").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/");
    }

    #[test]
    fn test_normalize_base_rejects_garbage() {
        assert!(matches!(
            ApiClient::normalize_base("not a url"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_store_info_accepts_list_or_record() {
        let many: OneOrMany<StoreInfo> =
            serde_json::from_str(r#"[{"id": 1, "currency": "USD"}]"#).unwrap();
        assert!(matches!(many, OneOrMany::Many(ref v) if v.len() == 1));

        let one: OneOrMany<StoreInfo> = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(matches!(one, OneOrMany::One(_)));
    }
}
