use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(deserialize_with = "super::de::amount")]
    pub price: f64,
}

impl Product {
    pub fn category_display(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or("Uncategorized")
    }
}

/// Body for creating a product
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewProduct {
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Sent as a string to keep the backend's decimal precision
    pub price: String,
}

/// Partial update; only set fields are sent
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.category.is_none()
            && self.details.is_none()
            && self.image.is_none()
            && self.price.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    #[serde(alias = "category_id")]
    pub id: i64,
    #[serde(alias = "category_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
