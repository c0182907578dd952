//! Data models for the store backend.
//!
//! - `Product`, `Category`: catalog
//! - `Order`, `OrderStatus`, `Page`: order management
//! - `DashboardSummary` and the analytics types
//! - `UserProfile`, `StoreInfo`: account and store settings
//!
//! The backend serializes decimal columns as JSON strings ("12.50"), so
//! amounts go through `de::amount` to accept strings and numbers alike.

pub mod account;
pub mod analytics;
pub mod catalog;
pub mod order;

pub use account::{PasswordChange, ProfileUpdate, StoreInfo, StoreInfoUpdate, UserProfile};
pub use analytics::{
    DashboardSummary, MonthlyAmount, MonthlyCount, OrderAnalytics, ProductPerformance,
    RecentOrder, RevenueAnalytics,
};
pub use catalog::{Category, NewProduct, Product, ProductUpdate};
pub use order::{Listing, Order, OrderQuery, OrderStatus, Page};

pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    fn parse<E: serde::de::Error>(value: NumberOrString) -> Result<f64, E> {
        match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid amount: {:?}", s))),
        }
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        parse(NumberOrString::deserialize(deserializer)?)
    }

    pub fn optional_amount<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
            Some(value) => parse(value).map(Some),
        }
    }
}
