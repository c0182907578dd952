use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Order {
    pub order_number: String,
    #[serde(rename = "userID", alias = "user_id")]
    pub user_id: i64,
    pub username: String,
    pub product_id: i64,
    pub quantity: i64,
    #[serde(deserialize_with = "super::de::amount")]
    pub amount: f64,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Order {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse(self.order_status.as_deref())
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("paid"))
            .unwrap_or(false)
    }
}

/// Order lifecycle states used by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// States counted as active orders on the dashboard
    pub const ACTIVE: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ];

    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("pending") => OrderStatus::Pending,
            Some("processing") => OrderStatus::Processing,
            Some("shipped") => OrderStatus::Shipped,
            Some("delivered") | Some("completed") => OrderStatus::Delivered,
            Some("cancelled") | Some("canceled") => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Next step in the fulfilment flow; terminal states stay put
    pub fn advance(&self) -> Self {
        match self {
            OrderStatus::Pending => OrderStatus::Processing,
            OrderStatus::Processing => OrderStatus::Shipped,
            OrderStatus::Shipped => OrderStatus::Delivered,
            OrderStatus::Unknown => OrderStatus::Pending,
            OrderStatus::Delivered => OrderStatus::Delivered,
            OrderStatus::Cancelled => OrderStatus::Cancelled,
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// List endpoints answer with either a bare array or a page
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            Listing::Paged(page) => page,
            Listing::Plain(items) => Page {
                count: items.len() as u64,
                next: None,
                previous: None,
                results: items,
            },
        }
    }
}

/// Search and paging for the order list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Matches order number, username or status
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl OrderQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            page: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "order_number": "ORD-1001", "userID": 7, "username": "alice",
        "product_id": 3, "quantity": 2, "amount": "158.00",
        "invoice_id": "inv_1", "delivery_method": "Courier", "delivery_address": null,
        "payment_method": "BTC", "payment_status": "Paid", "order_status": "Processing",
        "timestamp": "2025-03-01T10:00:00Z"
    }"#;

    #[test]
    fn test_parse_order() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.user_id, 7);
        assert_eq!(order.amount, 158.0);
        assert_eq!(order.status(), OrderStatus::Processing);
        assert!(order.is_paid());
    }

    #[test]
    fn test_order_status_parse_and_advance() {
        assert_eq!(OrderStatus::parse(Some("SHIPPED")), OrderStatus::Shipped);
        assert_eq!(OrderStatus::parse(Some("canceled")), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::parse(None), OrderStatus::Unknown);

        assert_eq!(OrderStatus::Pending.advance(), OrderStatus::Processing);
        assert_eq!(OrderStatus::Shipped.advance(), OrderStatus::Delivered);
        assert_eq!(OrderStatus::Delivered.advance(), OrderStatus::Delivered);
        assert_eq!(OrderStatus::Cancelled.advance(), OrderStatus::Cancelled);
        assert!(OrderStatus::Shipped.is_active());
        assert!(!OrderStatus::Delivered.is_active());
    }

    #[test]
    fn test_listing_accepts_page_and_plain_array() {
        let paged: Listing<Order> =
            serde_json::from_str(&format!(r#"{{"count": 41, "next": "http://x/?page=2", "previous": null, "results": [{}]}}"#, ORDER_JSON))
                .unwrap();
        let page = paged.into_page();
        assert_eq!(page.count, 41);
        assert!(page.has_next());
        assert_eq!(page.results.len(), 1);

        let plain: Listing<Order> = serde_json::from_str(&format!("[{}]", ORDER_JSON)).unwrap();
        let page = plain.into_page();
        assert_eq!(page.count, 1);
        assert!(!page.has_next());
    }
}
