use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard landing view
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardSummary {
    #[serde(deserialize_with = "super::de::amount")]
    pub total_revenue: f64,
    pub active_orders: u64,
    pub total_products: u64,
    pub total_customers: u64,
    #[serde(default)]
    pub revenue_trend: Vec<MonthlyAmount>,
    #[serde(default)]
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RecentOrder {
    pub order_number: String,
    pub username: String,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(deserialize_with = "super::de::amount")]
    pub total_amount: f64,
}

/// One point of a monthly trend. `month` is the short month name ("Jan").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MonthlyAmount {
    pub month: String,
    #[serde(deserialize_with = "super::de::amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Units sold and revenue per product, best sellers first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductPerformance {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub sales: u64,
    #[serde(deserialize_with = "super::de::amount")]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OrderAnalytics {
    pub total_orders: u64,
    /// Orders per distinct customer
    #[serde(deserialize_with = "super::de::amount")]
    pub order_frequency: f64,
    #[serde(default)]
    pub monthly_order_trend: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RevenueAnalytics {
    #[serde(deserialize_with = "super::de::amount")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "super::de::amount")]
    pub average_order_value: f64,
    #[serde(default)]
    pub monthly_revenue_trend: Vec<MonthlyAmount>,
}

impl RevenueAnalytics {
    /// Largest monthly amount, used to scale bar charts
    pub fn peak_month(&self) -> Option<&MonthlyAmount> {
        self.monthly_revenue_trend
            .iter()
            .max_by(|a, b| a.amount.total_cmp(&b.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard_summary() {
        let json = r#"{
            "total_revenue": 1520.5, "active_orders": 4, "total_products": 12,
            "total_customers": 9,
            "revenue_trend": [{"month": "Jan", "amount": 300.0}, {"month": "Feb", "amount": "1220.50"}],
            "recent_orders": [{"order_number": "ORD-9", "username": "bob",
                               "order_status": "Pending", "total_amount": 42.0}]
        }"#;
        let summary: DashboardSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.active_orders, 4);
        assert_eq!(summary.revenue_trend[1].amount, 1220.5);
        assert_eq!(summary.recent_orders[0].order_number, "ORD-9");
    }

    #[test]
    fn test_order_frequency_may_be_integer_zero() {
        let a: OrderAnalytics =
            serde_json::from_str(r#"{"total_orders": 0, "order_frequency": 0, "monthly_order_trend": []}"#)
                .unwrap();
        assert_eq!(a.order_frequency, 0.0);
    }

    #[test]
    fn test_peak_month() {
        let r = RevenueAnalytics {
            total_revenue: 10.0,
            average_order_value: 5.0,
            monthly_revenue_trend: vec![
                MonthlyAmount { month: "Jan".into(), amount: 3.0 },
                MonthlyAmount { month: "Feb".into(), amount: 7.0 },
            ],
        };
        assert_eq!(r.peak_month().map(|m| m.month.as_str()), Some("Feb"));
        assert!(RevenueAnalytics::default().peak_month().is_none());
    }
}
