//! Return eligibility tool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::error::Result;

use super::types::Tool;

/// Returns are accepted within this many days of delivery.
pub const RETURN_WINDOW_DAYS: i64 = 7;

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Shared eligibility check: also the backing logic for refund decisions.
pub(crate) fn return_eligibility(catalog: &Catalog, order_id: &str, today: &str) -> Value {
    let Some(order) = catalog.find_order(order_id) else {
        return json!({
            "found": false,
            "eligible": false,
            "order_id": order_id,
            "status": null,
            "delivery_date": null,
            "days_since_delivery": null,
            "reason": format!("No order found with ID {order_id}."),
        });
    };

    let Some(delivery_date) = order.delivery_date.as_deref().and_then(parse_date) else {
        return json!({
            "found": true,
            "eligible": false,
            "order_id": order_id,
            "status": order.status,
            "delivery_date": order.delivery_date,
            "days_since_delivery": null,
            "reason": "Order has not been delivered yet. Returns are only possible after delivery.",
        });
    };

    let Some(today_date) = parse_date(today) else {
        return json!({
            "found": true,
            "eligible": false,
            "order_id": order_id,
            "status": order.status,
            "delivery_date": order.delivery_date,
            "days_since_delivery": null,
            "reason": "Invalid 'today' date provided.",
        });
    };

    let days_since = (today_date - delivery_date).num_days();
    let eligible = days_since <= RETURN_WINDOW_DAYS;
    let reason = if eligible {
        format!(
            "Order {order_id} is within the {RETURN_WINDOW_DAYS}-day return window (delivered {days_since} day(s) ago)."
        )
    } else {
        format!(
            "Order {order_id} is outside the {RETURN_WINDOW_DAYS}-day return window (delivered {days_since} day(s) ago)."
        )
    };

    json!({
        "found": true,
        "eligible": eligible,
        "order_id": order_id,
        "status": order.status,
        "delivery_date": order.delivery_date,
        "days_since_delivery": days_since,
        "reason": reason,
    })
}

pub struct ReturnEligibilityTool {
    catalog: Arc<Catalog>,
}

impl ReturnEligibilityTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for ReturnEligibilityTool {
    fn name(&self) -> &str {
        "check_return_eligibility"
    }

    fn description(&self) -> &str {
        "Check if a specific order is eligible for return based on delivery date and return policy."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_id": {
                    "type": "string",
                    "description": "The order ID to check"
                },
                "today": {
                    "type": "string",
                    "description": "Today's date in YYYY-MM-DD format"
                }
            },
            "required": ["order_id", "today"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let order_id = args["order_id"].as_str().unwrap_or_default();
        let today = args["today"].as_str().unwrap_or_default();
        Ok(return_eligibility(&self.catalog, order_id, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ReturnEligibilityTool {
        ReturnEligibilityTool::new(Arc::new(Catalog::demo()))
    }

    #[tokio::test]
    async fn test_within_window() {
        // ORD1001 delivered 2025-11-25
        let result = tool()
            .execute(json!({"order_id": "ORD1001", "today": "2025-11-28"}))
            .await
            .unwrap();
        assert_eq!(result["eligible"], true);
        assert_eq!(result["days_since_delivery"], 3);
    }

    #[tokio::test]
    async fn test_outside_window() {
        let result = tool()
            .execute(json!({"order_id": "ORD1001", "today": "2025-12-10"}))
            .await
            .unwrap();
        assert_eq!(result["eligible"], false);
        assert!(result["reason"].as_str().unwrap().contains("outside"));
    }

    #[tokio::test]
    async fn test_not_delivered() {
        // ORD1003 is processing, no delivery date
        let result = tool()
            .execute(json!({"order_id": "ORD1003", "today": "2025-12-10"}))
            .await
            .unwrap();
        assert_eq!(result["found"], true);
        assert_eq!(result["eligible"], false);
        assert!(result["reason"].as_str().unwrap().contains("not been delivered"));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let result = tool()
            .execute(json!({"order_id": "ORD9999", "today": "2025-12-10"}))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
        assert_eq!(result["eligible"], false);
    }

    #[tokio::test]
    async fn test_bad_today_date() {
        let result = tool()
            .execute(json!({"order_id": "ORD1001", "today": "soon"}))
            .await
            .unwrap();
        assert_eq!(result["eligible"], false);
        assert!(result["reason"].as_str().unwrap().contains("Invalid"));
    }
}
