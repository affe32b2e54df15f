//! Refund possibility tool. A refund is possible exactly when the order is
//! still return-eligible.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::error::Result;

use super::returns::{parse_date, return_eligibility};
use super::types::Tool;

pub struct RefundTool {
    catalog: Arc<Catalog>,
}

impl RefundTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for RefundTool {
    fn name(&self) -> &str {
        "check_refund_possibility"
    }

    fn description(&self) -> &str {
        "Check if a refund is possible for an order and get expected refund timeline."
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

        let eligibility = return_eligibility(&self.catalog, order_id, today);
        let base_reason = eligibility["reason"].as_str().unwrap_or_default();

        if eligibility["found"] != true {
            return Ok(json!({
                "found": false,
                "refundable": false,
                "order_id": order_id,
                "status": null,
                "delivery_date": null,
                "reason": base_reason,
                "expected_refund_timeline": null,
            }));
        }

        if eligibility["eligible"] != true {
            return Ok(json!({
                "found": true,
                "refundable": false,
                "order_id": order_id,
                "status": eligibility["status"],
                "delivery_date": eligibility["delivery_date"],
                "reason": format!(
                    "{base_reason} Since the order is not eligible for return, a refund cannot be processed."
                ),
                "expected_refund_timeline": null,
            }));
        }

        let timeline = parse_date(today).map(|today_date| {
            let by = today_date + Duration::days(7);
            format!(
                "If you initiate a return now, the refund will typically be processed \
                 within 5-7 business days after the returned item is received and inspected. \
                 Based on today's date ({today}), you can expect the refund to be completed \
                 by around {by}."
            )
        });

        Ok(json!({
            "found": true,
            "refundable": true,
            "order_id": order_id,
            "status": eligibility["status"],
            "delivery_date": eligibility["delivery_date"],
            "reason": format!(
                "{base_reason} Since the order is eligible for return, a refund can be issued \
                 to the original payment method once the return is completed."
            ),
            "expected_refund_timeline": timeline,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> RefundTool {
        RefundTool::new(Arc::new(Catalog::demo()))
    }

    #[tokio::test]
    async fn test_refundable_with_timeline() {
        let result = tool()
            .execute(json!({"order_id": "ORD1001", "today": "2025-11-28"}))
            .await
            .unwrap();
        assert_eq!(result["refundable"], true);
        let timeline = result["expected_refund_timeline"].as_str().unwrap();
        assert!(timeline.contains("2025-12-05"));
    }

    #[tokio::test]
    async fn test_not_refundable_outside_window() {
        let result = tool()
            .execute(json!({"order_id": "ORD1001", "today": "2026-01-15"}))
            .await
            .unwrap();
        assert_eq!(result["found"], true);
        assert_eq!(result["refundable"], false);
        assert!(result["expected_refund_timeline"].is_null());
        assert!(result["reason"]
            .as_str()
            .unwrap()
            .contains("refund cannot be processed"));
    }

    #[tokio::test]
    async fn test_unknown_order_not_refundable() {
        let result = tool()
            .execute(json!({"order_id": "ORD9999", "today": "2025-11-28"}))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
        assert_eq!(result["refundable"], false);
    }
}
