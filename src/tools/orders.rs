//! Order lookup tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::catalog::{normalize_user_id, Catalog};
use crate::error::Result;

use super::types::Tool;

/// Lists every order placed by a user.
pub struct FindOrdersByUserTool {
    catalog: Arc<Catalog>,
}

impl FindOrdersByUserTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for FindOrdersByUserTool {
    fn name(&self) -> &str {
        "find_orders_by_user_id"
    }

    fn description(&self) -> &str {
        "Find all orders placed by a specific user. Use this when you have the user_id and need to see their order history."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "string",
                    "description": "The user ID, e.g., U001, U002"
                }
            },
            "required": ["user_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let user_id = normalize_user_id(args["user_id"].as_str().unwrap_or_default());
        let orders = self.catalog.orders_for_user(&user_id);

        if orders.is_empty() {
            return Ok(json!({
                "found": false,
                "user_id": user_id,
                "count": 0,
                "orders": [],
                "message": format!(
                    "No orders found for user {user_id}. Please check if the user ID is correct (format: U001, U002, etc.)."
                ),
            }));
        }

        let summaries: Vec<Value> = orders
            .iter()
            .map(|order| {
                let items: Vec<String> = order
                    .items
                    .iter()
                    .map(|i| format!("{} (qty: {})", i.product_id, i.quantity))
                    .collect();
                json!({
                    "order_id": order.order_id,
                    "status": order.status,
                    "order_date": order.order_date,
                    "delivery_date": order.delivery_date,
                    "items": items,
                })
            })
            .collect();

        let mut lines = vec![format!("Found {} order(s) for user {user_id}:", orders.len())];
        for (i, order) in orders.iter().enumerate() {
            let items: Vec<String> = order
                .items
                .iter()
                .map(|item| format!("{} (qty: {})", item.product_id, item.quantity))
                .collect();
            lines.push(format!(
                "{}. Order {} - Status: {} - Items: {}",
                i + 1,
                order.order_id,
                order.status,
                items.join(", ")
            ));
        }

        Ok(json!({
            "found": true,
            "user_id": user_id,
            "count": orders.len(),
            "orders": summaries,
            "message": lines.join("\n"),
        }))
    }
}

/// Reports the status of a single order.
pub struct OrderStatusTool {
    catalog: Arc<Catalog>,
}

impl OrderStatusTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for OrderStatusTool {
    fn name(&self) -> &str {
        "get_order_status"
    }

    fn description(&self) -> &str {
        "Get the detailed status of a specific order including delivery date, items, and current status."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_id": {
                    "type": "string",
                    "description": "The order ID, e.g., ORD1001, ORD1002"
                }
            },
            "required": ["order_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let order_id = args["order_id"].as_str().unwrap_or_default();
        let Some(order) = self.catalog.find_order(order_id) else {
            return Ok(json!({
                "found": false,
                "order_id": order_id,
                "status": null,
                "delivery_date": null,
                "items": [],
                "message": format!("No order found with ID {order_id}."),
            }));
        };

        let delivery = order.delivery_date.as_deref().unwrap_or("unknown");
        let message = match order.status.as_str() {
            "delivered" => format!("Order {order_id} has been delivered on {delivery}."),
            "shipped" => {
                format!("Order {order_id} has been shipped. Estimated delivery date: {delivery}.")
            }
            "processing" => format!("Order {order_id} is currently being processed."),
            other => format!("Order {order_id} has status: {other}."),
        };

        Ok(json!({
            "found": true,
            "order_id": order.order_id,
            "status": order.status,
            "delivery_date": order.delivery_date,
            "items": order.items,
            "message": message,
        }))
    }
}
