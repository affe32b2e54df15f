//! Structured store data: orders, products, and the troubleshooting
//! knowledge base.
//!
//! Tools answer from this data instead of letting the model guess. The
//! catalog loads from JSON files under `<data_dir>/structured/` and falls
//! back to a built-in demo dataset when the files are absent.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    /// "delivered", "shipped" or "processing".
    pub status: String,
    pub order_date: String,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// product type -> issue key -> ordered steps.
pub type TroubleshootingKb = HashMap<String, HashMap<String, Vec<String>>>;

pub struct Catalog {
    orders: Vec<Order>,
    products: Vec<Product>,
    troubleshooting: TroubleshootingKb,
}

impl Catalog {
    /// Load orders.json, products.json and troubleshooting.json from
    /// `<dir>/structured/`. Missing files fall back to the demo dataset for
    /// that slice.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let structured = dir.as_ref().join("structured");
        let demo = Self::demo();

        let orders = read_json_or(&structured.join("orders.json"), demo.orders)?;
        let products = read_json_or(&structured.join("products.json"), demo.products)?;
        let troubleshooting =
            read_json_or(&structured.join("troubleshooting.json"), demo.troubleshooting)?;

        info!(
            orders = orders.len(),
            products = products.len(),
            "catalog loaded"
        );
        Ok(Self {
            orders,
            products,
            troubleshooting,
        })
    }

    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn orders_for_user(&self, user_id: &str) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.user_id == user_id).collect()
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    /// Products matching every provided filter.
    pub fn filter_products(
        &self,
        category: Option<&str>,
        max_price: Option<f64>,
        brand: Option<&str>,
        required_tags: &[String],
    ) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| {
                if let Some(cat) = category {
                    if !p.category.eq_ignore_ascii_case(cat) {
                        return false;
                    }
                }
                if let Some(b) = brand {
                    if !p.brand.eq_ignore_ascii_case(b) {
                        return false;
                    }
                }
                if let Some(max) = max_price {
                    if p.price > max {
                        return false;
                    }
                }
                required_tags.iter().all(|wanted| {
                    p.tags.iter().any(|t| t.eq_ignore_ascii_case(wanted))
                })
            })
            .collect()
    }

    pub fn troubleshooting_steps(&self, product_type: &str, issue_key: &str) -> Option<&[String]> {
        self.troubleshooting
            .get(product_type)?
            .get(issue_key)
            .map(Vec::as_slice)
    }

    /// Built-in dataset used for demos and tests.
    pub fn demo() -> Self {
        let orders: Vec<Order> = serde_json::from_value(json!([
            {
                "order_id": "ORD1001",
                "user_id": "U001",
                "status": "delivered",
                "order_date": "2025-11-20",
                "delivery_date": "2025-11-25",
                "items": [{"product_id": "LAP123", "quantity": 1}]
            },
            {
                "order_id": "ORD1002",
                "user_id": "U001",
                "status": "shipped",
                "order_date": "2025-12-01",
                "delivery_date": "2025-12-08",
                "items": [{"product_id": "HPH456", "quantity": 1}]
            },
            {
                "order_id": "ORD1003",
                "user_id": "U002",
                "status": "processing",
                "order_date": "2025-12-03",
                "delivery_date": null,
                "items": [{"product_id": "KEY789", "quantity": 2}]
            },
            {
                "order_id": "ORD1004",
                "user_id": "U003",
                "status": "delivered",
                "order_date": "2025-06-10",
                "delivery_date": "2025-06-14",
                "items": [
                    {"product_id": "MOU321", "quantity": 1},
                    {"product_id": "HPH456", "quantity": 1}
                ]
            },
            {
                "order_id": "ORD1005",
                "user_id": "U004",
                "status": "delivered",
                "order_date": "2024-10-01",
                "delivery_date": "2024-10-05",
                "items": [{"product_id": "LAP124", "quantity": 1}]
            }
        ]))
        .unwrap_or_default();

        let products: Vec<Product> = serde_json::from_value(json!([
            {
                "product_id": "LAP123",
                "name": "Asus VivoBook 15",
                "category": "laptop",
                "brand": "Asus",
                "price": 54990.0,
                "currency": "INR",
                "tags": ["office", "lightweight"],
                "rating": 4.3
            },
            {
                "product_id": "LAP124",
                "name": "Lenovo Legion 5",
                "category": "laptop",
                "brand": "Lenovo",
                "price": 89990.0,
                "currency": "INR",
                "tags": ["gaming", "performance"],
                "rating": 4.6
            },
            {
                "product_id": "HPH456",
                "name": "Sony WH-CH520",
                "category": "headphones",
                "brand": "Sony",
                "price": 4490.0,
                "currency": "INR",
                "tags": ["wireless", "noise-cancelling"],
                "rating": 4.4
            },
            {
                "product_id": "KEY789",
                "name": "Logitech K380",
                "category": "keyboard",
                "brand": "Logitech",
                "price": 2795.0,
                "currency": "INR",
                "tags": ["wireless", "office"],
                "rating": 4.5
            },
            {
                "product_id": "MOU321",
                "name": "Logitech M331 Silent",
                "category": "mouse",
                "brand": "Logitech",
                "price": 1095.0,
                "currency": "INR",
                "tags": ["wireless", "silent"],
                "rating": 4.4
            }
        ]))
        .unwrap_or_default();

        let troubleshooting: TroubleshootingKb = serde_json::from_value(json!({
            "laptop": {
                "not_turning_on": [
                    "Check that the charger is plugged in and the charging light is on.",
                    "Hold the power button for 15 seconds to force a restart.",
                    "Disconnect all external devices and try powering on again.",
                    "If the battery is removable, reseat it and retry."
                ],
                "overheating": [
                    "Place the laptop on a hard, flat surface so the vents are clear.",
                    "Close background applications with high CPU usage.",
                    "Clean the air vents with compressed air.",
                    "Update the BIOS and graphics drivers to the latest versions."
                ]
            },
            "headphones": {
                "no_sound": [
                    "Confirm the headphones are charged and powered on.",
                    "Re-pair the headphones with your device via Bluetooth settings.",
                    "Check the output device selected in your system sound settings.",
                    "Test with a different device to rule out a source problem."
                ],
                "not_turning_on": [
                    "Charge the headphones for at least 30 minutes.",
                    "Hold the power button for 10 seconds to reset.",
                    "Try a different charging cable and power source."
                ]
            }
        }))
        .unwrap_or_default();

        Self {
            orders,
            products,
            troubleshooting,
        }
    }
}

fn read_json_or<T: serde::de::DeserializeOwned>(path: &Path, fallback: T) -> Result<T> {
    if !path.exists() {
        return Ok(fallback);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Normalize user id spellings: "0001" and "u001" both resolve to "U001".
pub fn normalize_user_id(user_id: &str) -> String {
    let trimmed = user_id.trim().to_uppercase();
    if trimmed.chars().all(|c| c.is_ascii_digit()) && !trimmed.is_empty() {
        let digits = trimmed.trim_start_matches('0');
        return format!("U{:0>3}", if digits.is_empty() { "0" } else { digits });
    }
    if !trimmed.starts_with('U') {
        return format!("U{trimmed}");
    }
    trimmed
}
