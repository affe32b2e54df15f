//! Product catalog search tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::error::Result;

use super::types::Tool;

pub struct ProductSearchTool {
    catalog: Arc<Catalog>,
}

impl ProductSearchTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for ProductSearchTool {
    fn name(&self) -> &str {
        "search_products"
    }

    fn description(&self) -> &str {
        "Search for products in the catalog based on category, price, brand, or tags. Returns a list of matching products."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Product category: laptop, headphones, mouse, keyboard, or null for all"
                },
                "max_price": {
                    "type": "number",
                    "description": "Maximum price filter in INR"
                },
                "brand": {
                    "type": "string",
                    "description": "Brand name filter, e.g., Asus, Lenovo"
                },
                "required_tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Required tags like gaming, wireless, office, etc."
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let category = args["category"].as_str();
        let max_price = args["max_price"].as_f64();
        let brand = args["brand"].as_str();
        let required_tags: Vec<String> = args["required_tags"]
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let matches = self
            .catalog
            .filter_products(category, max_price, brand, &required_tags);

        let products: Vec<Value> = matches
            .iter()
            .map(|p| {
                json!({
                    "product_id": p.product_id,
                    "name": p.name,
                    "category": p.category,
                    "brand": p.brand,
                    "price": p.price,
                    "currency": p.currency,
                    "tags": p.tags,
                    "rating": p.rating,
                })
            })
            .collect();

        let message = if products.is_empty() {
            "No products found matching the given filters.".to_string()
        } else {
            format!("Found {} product(s) matching the given filters.", products.len())
        };

        Ok(json!({
            "count": products.len(),
            "products": products,
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ProductSearchTool {
        ProductSearchTool::new(Arc::new(Catalog::demo()))
    }

    #[tokio::test]
    async fn test_search_no_filters_returns_all() {
        let result = tool().execute(json!({})).await.unwrap();
        assert_eq!(result["count"], 5);
    }

    #[tokio::test]
    async fn test_search_combined_filters() {
        let result = tool()
            .execute(json!({"category": "laptop", "max_price": 60000.0}))
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["products"][0]["product_id"], "LAP123");
    }

    #[tokio::test]
    async fn test_search_required_tags() {
        let result = tool()
            .execute(json!({"required_tags": ["wireless", "office"]}))
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["products"][0]["product_id"], "KEY789");
    }

    #[tokio::test]
    async fn test_search_no_matches() {
        let result = tool()
            .execute(json!({"category": "laptop", "brand": "Sony"}))
            .await
            .unwrap();
        assert_eq!(result["count"], 0);
        assert!(result["message"].as_str().unwrap().contains("No products"));
    }
}
