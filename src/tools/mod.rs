//! Tool system: trait, registry, and the built-in support tools.

mod orders;
mod policy;
mod products;
mod refunds;
mod registry;
mod returns;
mod troubleshooting;
mod types;
mod warranty;

pub use orders::{FindOrdersByUserTool, OrderStatusTool};
pub use policy::PolicySearchTool;
pub use products::ProductSearchTool;
pub use refunds::RefundTool;
pub use registry::ToolRegistry;
pub use returns::ReturnEligibilityTool;
pub use troubleshooting::TroubleshootingTool;
pub use types::Tool;
pub use warranty::WarrantyTool;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::rag::RagService;

/// Tools that ask for a `today` argument the backend injects itself.
pub const DATE_DEPENDENT_TOOLS: &[&str] = &[
    "check_return_eligibility",
    "check_refund_possibility",
    "check_warranty_status",
];

/// Registry with every built-in support tool registered, in the order they
/// are advertised to the model.
pub fn default_registry(catalog: Arc<Catalog>, rag: Arc<RagService>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FindOrdersByUserTool::new(catalog.clone())));
    registry.register(Arc::new(OrderStatusTool::new(catalog.clone())));
    registry.register(Arc::new(ProductSearchTool::new(catalog.clone())));
    registry.register(Arc::new(ReturnEligibilityTool::new(catalog.clone())));
    registry.register(Arc::new(RefundTool::new(catalog.clone())));
    registry.register(Arc::new(WarrantyTool::new(catalog.clone())));
    registry.register(Arc::new(TroubleshootingTool::new(catalog)));
    registry.register(Arc::new(PolicySearchTool::new(rag)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::Result;
    use crate::providers::{ModelClient, ModelTurn, ToolDeclaration, TranscriptEntry};
    use crate::rag::KeywordIndex;

    struct NullModel;

    #[async_trait]
    impl ModelClient for NullModel {
        async fn converse(
            &self,
            _system_prompt: &str,
            _tools: &[ToolDeclaration],
            _transcript: &[TranscriptEntry],
        ) -> Result<ModelTurn> {
            Ok(ModelTurn::FinalAnswer(String::new()))
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    #[test]
    fn test_default_registry_has_all_tools() {
        let rag = Arc::new(RagService::new(
            Arc::new(KeywordIndex::with_builtin_docs()),
            Arc::new(NullModel),
        ));
        let registry = default_registry(Arc::new(Catalog::demo()), rag);
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.names(),
            vec![
                "find_orders_by_user_id",
                "get_order_status",
                "search_products",
                "check_return_eligibility",
                "check_refund_possibility",
                "check_warranty_status",
                "get_troubleshooting_steps",
                "search_policy_docs",
            ]
        );
        for name in DATE_DEPENDENT_TOOLS {
            assert!(registry.has(name));
        }
    }
}
