//! Application state for the internal API.

use std::sync::Arc;

use crate::aggregation::PunchAggregator;
use crate::error::{EngineError, EngineResult};
use crate::models::Tenant;
use crate::schedule::ScheduleResolver;
use crate::store::TenantDirectory;

/// Shared application state.
///
/// Holds the same resolver and aggregator instances the closure sweeper
/// uses, so both paths read schedules and write summaries identically.
#[derive(Clone)]
pub struct AppState {
    tenants: Arc<dyn TenantDirectory>,
    resolver: ScheduleResolver,
    aggregator: Arc<PunchAggregator>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        resolver: ScheduleResolver,
        aggregator: Arc<PunchAggregator>,
    ) -> Self {
        Self {
            tenants,
            resolver,
            aggregator,
        }
    }

    /// The shared schedule resolver.
    pub fn resolver(&self) -> &ScheduleResolver {
        &self.resolver
    }

    /// The shared punch aggregator.
    pub fn aggregator(&self) -> &PunchAggregator {
        &self.aggregator
    }

    /// Looks up a tenant, failing with [`EngineError::TenantNotFound`].
    pub async fn tenant(&self, tenant_id: &str) -> EngineResult<Tenant> {
        self.tenants
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| EngineError::TenantNotFound {
                tenant_id: tenant_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::AggregationConfig;
    use crate::models::TenantTimezone;
    use crate::store::MemoryStore;

    fn create_test_state(store: Arc<MemoryStore>) -> AppState {
        let aggregator = PunchAggregator::new(
            store.clone(),
            store.clone(),
            Arc::new(SystemClock),
            AggregationConfig::default(),
        );
        AppState::new(store.clone(), ScheduleResolver::new(store), Arc::new(aggregator))
    }

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_tenant_lookup() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tenant(Tenant {
            id: "acme".to_string(),
            timezone: TenantTimezone::utc(),
            closure_policy: Default::default(),
            active: true,
        });
        let state = create_test_state(store);

        assert_eq!(state.tenant("acme").await.unwrap().id, "acme");
        assert!(matches!(
            state.tenant("globex").await,
            Err(EngineError::TenantNotFound { .. })
        ));
    }
}
