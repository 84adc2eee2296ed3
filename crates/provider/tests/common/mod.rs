//! Shared harness for provider integration tests
//!
//! Every test gets its own in-memory simulator. Polling runs on tokio's
//! paused clock, so waits complete instantly.

#![allow(dead_code)]

use std::sync::Arc;

use stratus_common::{
    Database, Error, PropagationConfig, ProviderConfig, SimulatorConfig, TimeoutsConfig,
};
use stratus_provider::schema::PlanAction;
use stratus_provider::{CloudClient, DynamicValue, SimulatedCloud, StratusProvider};

pub struct Harness {
    pub cloud: Arc<SimulatedCloud>,
    pub provider: StratusProvider,
}

pub fn test_config() -> ProviderConfig {
    ProviderConfig {
        timeouts: TimeoutsConfig {
            create_secs: 60,
            update_secs: 60,
            delete_secs: 60,
            poll_interval_ms: 100,
            delay_ms: 0,
        },
        propagation: PropagationConfig {
            max_attempts: 3,
            delay_ms: 50,
        },
        ..ProviderConfig::default()
    }
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: ProviderConfig) -> Harness {
    let db = Database::open_memory().unwrap();
    let cloud = Arc::new(SimulatedCloud::new(db, &config));
    let client = CloudClient::simulated(&config, cloud.clone());
    Harness {
        cloud,
        provider: StratusProvider::new(config, client),
    }
}

/// Configuration whose records never leave their transitional status in time
pub fn slow_config(create_secs: u64) -> ProviderConfig {
    let mut config = test_config();
    config.timeouts.create_secs = create_secs;
    config.simulator = SimulatorConfig {
        settle_polls: 10_000,
    };
    config
}

pub fn value(json: serde_json::Value) -> DynamicValue {
    DynamicValue::from(json)
}

impl Harness {
    pub async fn create(&self, type_name: &str, config: serde_json::Value) -> DynamicValue {
        self.provider
            .apply_resource_change(type_name, None, &value(config))
            .await
            .unwrap()
    }

    /// Plan and apply an in-place update, returning the new state
    pub async fn update(
        &self,
        type_name: &str,
        prior: &DynamicValue,
        config: serde_json::Value,
    ) -> DynamicValue {
        let plan = self
            .provider
            .plan_resource_change(type_name, Some(prior), &value(config))
            .unwrap();
        assert_eq!(plan.action, PlanAction::Update, "changed: {:?}", plan.changed);
        self.provider
            .apply_resource_change(type_name, Some(prior), &plan.planned_state)
            .await
            .unwrap()
    }

    pub async fn destroy(&self, type_name: &str, state: &DynamicValue) {
        let after = self
            .provider
            .apply_resource_change(type_name, Some(state), &DynamicValue::Null)
            .await
            .unwrap();
        assert!(after.is_null());
    }

    pub async fn read(&self, type_name: &str, state: &DynamicValue) -> Option<DynamicValue> {
        self.provider.read_resource(type_name, state).await.unwrap()
    }
}

pub fn str_attr<'a>(state: &'a DynamicValue, key: &str) -> &'a str {
    state.get(key).and_then(|v| v.as_string()).unwrap_or("")
}

/// The first provider error in an `anyhow` chain
pub fn provider_error(err: &anyhow::Error) -> &Error {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .unwrap_or_else(|| panic!("no provider error in chain: {:#}", err))
}
