//! Local Cloud Simulator
//!
//! Implements every service trait on top of the SQLite [`Database`]. Records
//! carry a status plus an optional pending [`Transition`]; each describe call
//! counts down the transition and applies it once it reaches zero, so callers
//! observe the same eventual consistency a real control plane shows.
//!
//! Faults can be queued per operation name to exercise error paths.

mod dax;
mod ec2;
mod fsx;
mod gamelift;
mod route53resolver;
mod securityhub;
mod servicecatalog;
mod ses;

pub use route53resolver::SeedResolverRule;

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use stratus_common::db::ResourceRow;
use stratus_common::{ApiError, Arn, Database, Error, ProviderConfig, Result, Transition};
use tracing::debug;

/// Record kinds stored by the simulator
pub mod kind {
    pub const CARRIER_GATEWAY: &str = "ec2.carrier_gateway";
    pub const TGW_PEERING_ATTACHMENT: &str = "ec2.transit_gateway_peering_attachment";
    pub const DAX_PARAMETER_GROUP: &str = "dax.parameter_group";
    pub const GAMELIFT_ALIAS: &str = "gamelift.alias";
    pub const SES_RULE_SET: &str = "ses.receipt_rule_set";
    pub const SECURITYHUB_ORG_CONFIG: &str = "securityhub.organization_configuration";
    pub const SERVICECATALOG_CONSTRAINT: &str = "servicecatalog.constraint";
    pub const FSX_FILE_SYSTEM: &str = "fsx.file_system";
    pub const RESOLVER_RULE: &str = "route53resolver.rule";
}

/// Simulated cloud control plane
pub struct SimulatedCloud {
    db: Database,
    region: String,
    partition: String,
    account_id: String,
    settle_polls: u32,
    faults: Mutex<HashMap<String, VecDeque<ApiError>>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl SimulatedCloud {
    pub fn new(db: Database, config: &ProviderConfig) -> Self {
        Self {
            db,
            region: config.region.clone(),
            partition: config.partition.clone(),
            account_id: config.account_id.clone(),
            settle_polls: config.simulator.settle_polls,
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Queue an error for the next call of `operation`
    pub fn inject_fault(&self, operation: &str, error: ApiError) {
        self.faults
            .lock()
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
    }

    /// Number of calls made to `operation` so far
    pub fn call_count(&self, operation: &str) -> u32 {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Number of calls made to any operation so far
    pub fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }

    /// Remove every simulated record
    pub fn reset(&self) -> Result<()> {
        self.faults.lock().clear();
        self.calls.lock().clear();
        self.db.clear()
    }

    /// Record a call and fail it if a fault is queued
    fn enter(&self, operation: &str) -> Result<()> {
        *self.calls.lock().entry(operation.to_string()).or_insert(0) += 1;
        let fault = self
            .faults
            .lock()
            .get_mut(operation)
            .and_then(|q| q.pop_front());
        match fault {
            Some(err) => {
                debug!("Injected fault for {}: {}", operation, err);
                Err(Error::Api(err))
            }
            None => {
                debug!("Simulated call {}", operation);
                Ok(())
            }
        }
    }

    /// Transition that settles into `to` after the configured number of polls
    fn settling(&self, to: &str) -> Transition {
        Transition::to(to, self.settle_polls)
    }

    /// Transition that removes the record after the configured number of polls
    fn vanishing(&self, to: &str) -> Transition {
        Transition::removal(to, self.settle_polls)
    }

    /// Fetch a record as a describe call sees it, advancing its transition
    fn observe<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<Option<ResourceRow<T>>> {
        let Some(mut row) = self.db.get::<T>(kind, id)? else {
            return Ok(None);
        };

        if let Some(transition) = row.transition.take() {
            if transition.after_polls == 0 {
                if transition.remove {
                    self.db.delete(kind, id)?;
                    debug!("{} {} removed", kind, id);
                    return Ok(None);
                }
                self.db.set_status(kind, id, &transition.to, None)?;
                debug!("{} {} settled in {}", kind, id, transition.to);
                row.status = transition.to;
            } else {
                let next = Transition {
                    after_polls: transition.after_polls - 1,
                    ..transition
                };
                self.db.set_status(kind, id, &row.status, Some(&next))?;
                row.transition = Some(next);
            }
        }

        Ok(Some(row))
    }

    fn arn(&self, service: &str, resource: impl Into<String>) -> String {
        Arn::new(
            self.partition.as_str(),
            service,
            self.region.as_str(),
            self.account_id.as_str(),
            resource,
        )
        .to_string()
    }
}

/// Server-assigned identifier such as `cagw-0a1b2c3d4e5f60718`
fn new_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..17])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Thing {
        name: String,
    }

    fn cloud(settle_polls: u32) -> SimulatedCloud {
        let mut config = ProviderConfig::default();
        config.simulator.settle_polls = settle_polls;
        SimulatedCloud::new(Database::open_memory().unwrap(), &config)
    }

    #[test]
    fn test_observe_advances_transition() {
        let sim = cloud(2);
        let body = Thing {
            name: "a".to_string(),
        };
        sim.db
            .insert("t", "1", "a", &body, "CREATING", Some(&sim.settling("AVAILABLE")))
            .unwrap();

        let seen: Vec<String> = (0..4)
            .map(|_| sim.observe::<Thing>("t", "1").unwrap().unwrap().status)
            .collect();
        assert_eq!(seen, vec!["CREATING", "CREATING", "AVAILABLE", "AVAILABLE"]);
    }

    #[test]
    fn test_observe_removes_record() {
        let sim = cloud(1);
        let body = Thing {
            name: "a".to_string(),
        };
        sim.db
            .insert("t", "1", "a", &body, "DELETING", Some(&sim.vanishing("DELETED")))
            .unwrap();

        assert!(sim.observe::<Thing>("t", "1").unwrap().is_some());
        assert!(sim.observe::<Thing>("t", "1").unwrap().is_none());
        assert!(!sim.db.exists("t", "1").unwrap());
    }

    #[test]
    fn test_fault_injection() {
        let sim = cloud(0);
        sim.inject_fault("DescribeThing", ApiError::throttling("slow down"));

        let err = sim.enter("DescribeThing").unwrap_err();
        assert!(err.is_transient());
        assert!(sim.enter("DescribeThing").is_ok());
        assert_eq!(sim.call_count("DescribeThing"), 2);
        assert_eq!(sim.total_calls(), 2);
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id("cagw");
        assert!(id.starts_with("cagw-"));
        assert_eq!(id.len(), "cagw-".len() + 17);
    }
}
