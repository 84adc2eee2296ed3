//! Lifecycle Poller
//!
//! Repeatedly describes a remote object until its status reaches one of the
//! target values. Statuses outside the pending and target sets fail the wait
//! immediately; throttling is swallowed; absence is success when waiting for
//! deletion and tolerated for a bounded number of polls otherwise.

use std::future::Future;
use std::time::Duration;

use stratus_common::{Error, Result, TimeoutsConfig};
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default number of consecutive "absent" polls tolerated while a target
/// status is expected.
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Default sleep between two describe calls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

type FailureDetail<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Status-change wait configuration
pub struct StateChangeConf<T> {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    pub timeout: Duration,
    pub delay: Duration,
    pub poll_interval: Duration,
    pub not_found_checks: u32,
    pub continuous_target_occurrence: u32,
    failure_detail: Option<FailureDetail<T>>,
}

impl<T> std::fmt::Debug for StateChangeConf<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateChangeConf")
            .field("pending", &self.pending)
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("delay", &self.delay)
            .field("poll_interval", &self.poll_interval)
            .field("not_found_checks", &self.not_found_checks)
            .field(
                "continuous_target_occurrence",
                &self.continuous_target_occurrence,
            )
            .finish()
    }
}

impl<T> StateChangeConf<T> {
    pub fn new(pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            timeout,
            delay: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
            failure_detail: None,
        }
    }

    /// Take poll interval and initial delay from provider configuration
    pub fn with_timing(mut self, timeouts: &TimeoutsConfig) -> Self {
        self.poll_interval = timeouts.poll_interval();
        self.delay = timeouts.delay();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub fn continuous_target_occurrence(mut self, n: u32) -> Self {
        self.continuous_target_occurrence = n.max(1);
        self
    }

    /// Extract a human-readable failure reason from the last observed object
    pub fn failure_detail<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.failure_detail = Some(Box::new(f));
        self
    }

    fn cause_of(&self, object: Option<&T>) -> Option<String> {
        match (&self.failure_detail, object) {
            (Some(extract), Some(obj)) => extract(obj).filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Poll `refresh` until a target status is reached.
    ///
    /// `refresh` returns the current object with its status, `None` when the
    /// object does not exist, or an error. Returns the object that reached
    /// the target, or `None` when waiting for absence succeeded.
    pub async fn wait<F, Fut>(&self, mut refresh: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<(T, String)>>>,
    {
        let started = Instant::now();
        let deadline = started + self.timeout;

        if !self.delay.is_zero() {
            sleep(self.delay.min(self.timeout)).await;
        }

        let mut last: Option<T> = None;
        let mut last_state = String::new();
        let mut not_found = 0u32;
        let mut target_seen = 0u32;

        loop {
            match refresh().await {
                Err(e) if e.is_transient() => {
                    debug!("Transient error while waiting, retrying: {}", e);
                }
                Err(e) => return Err(e),
                Ok(None) => {
                    target_seen = 0;
                    if self.target.is_empty() {
                        debug!("Object absent after {:?}", started.elapsed());
                        return Ok(None);
                    }
                    not_found += 1;
                    if not_found > self.not_found_checks {
                        return Err(Error::Vanished {
                            checks: self.not_found_checks,
                        });
                    }
                    debug!(
                        "Object not found ({}/{}), waiting for {:?}",
                        not_found, self.not_found_checks, self.target
                    );
                }
                Ok(Some((object, status))) => {
                    not_found = 0;
                    debug!("Observed status {:?}, waiting for {:?}", status, self.target);

                    if self.target.contains(&status) {
                        target_seen += 1;
                        if target_seen >= self.continuous_target_occurrence {
                            return Ok(Some(object));
                        }
                    } else if self.pending.contains(&status) {
                        target_seen = 0;
                    } else {
                        let cause = self.cause_of(Some(&object));
                        return Err(Error::UnexpectedState {
                            state: status,
                            expected: self.target.clone(),
                            cause,
                        });
                    }
                    last_state = status;
                    last = Some(object);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout {
                    last_state,
                    expected: self.target.clone(),
                    timeout: self.timeout,
                    cause: self.cause_of(last.as_ref()),
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

/// Object whose lifecycle can be read through a [`StatusField`]
pub trait StatusSource {
    fn lifecycle(&self) -> &str;

    /// Status of the named administrative action, if the object carries one
    fn action_status(&self, _action: &str) -> Option<&str> {
        None
    }
}

/// Which status of an object a wait observes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusField {
    Lifecycle,
    AdministrativeAction {
        name: String,
        /// Reported when the object carries no such action
        absent_status: String,
    },
}

impl StatusField {
    pub fn action(name: impl Into<String>, absent_status: impl Into<String>) -> Self {
        StatusField::AdministrativeAction {
            name: name.into(),
            absent_status: absent_status.into(),
        }
    }

    pub fn extract<S: StatusSource>(&self, source: &S) -> String {
        match self {
            StatusField::Lifecycle => source.lifecycle().to_string(),
            StatusField::AdministrativeAction {
                name,
                absent_status,
            } => source
                .action_status(name)
                .unwrap_or(absent_status)
                .to_string(),
        }
    }
}
