use super::Reporter;
use crate::conditions::{Condition, ConditionStatus};
use crate::error::{self, Result};
use crate::unstructured;
use kube::{Api, Resource};
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;

/// The interval between attempts when none is given.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long [`poll_until_condition`] keeps trying, and how long it waits between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Polling {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Polling {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl From<Duration> for Polling {
    fn from(timeout: Duration) -> Self {
        Self::new(timeout)
    }
}

/// Checks that the first condition of type `condition_type` has the `expected` status. Reports
/// a failure if the status differs or if no such condition exists.
pub fn assert_condition_status<R>(
    reporter: &mut R,
    conditions: &[Condition],
    condition_type: &str,
    expected: ConditionStatus,
) -> bool
where
    R: Reporter + ?Sized,
{
    match conditions.iter().find(|c| c.type_ == condition_type) {
        Some(condition) if condition.status == expected.as_str() => true,
        Some(condition) => {
            reporter.fail(format!(
                "condition \"{}\" has status \"{}\", expected \"{}\"",
                condition_type, condition.status, expected
            ));
            false
        }
        None => {
            reporter.fail(format!("condition \"{}\" not found", condition_type));
            false
        }
    }
}

/// Reads `status.conditions` from any object. Entries that are not well-formed conditions are
/// skipped. It is an error if the list itself is missing or is not a list.
pub fn conditions_of<K>(object: &K) -> Result<Vec<Condition>>
where
    K: Serialize,
{
    let value = serde_json::to_value(object).context(error::SerializeSnafu {
        kind: std::any::type_name::<K>(),
    })?;
    let kind = value
        .get("kind")
        .and_then(|kind| kind.as_str())
        .unwrap_or("object")
        .to_string();
    let entries = unstructured::nested_slice(&value, &["status", "conditions"]).context(
        error::ReadFieldSnafu {
            kind,
            field: "status.conditions",
        },
    )?;
    Ok(entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(condition) => Some(condition),
            Err(e) => {
                trace!("Skipping malformed condition {}: {}", entry, e);
                None
            }
        })
        .collect())
}

/// Fetches the object named `name` until its condition `condition_type` has the `expected`
/// status, or until the timeout passes. Every attempt is checked in isolation, and on timeout
/// only the failures of the last attempt are reported.
pub async fn poll_until_condition<R, K, P>(
    reporter: &mut R,
    api: &Api<K>,
    name: &str,
    condition_type: &str,
    expected: ConditionStatus,
    polling: P,
) -> bool
where
    R: Reporter + ?Sized,
    K: Clone + Debug + DeserializeOwned + Serialize + Resource,
    P: Into<Polling>,
{
    let polling = polling.into();
    let start = Instant::now();
    loop {
        let mut attempt = Vec::new();
        let remaining = polling.timeout.saturating_sub(start.elapsed());
        match tokio::time::timeout(remaining, api.get(name)).await {
            Ok(Ok(object)) => match conditions_of(&object) {
                Ok(conditions) => {
                    assert_condition_status(&mut attempt, &conditions, condition_type, expected);
                }
                Err(e) => attempt.fail(e.to_string()),
            },
            Ok(Err(e)) => attempt.fail(format!("getting '{}': {}", name, e)),
            Err(_) => attempt.fail(format!("getting '{}' did not complete in time", name)),
        }
        if attempt.is_empty() {
            debug!(
                "'{}' has condition '{}={}' after {:?}",
                name,
                condition_type,
                expected,
                start.elapsed()
            );
            return true;
        }

        let elapsed = start.elapsed();
        if elapsed >= polling.timeout {
            for failure in attempt {
                reporter.fail(format!(
                    "{}/{} after {:?}: {}",
                    api.resource_url(),
                    name,
                    elapsed,
                    failure
                ));
            }
            return false;
        }
        trace!(
            "Waiting for '{}' to have condition '{}={}': {}",
            name,
            condition_type,
            expected,
            attempt.join("; ")
        );
        tokio::time::sleep(polling.interval.min(polling.timeout - elapsed)).await;
    }
}
