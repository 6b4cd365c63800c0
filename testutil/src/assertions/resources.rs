use super::Reporter;
use crate::status_code::HttpStatusCode;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Fetches `name` once and reports a failure if the fetch fails for any reason.
pub async fn assert_resource_exists<R, K>(reporter: &mut R, api: &Api<K>, name: &str) -> bool
where
    R: Reporter + ?Sized,
    K: Clone + Debug + DeserializeOwned + Resource,
{
    match api.get(name).await {
        Ok(_) => true,
        Err(e) => {
            reporter.fail(format!(
                "expected {}/{} to exist: {}",
                api.resource_url(),
                name,
                e
            ));
            false
        }
    }
}

/// Fetches `name` once and reports a failure unless the API server answers "not found".
pub async fn assert_resource_not_exists<R, K>(reporter: &mut R, api: &Api<K>, name: &str) -> bool
where
    R: Reporter + ?Sized,
    K: Clone + Debug + DeserializeOwned + Resource,
{
    match api.get(name).await {
        Ok(_) => {
            reporter.fail(format!(
                "expected {}/{} not to exist, but it does",
                api.resource_url(),
                name
            ));
            false
        }
        Err(e) if e.is_not_found() => true,
        Err(e) => {
            reporter.fail(format!(
                "checking that {}/{} does not exist: {}",
                api.resource_url(),
                name,
                e
            ));
            false
        }
    }
}
