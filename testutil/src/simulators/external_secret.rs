use super::ready::simulate_conditions;
use super::CustomKind;
use crate::builders::SecretBuilder;
use crate::conditions::{Condition, ConditionStatus};
use crate::error::{self, Result};
use crate::status_code::HttpStatusCode;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DynamicObject, PostParams};
use kube::{Api, Client};
use log::debug;
use snafu::ResultExt;
use std::collections::BTreeMap;

/// Writes the status the external-secrets controller writes after a successful sync, and makes
/// sure the target `Secret` of the same name holds exactly `data`.
pub async fn simulate_external_secret_sync(
    client: &Client,
    name: &str,
    namespace: &str,
    data: BTreeMap<String, Vec<u8>>,
) -> Result<(DynamicObject, Secret)> {
    let conditions = vec![Condition::new(
        "Ready",
        ConditionStatus::True,
        "SecretSynced",
        "Secret was synced",
    )];
    let external_secret = simulate_conditions(
        client,
        &CustomKind::EXTERNAL_SECRET,
        name,
        namespace,
        conditions,
    )
    .await?;
    let secret = sync_target_secret(client, name, namespace, data).await?;
    Ok((external_secret, secret))
}

/// Creates the target secret, or overwrites the data of the existing one. The update carries the
/// fetched resource version.
async fn sync_target_secret(
    client: &Client,
    name: &str,
    namespace: &str,
    data: BTreeMap<String, Vec<u8>>,
) -> Result<Secret> {
    let what = format!("target Secret {}/{}", namespace, name);
    let secret = SecretBuilder::new()
        .with_name(name)
        .with_namespace(namespace)
        .with_data(data)
        .build();
    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
    match api.create(&PostParams::default(), &secret).await {
        Ok(created) => Ok(created),
        Err(e) if e.is_already_exists() => {
            debug!("{} already exists, replacing its data", what);
            let mut existing = api
                .get(name)
                .await
                .context(error::GetSnafu { what: &what })?;
            existing.data = secret.data;
            Ok(api
                .replace(name, &PostParams::default(), &existing)
                .await
                .context(error::UpdateSnafu { what: &what })?)
        }
        Err(e) => Err(e)
            .context(error::CreateSnafu { what })
            .map_err(Into::into),
    }
}
