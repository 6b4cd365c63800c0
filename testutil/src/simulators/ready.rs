use super::helpers::{create_or_fetch, patch_status};
use super::CustomKind;
use crate::conditions::{Condition, ConditionStatus};
use crate::error::{self, Result};
use crate::unstructured::set_nested_field;
use kube::api::DynamicObject;
use kube::{Api, Client};
use serde_json::json;
use snafu::ResultExt;

/// Writes the status a controller that reports readiness through `status.ready` and a `Ready`
/// condition would write once the object is ready. The object is created first if it does not
/// exist. Calling it again replaces the previous values.
pub async fn simulate_ready(
    client: &Client,
    kind: &CustomKind,
    name: &str,
    namespace: &str,
    reason: &str,
    message: &str,
) -> Result<DynamicObject> {
    let conditions = vec![Condition::new(
        "Ready",
        ConditionStatus::True,
        reason,
        message,
    )];
    simulate_status(client, kind, name, namespace, conditions, true).await
}

/// Like [`simulate_ready`] for kinds that only report `status.conditions`. The given conditions
/// replace whatever conditions the object had.
pub async fn simulate_conditions(
    client: &Client,
    kind: &CustomKind,
    name: &str,
    namespace: &str,
    conditions: Vec<Condition>,
) -> Result<DynamicObject> {
    simulate_status(client, kind, name, namespace, conditions, false).await
}

pub async fn simulate_mariadb_ready(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<DynamicObject> {
    simulate_ready(
        client,
        &CustomKind::MARIADB,
        name,
        namespace,
        "Ready",
        "MariaDB is ready",
    )
    .await
}

pub async fn simulate_memcached_ready(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<DynamicObject> {
    simulate_ready(
        client,
        &CustomKind::MEMCACHED,
        name,
        namespace,
        "Ready",
        "Memcached is ready",
    )
    .await
}

pub async fn simulate_certificate_ready(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<DynamicObject> {
    let conditions = vec![Condition::new(
        "Ready",
        ConditionStatus::True,
        "Ready",
        "Certificate is up to date and has not expired",
    )];
    simulate_conditions(
        client,
        &CustomKind::CERTIFICATE,
        name,
        namespace,
        conditions,
    )
    .await
}

pub async fn simulate_rabbitmq_cluster_ready(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<DynamicObject> {
    let conditions = vec![
        Condition::new(
            "AllReplicasReady",
            ConditionStatus::True,
            "AllPodsAreReady",
            "",
        ),
        Condition::new(
            "ClusterAvailable",
            ConditionStatus::True,
            "AtLeastOneEndpointAvailable",
            "",
        ),
        Condition::new(
            "ReconcileSuccess",
            ConditionStatus::True,
            "Success",
            "Finish reconciling",
        ),
    ];
    simulate_conditions(
        client,
        &CustomKind::RABBITMQ_CLUSTER,
        name,
        namespace,
        conditions,
    )
    .await
}

async fn simulate_status(
    client: &Client,
    kind: &CustomKind,
    name: &str,
    namespace: &str,
    conditions: Vec<Condition>,
    ready: bool,
) -> Result<DynamicObject> {
    let resource = kind.api_resource();
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &resource);
    let object = DynamicObject::new(name, &resource)
        .within(namespace)
        .data(json!({}));
    let existing = create_or_fetch(&api, &object, kind.kind).await?;

    let mut modified = existing.clone();
    if ready {
        set_nested_field(&mut modified.data, &["status", "ready"], true).context(
            error::SetFieldSnafu {
                kind: kind.kind,
                field: "status.ready",
            },
        )?;
    }
    let conditions =
        serde_json::to_value(conditions).context(error::SerializeSnafu { kind: kind.kind })?;
    set_nested_field(&mut modified.data, &["status", "conditions"], conditions).context(
        error::SetFieldSnafu {
            kind: kind.kind,
            field: "status.conditions",
        },
    )?;
    patch_status(&api, kind.kind, &existing, &modified).await
}
