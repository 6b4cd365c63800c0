use crate::error::{self, Result};
use crate::merge_patch::MergePatch;
use crate::status_code::HttpStatusCode;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Resource, ResourceExt};
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::fmt::Debug;

/// Creates `object`, or fetches the stored object if one with the same name already exists.
/// An existing object is returned as stored, even if its spec differs from `object`.
pub async fn create_or_fetch<K>(api: &Api<K>, object: &K, kind: &str) -> Result<K>
where
    K: Clone + Debug + DeserializeOwned + Serialize + Resource,
{
    let name = object.name_any();
    match api.create(&PostParams::default(), object).await {
        Ok(created) => {
            debug!("Created {} '{}'", kind, name);
            Ok(created)
        }
        Err(e) if e.is_already_exists() => {
            debug!("{} '{}' already exists, fetching it", kind, name);
            Ok(api.get(&name).await.context(error::GetSnafu {
                what: format!("{} {}", kind, name),
            })?)
        }
        Err(e) => Err(e)
            .context(error::CreateSnafu {
                what: format!("{} {}", kind, name),
            })
            .map_err(Into::into),
    }
}

/// Patches the status subresource with the merge patch that turns `base` into `modified`. The
/// patch carries the resource version of `base`, so it fails with a conflict if the object was
/// changed in the meantime.
pub(crate) async fn patch_status<K>(api: &Api<K>, kind: &str, base: &K, modified: &K) -> Result<K>
where
    K: Clone + Debug + DeserializeOwned + Serialize + Resource,
{
    let name = base.name_any();
    let base = serde_json::to_value(base).context(error::SerializeSnafu { kind })?;
    let modified = serde_json::to_value(modified).context(error::SerializeSnafu { kind })?;
    let patch = MergePatch::from_base(&base)
        .with_optimistic_lock()
        .diff(&modified);
    trace!("Patching {} '{}' status with {}", kind, name, patch);
    Ok(api
        .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .context(error::PatchStatusSnafu { kind })?)
}
