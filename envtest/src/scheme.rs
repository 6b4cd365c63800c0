use crate::error::{self, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{discovery, Api, Client};
use log::trace;
use snafu::ResultExt;
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    /// The built-in kinds registered in every environment. Add entries here when tests need
    /// more built-in kinds.
    static ref BUILTIN_KINDS: Vec<GroupVersionKind> = vec![
        GroupVersionKind::gvk("", "v1", "Namespace"),
        GroupVersionKind::gvk("", "v1", "Secret"),
        GroupVersionKind::gvk("", "v1", "ConfigMap"),
        GroupVersionKind::gvk("", "v1", "Service"),
        GroupVersionKind::gvk("", "v1", "ServiceAccount"),
        GroupVersionKind::gvk("", "v1", "Pod"),
        GroupVersionKind::gvk("apps", "v1", "Deployment"),
        GroupVersionKind::gvk("apps", "v1", "StatefulSet"),
        GroupVersionKind::gvk("batch", "v1", "Job"),
        GroupVersionKind::gvk("batch", "v1", "CronJob"),
    ];
}

/// The kinds known to an environment, resolved to the `ApiResource` needed to build a dynamic
/// `Api` for each of them.
#[derive(Debug, Clone, Default)]
pub struct Scheme {
    resources: BTreeMap<String, ApiResource>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in kinds that `register_builtin` resolves.
    pub fn builtin_kinds() -> &'static [GroupVersionKind] {
        BUILTIN_KINDS.as_slice()
    }

    /// Resolves every built-in kind against the API server's discovery endpoints.
    pub async fn register_builtin(&mut self, client: &Client) -> Result<()> {
        for gvk in BUILTIN_KINDS.iter() {
            self.register(client, gvk).await?;
        }
        Ok(())
    }

    /// Resolves `gvk` through discovery and adds it to the scheme.
    pub async fn register(&mut self, client: &Client, gvk: &GroupVersionKind) -> Result<()> {
        let (resource, _capabilities) = discovery::pinned_kind(client, gvk)
            .await
            .context(error::SchemeRegistrationSnafu { kind: key(gvk) })?;
        trace!("registered {}", key(gvk));
        self.resources.insert(key(gvk), resource);
        Ok(())
    }

    /// Adds every served version of the CRD's kind to the scheme.
    pub fn register_crd(&mut self, crd: &CustomResourceDefinition) {
        let spec = &crd.spec;
        for version in spec.versions.iter().filter(|v| v.served) {
            let gvk = GroupVersionKind::gvk(&spec.group, &version.name, &spec.names.kind);
            let resource = ApiResource::from_gvk_with_plural(&gvk, &spec.names.plural);
            self.resources.insert(key(&gvk), resource);
        }
    }

    pub fn api_resource(&self, gvk: &GroupVersionKind) -> Option<&ApiResource> {
        self.resources.get(&key(gvk))
    }

    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.resources.contains_key(&key(gvk))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Creates a namespaced dynamic `Api` for a registered kind.
    pub fn dynamic_api(
        &self,
        client: Client,
        gvk: &GroupVersionKind,
        namespace: &str,
    ) -> Option<Api<DynamicObject>> {
        self.api_resource(gvk)
            .map(|resource| Api::namespaced_with(client, namespace, resource))
    }
}

fn key(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}
