use crate::error::{self, Result};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::ByteString;
use kube::api::PostParams;
use kube::{Api, Client};
use log::debug;
use snafu::ResultExt;
use std::collections::BTreeMap;

/// Builds [`Secret`] objects. Every call to [`SecretBuilder::build`] returns an independent copy,
/// so one builder can stamp out several variations.
#[derive(Clone, Debug, Default)]
pub struct SecretBuilder {
    secret: Secret,
}

impl SecretBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.secret.metadata.name = Some(name.into());
        self
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.secret.metadata.namespace = Some(namespace.into());
        self
    }

    pub fn with_data(mut self, data: BTreeMap<String, Vec<u8>>) -> Self {
        self.secret.data = Some(
            data.into_iter()
                .map(|(key, value)| (key, ByteString(value)))
                .collect(),
        );
        self
    }

    pub fn with_string_data(mut self, string_data: BTreeMap<String, String>) -> Self {
        self.secret.string_data = Some(string_data);
        self
    }

    /// Merges `labels` into the labels already set. Later values win.
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.secret
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .extend(labels);
        self
    }

    /// Appends an owner reference.
    pub fn with_owner_ref(mut self, owner_ref: OwnerReference) -> Self {
        self.secret
            .metadata
            .owner_references
            .get_or_insert_with(Vec::new)
            .push(owner_ref);
        self
    }

    pub fn build(&self) -> Secret {
        self.secret.clone()
    }

    /// Creates the secret in its namespace, or in the client's default namespace if none was
    /// set, and returns the object the API server stored.
    pub async fn create(&self, client: &Client) -> Result<Secret> {
        let secret = self.build();
        let namespace = secret
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| client.default_namespace().to_string());
        let name = name_of(&secret.metadata);
        debug!("Creating secret '{}/{}'", namespace, name);
        let api: Api<Secret> = Api::namespaced(client.clone(), &namespace);
        Ok(api
            .create(&PostParams::default(), &secret)
            .await
            .context(error::CreateSnafu {
                what: format!("Secret {}/{}", namespace, name),
            })?)
    }
}

fn name_of(metadata: &ObjectMeta) -> &str {
    metadata
        .name
        .as_deref()
        .or(metadata.generate_name.as_deref())
        .unwrap_or_default()
}
