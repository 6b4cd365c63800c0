use kube::core::{ApiResource, GroupVersionKind};

/// A custom kind whose controller does not run in the test environment. Each one has a matching
/// CRD in the bundled `envtest` manifests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl CustomKind {
    pub const MARIADB: CustomKind = CustomKind {
        group: "k8s.mariadb.com",
        version: "v1alpha1",
        kind: "MariaDB",
        plural: "mariadbs",
    };

    pub const MEMCACHED: CustomKind = CustomKind {
        group: "opsv1.memcached.com",
        version: "v1alpha1",
        kind: "Memcached",
        plural: "memcacheds",
    };

    pub const EXTERNAL_SECRET: CustomKind = CustomKind {
        group: "external-secrets.io",
        version: "v1beta1",
        kind: "ExternalSecret",
        plural: "externalsecrets",
    };

    pub const CERTIFICATE: CustomKind = CustomKind {
        group: "cert-manager.io",
        version: "v1",
        kind: "Certificate",
        plural: "certificates",
    };

    pub const RABBITMQ_CLUSTER: CustomKind = CustomKind {
        group: "rabbitmq.com",
        version: "v1beta1",
        kind: "RabbitmqCluster",
        plural: "rabbitmqclusters",
    };

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group, self.version, self.kind)
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.gvk(), self.plural)
    }
}
