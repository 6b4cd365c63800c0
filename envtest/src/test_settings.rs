use crate::error::{self, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;
use std::time::Duration;

/// The prefix shared by every environment variable read into `TestSettings`.
pub const ENV_PREFIX: &str = "ENVTEST_";

/// The directory, relative to this crate, that holds the bundled CRD manifests.
pub const FAKE_CRDS_DIR: &str = "fake_crds";

/// Test settings provide a way to send arguments into the test environment using environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TestSettings {
    /// The path to the [kind] binary. Defaults to `kind` (i.e. by default the kind binary is
    /// expected to be found via `$PATH`).
    ///
    /// # Example
    ///
    /// ```text
    /// ENVTEST_KIND_PATH=/wherever/kind
    /// ```
    ///
    /// [kind]: https://kind.sigs.k8s.io/
    #[serde(default = "kind")]
    pub kind_path: String,

    /// The name given to the kind cluster. A stale cluster with this name is deleted before
    /// the environment starts.
    #[serde(default = "cluster_name")]
    pub cluster_name: String,

    /// The node image passed to `kind create cluster --image`, used to pin a Kubernetes version.
    #[serde(default)]
    pub node_image: Option<String>,

    /// Overrides the bundled manifest root. By default the `fake_crds` directory next to this
    /// crate's `Cargo.toml` is used, which does not depend on the working directory.
    #[serde(default)]
    pub manifest_root: Option<PathBuf>,

    /// Attach to the cluster in the ambient kubeconfig instead of creating a kind cluster.
    #[serde(default)]
    pub use_existing_cluster: bool,

    /// How long to wait for each installed CRD to become established.
    #[serde(default = "crd_install_timeout_secs")]
    pub crd_install_timeout_secs: u64,
}

impl TestSettings {
    /// Reads the settings from `ENVTEST_`-prefixed environment variables.
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context(error::SettingsSnafu)
    }

    /// Reads the settings from an explicit set of `ENVTEST_`-prefixed variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)
            .context(error::SettingsSnafu)
    }

    pub fn manifest_root(&self) -> PathBuf {
        self.manifest_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(FAKE_CRDS_DIR))
    }

    pub fn crd_install_timeout(&self) -> Duration {
        Duration::from_secs(self.crd_install_timeout_secs)
    }
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            kind_path: kind(),
            cluster_name: cluster_name(),
            node_image: None,
            manifest_root: None,
            use_existing_cluster: false,
            crd_install_timeout_secs: crd_install_timeout_secs(),
        }
    }
}

/// We need these to provide defaults for serde.
fn kind() -> String {
    String::from("kind")
}

fn cluster_name() -> String {
    String::from("envtest")
}

fn crd_install_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod test {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = TestSettings::from_vars(vars(&[("UNRELATED", "1")])).unwrap();
        assert_eq!(settings.kind_path, "kind");
        assert_eq!(settings.cluster_name, "envtest");
        assert!(settings.node_image.is_none());
        assert!(!settings.use_existing_cluster);
        assert_eq!(settings.crd_install_timeout(), Duration::from_secs(60));
        assert!(settings.manifest_root().ends_with(FAKE_CRDS_DIR));
    }

    #[test]
    fn prefixed_overrides() {
        let settings = TestSettings::from_vars(vars(&[
            ("ENVTEST_KIND_PATH", "/opt/bin/kind"),
            ("ENVTEST_CLUSTER_NAME", "forge-it"),
            ("ENVTEST_MANIFEST_ROOT", "/tmp/crds"),
            ("ENVTEST_USE_EXISTING_CLUSTER", "true"),
            ("ENVTEST_CRD_INSTALL_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.kind_path, "/opt/bin/kind");
        assert_eq!(settings.cluster_name, "forge-it");
        assert_eq!(settings.manifest_root(), PathBuf::from("/tmp/crds"));
        assert!(settings.use_existing_cluster);
        assert_eq!(settings.crd_install_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn bad_value_is_an_error() {
        let result = TestSettings::from_vars(vars(&[("ENVTEST_USE_EXISTING_CLUSTER", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn default_matches_empty_environment() {
        let from_vars = TestSettings::from_vars(Vec::new()).unwrap();
        let default = TestSettings::default();
        assert_eq!(from_vars.kind_path, default.kind_path);
        assert_eq!(from_vars.cluster_name, default.cluster_name);
        assert_eq!(
            from_vars.crd_install_timeout_secs,
            default.crd_install_timeout_secs
        );
    }
}
