use crate::cluster::{ControlPlane, ExistingCluster, KindCluster};
use crate::error::{self, Result};
use crate::manifests::{fake_crd_sub_dirs, install_crds, read_crd_dir};
use crate::scheme::Scheme;
use crate::test_settings::TestSettings;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, GroupVersionKind};
use kube::{Client, Config};
use log::{error, info};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::path::PathBuf;
use std::time::Duration;

/// Starts a test environment configured from `ENVTEST_` environment variables.
///
/// Every subdirectory of the bundled `fake_crds` directory is installed automatically, followed
/// by the CRDs found in `extra_manifest_dirs`. See [`Environment::start`].
pub async fn start_environment<I, P>(extra_manifest_dirs: I) -> Result<Environment>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let settings = TestSettings::from_env()?;
    Environment::start(&settings, extra_manifest_dirs).await
}

/// A running Kubernetes API server with the bundled CRDs installed, plus a client for it.
///
/// The control plane is stopped by [`Environment::teardown`] or, failing that, when the
/// `Environment` is dropped. Errors while stopping are logged rather than returned so that
/// teardown is always safe to run.
pub struct Environment {
    config: Config,
    client: Client,
    scheme: Scheme,
    control_plane: Option<Box<dyn ControlPlane>>,
}

impl Environment {
    /// Starts a kind cluster, or attaches to the ambient cluster when
    /// `settings.use_existing_cluster` is set.
    pub async fn start<I, P>(settings: &TestSettings, extra_manifest_dirs: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let control_plane: Box<dyn ControlPlane> = if settings.use_existing_cluster {
            Box::new(ExistingCluster::default())
        } else {
            Box::new(KindCluster::new(settings)?)
        };
        Self::start_with(settings, control_plane, extra_manifest_dirs).await
    }

    /// Starts the environment on the given control plane. If the control plane fails to start, or
    /// anything fails after it has started, it is stopped before the error is returned.
    pub async fn start_with<I, P>(
        settings: &TestSettings,
        mut control_plane: Box<dyn ControlPlane>,
        extra_manifest_dirs: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut manifest_dirs = fake_crd_sub_dirs(settings)?;
        manifest_dirs.extend(extra_manifest_dirs.into_iter().map(Into::into));
        let mut crds = Vec::new();
        for dir in &manifest_dirs {
            crds.extend(read_crd_dir(dir)?);
        }

        let kubeconfig = match control_plane.start() {
            Ok(kubeconfig) => kubeconfig,
            Err(e) => {
                stop_control_plane(control_plane.as_mut());
                return Err(e);
            }
        };
        match connect(kubeconfig, &crds, settings.crd_install_timeout()).await {
            Ok((config, client, scheme)) => {
                info!(
                    "environment running at {} with {} CRDs from {} directories",
                    config.cluster_url,
                    crds.len(),
                    manifest_dirs.len()
                );
                Ok(Self {
                    config,
                    client,
                    scheme,
                    control_plane: Some(control_plane),
                })
            }
            Err(e) => {
                stop_control_plane(control_plane.as_mut());
                Err(e)
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a client for the environment. `kube::Client` is cheap to clone.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn api_resource(&self, gvk: &GroupVersionKind) -> Option<&ApiResource> {
        self.scheme.api_resource(gvk)
    }

    /// Stops the control plane. Any error is logged.
    pub fn teardown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(mut control_plane) = self.control_plane.take() {
            stop_control_plane(control_plane.as_mut());
        }
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("cluster_url", &self.config.cluster_url)
            .field("scheme", &self.scheme)
            .field("running", &self.control_plane.is_some())
            .finish()
    }
}

async fn connect(
    kubeconfig: Kubeconfig,
    crds: &[CustomResourceDefinition],
    crd_timeout: Duration,
) -> Result<(Config, Client, Scheme)> {
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .context(error::ClientConfigSnafu)?;
    let client = Client::try_from(config.clone()).context(error::ClientSnafu)?;

    install_crds(&client, crds, crd_timeout).await?;

    let mut scheme = Scheme::new();
    scheme.register_builtin(&client).await?;
    for crd in crds {
        scheme.register_crd(crd);
    }
    Ok((config, client, scheme))
}

fn stop_control_plane(control_plane: &mut dyn ControlPlane) {
    if let Err(e) = control_plane.stop() {
        error!("error stopping environment: {}", e);
    }
}
