use crate::error::{self, Result};
use crate::test_settings::TestSettings;
use kube::config::Kubeconfig;
use log::{debug, error, info};
use snafu::{ensure, OptionExt, ResultExt};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

pub const KUBECONFIG_FILENAME: &str = "kubeconfig.yaml";

/// Something that can bring up a Kubernetes API server for the duration of a test and tear it
/// down again.
pub trait ControlPlane: Send {
    /// Start the control plane and return a kubeconfig that reaches it.
    fn start(&mut self) -> Result<Kubeconfig>;

    /// Stop the control plane. Calling `stop` on a control plane that is not running is a no-op.
    fn stop(&mut self) -> Result<()>;
}

/// A control plane backed by a `kind` cluster. The kubeconfig is written into a `TempDir` that
/// lives as long as the `KindCluster`.
#[derive(Debug)]
pub struct KindCluster {
    name: String,
    kind_path: String,
    node_image: Option<String>,
    kubeconfig_dir: TempDir,
    running: bool,
}

impl KindCluster {
    pub fn new(settings: &TestSettings) -> Result<Self> {
        Ok(Self {
            name: settings.cluster_name.clone(),
            kind_path: settings.kind_path.clone(),
            node_image: settings.node_image.clone(),
            kubeconfig_dir: TempDir::new().context(error::TempDirSnafu)?,
            running: false,
        })
    }

    /// Returns the path to the kubeconfig file in the `TempDir` created for the cluster.
    pub fn kubeconfig(&self) -> PathBuf {
        self.kubeconfig_dir.path().join(KUBECONFIG_FILENAME)
    }

    fn create_args(&self) -> Result<Vec<String>> {
        let kubeconfig = self.kubeconfig();
        let kubeconfig = kubeconfig
            .to_str()
            .context(error::NonUtf8PathSnafu { path: &kubeconfig })?;
        let mut args = vec![
            "--kubeconfig".to_string(),
            kubeconfig.to_string(),
            "create".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        if let Some(image) = &self.node_image {
            args.push("--image".to_string());
            args.push(image.clone());
        }
        Ok(args)
    }

    fn delete_args(&self) -> Vec<String> {
        vec![
            "delete".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ]
    }

    fn run_kind(&self, args: &[String]) -> Result<()> {
        debug!("running '{} {}'", self.kind_path, args.join(" "));
        let output =
            Command::new(&self.kind_path)
                .args(args)
                .output()
                .context(error::KindSpawnSnafu {
                    program: &self.kind_path,
                    args: args.join(" "),
                })?;
        ensure!(
            output.status.success(),
            error::KindCommandSnafu {
                program: &self.kind_path,
                args: args.join(" "),
                code: output.status.code().unwrap_or(1),
                stdout: String::from_utf8_lossy(&output.stdout),
                stderr: String::from_utf8_lossy(&output.stderr),
            }
        );
        Ok(())
    }
}

impl ControlPlane for KindCluster {
    /// Creates the kind cluster. If a cluster with the same name already exists, it is deleted
    /// first.
    fn start(&mut self) -> Result<Kubeconfig> {
        self.run_kind(&self.delete_args())?;
        info!("creating kind cluster '{}'", self.name);
        self.run_kind(&self.create_args()?)?;
        self.running = true;
        match Kubeconfig::read_from(self.kubeconfig()).context(error::KubeconfigReadSnafu) {
            Ok(kubeconfig) => Ok(kubeconfig),
            Err(e) => {
                // The cluster was already created.
                if let Err(stop_error) = self.stop() {
                    error!(
                        "unable to delete kind cluster '{}': {}",
                        self.name, stop_error
                    );
                }
                Err(e)
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        info!("deleting kind cluster '{}'", self.name);
        self.run_kind(&self.delete_args())?;
        self.running = false;
        Ok(())
    }
}

impl Drop for KindCluster {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("unable to delete kind cluster '{}': {}", self.name, e)
        }
    }
}

/// A control plane that attaches to whatever cluster the ambient kubeconfig points at. It is
/// never created or deleted by the environment.
#[derive(Debug, Default)]
pub struct ExistingCluster {}

impl ControlPlane for ExistingCluster {
    fn start(&mut self) -> Result<Kubeconfig> {
        info!("using the existing cluster from the ambient kubeconfig");
        Kubeconfig::read().context(error::KubeconfigReadSnafu)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}
