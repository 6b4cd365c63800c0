/*!

Provides a disposable Kubernetes API server for integration tests. [`start_environment`] brings
up a control plane (a `kind` cluster by default), installs the CRD manifests bundled in
`fake_crds/` along with any extra manifest directories, registers the built-in kinds, and hands
back an [`Environment`] holding a ready client.

The bundled manifests make third-party custom resources (external-secrets, cert-manager,
MariaDB, Memcached and RabbitMQ) available without any further setup.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub mod cluster;
mod environment;
mod error;
pub mod manifests;
#[cfg(test)]
mod mock;
mod scheme;
mod test_settings;

pub use cluster::{ControlPlane, ExistingCluster, KindCluster};
pub use environment::{start_environment, Environment};
pub use error::{Error, Result};
pub use manifests::{fake_crd_sub_dirs, fake_crds_path, install_crds, read_crd_dir};
pub use scheme::Scheme;
pub use test_settings::{TestSettings, ENV_PREFIX, FAKE_CRDS_DIR};
