use snafu::Snafu;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for `envtest`
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to build a client for the environment: {}", source))]
    Client { source: kube::Error },

    #[snafu(display("Unable to create client config from kubeconfig: {}", source))]
    ClientConfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("CRD '{}' was not established within {:?}", name, timeout))]
    CrdNotEstablished { name: String, timeout: Duration },

    #[snafu(display("Unable to {} CRD '{}': {}", action, name, source))]
    InstallCrd {
        action: String,
        name: String,
        source: kube::Error,
    },

    #[snafu(display(
        "'{} {}' failed with exit status '{}'\n\n{}\n\n{}",
        program,
        args,
        code,
        stdout,
        stderr
    ))]
    KindCommand {
        program: String,
        args: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[snafu(display("Unable to run '{} {}': {}", program, args, source))]
    KindSpawn {
        program: String,
        args: String,
        source: std::io::Error,
    },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    KubeconfigRead {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to read manifest directory '{}': {}", path.display(), source))]
    ManifestDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to read manifest '{}': {}", path.display(), source))]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse manifest '{}': {}", path.display(), source))]
    ManifestParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Non utf-8 path '{}'", path.display()))]
    NonUtf8Path { path: PathBuf },

    #[snafu(display("Failed to register {} in the scheme: {}", kind, source))]
    SchemeRegistration { kind: String, source: kube::Error },

    #[snafu(display("Error parsing ENVTEST_ environment variables: {}", source))]
    Settings { source: envy::Error },

    #[snafu(display("Unable to create a temporary directory: {}", source))]
    TempDir { source: std::io::Error },
}
