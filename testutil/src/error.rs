use crate::status_code::{HttpStatusCode, StatusCode};
use snafu::Snafu;

/// The `Result` type returned by `testutil`.
pub type Result<T> = std::result::Result<T, Error>;

/// The public error type returned by `testutil`. The HTTP classification of the underlying API
/// error stays available through [`HttpStatusCode`].
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

/// The private error type returned by `testutil`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum InnerError {
    #[snafu(display("creating {}: {}", what, source))]
    Create { what: String, source: kube::Error },

    #[snafu(display("getting {}: {}", what, source))]
    Get { what: String, source: kube::Error },

    #[snafu(display("patching {} status: {}", kind, source))]
    PatchStatus { kind: String, source: kube::Error },

    #[snafu(display("reading {} {}: {}", kind, field, source))]
    ReadField {
        kind: String,
        field: String,
        source: crate::unstructured::Error,
    },

    #[snafu(display("setting {} {}: {}", kind, field, source))]
    SetField {
        kind: String,
        field: String,
        source: crate::unstructured::Error,
    },

    #[snafu(display("serializing {}: {}", kind, source))]
    Serialize {
        kind: String,
        source: serde_json::Error,
    },

    #[snafu(display("updating {}: {}", what, source))]
    Update { what: String, source: kube::Error },
}

impl HttpStatusCode for InnerError {
    fn status_code(&self) -> Option<StatusCode> {
        self.kube_error().and_then(|e| e.status_code())
    }

    fn reason(&self) -> Option<&str> {
        self.kube_error().and_then(|e| e.reason())
    }
}

impl InnerError {
    fn kube_error(&self) -> Option<&kube::Error> {
        match self {
            InnerError::Create { source, .. }
            | InnerError::Get { source, .. }
            | InnerError::PatchStatus { source, .. }
            | InnerError::Update { source, .. } => Some(source),
            InnerError::ReadField { .. }
            | InnerError::SetField { .. }
            | InnerError::Serialize { .. } => None,
        }
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        self.0.status_code()
    }

    fn reason(&self) -> Option<&str> {
        self.0.reason()
    }
}
