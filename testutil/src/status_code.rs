pub use http::StatusCode;

/// The `reason` the API server gives when a create collides with an existing object.
pub const REASON_ALREADY_EXISTS: &str = "AlreadyExists";

/// Classifies errors from the API server by HTTP status code and `Status.reason`.
pub trait HttpStatusCode {
    fn status_code(&self) -> Option<StatusCode>;

    /// The machine-readable `reason` from the API server's `Status` response, if any.
    fn reason(&self) -> Option<&str> {
        None
    }

    fn is_status_code(&self, status_code: StatusCode) -> bool {
        self.status_code()
            .map(|some| some == status_code)
            .unwrap_or_default()
    }

    fn is_not_found(&self) -> bool {
        self.is_status_code(StatusCode::NOT_FOUND)
    }

    /// A `409` is also returned for optimistic-concurrency conflicts, so the reason is checked
    /// when the server provides one.
    fn is_already_exists(&self) -> bool {
        self.is_status_code(StatusCode::CONFLICT)
            && self
                .reason()
                .map(|reason| reason.is_empty() || reason == REASON_ALREADY_EXISTS)
                .unwrap_or(true)
    }
}

impl HttpStatusCode for kube::Error {
    fn status_code(&self) -> Option<StatusCode> {
        if let kube::Error::Api(error_response) = self {
            StatusCode::from_u16(error_response.code).ok()
        } else {
            None
        }
    }

    fn reason(&self) -> Option<&str> {
        if let kube::Error::Api(error_response) = self {
            Some(error_response.reason.as_str())
        } else {
            None
        }
    }
}

impl<T, E> HttpStatusCode for std::result::Result<T, E>
where
    E: HttpStatusCode,
{
    fn status_code(&self) -> Option<StatusCode> {
        self.as_ref().err().and_then(|e| e.status_code())
    }

    fn reason(&self) -> Option<&str> {
        self.as_ref().err().and_then(|e| e.reason())
    }
}
