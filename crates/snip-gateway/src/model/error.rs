use serde::Serialize;

/// Body of every non-2xx JSON response.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Canonical reason phrase of the status code, e.g. `Not Found`.
    pub error: &'static str,
    pub message: String,
}
