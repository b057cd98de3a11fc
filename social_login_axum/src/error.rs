use http::StatusCode;
use social_login::CoordinationError;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Infrastructure errors never leak internals to the browser: unknown
/// providers are a 404, everything else is a generic 500.
impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| match e {
            CoordinationError::UnknownProvider(_) => {
                (StatusCode::NOT_FOUND, "Unknown provider".to_string())
            }
            other => {
                tracing::error!("Login flow failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        })
    }
}
