//! Error types for Warden

use hyper::StatusCode;

/// Main error type for Warden operations
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WardenError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        let status = self.status_code();
        let body = self.to_string();
        (status, body)
    }
}

impl From<std::io::Error> for WardenError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Authentication and authorization failures.
///
/// The variants record the precise cause for logging; the outward HTTP
/// signal collapses everything except `InsufficientRole` into a single
/// generic unauthorized response so that callers cannot distinguish a
/// bad username from a bad password or a stale token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username, wrong password, or a non-active account
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing token, structurally invalid token, or signature mismatch
    #[error("malformed or missing token")]
    MalformedToken,

    /// Token past its expiry
    #[error("expired token")]
    ExpiredToken,

    /// Valid identity, but the operation requires a role it does not hold
    #[error("insufficient role")]
    InsufficientRole,
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientRole => WardenError::Forbidden("insufficient role".into()),
            // Same outward error for every unauthorized cause
            AuthError::InvalidCredentials
            | AuthError::MalformedToken
            | AuthError::ExpiredToken => WardenError::Unauthorized,
        }
    }
}

/// Result type alias for Warden operations
pub type Result<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WardenError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WardenError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WardenError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WardenError::Database("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_unauthorized_causes_collapse() {
        // Bad credentials, bad tokens and expired tokens must be
        // indistinguishable to the caller.
        let a: WardenError = AuthError::InvalidCredentials.into();
        let b: WardenError = AuthError::MalformedToken.into();
        let c: WardenError = AuthError::ExpiredToken.into();

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(b.to_string(), c.to_string());
        assert_eq!(a.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(b.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(c.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_insufficient_role_is_distinct() {
        let forbidden: WardenError = AuthError::InsufficientRole.into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let unauthorized: WardenError = AuthError::MalformedToken.into();
        assert_ne!(forbidden.status_code(), unauthorized.status_code());
    }
}
