//! Request authorization pipeline
//!
//! One explicit stage sits between the raw request and every protected
//! handler: resolve the bearer token, validate it, check the operation's
//! required roles, and hand the handler a [`CallerContext`] describing the
//! effective caller. Each step short-circuits, so a denied request never
//! reaches handler code.

use crate::auth::jwt::JwtValidator;
use crate::auth::roles::{self, Role};
use crate::types::AuthError;

/// The effective caller, resolved from a validated token.
///
/// Made available to handlers after authorization succeeds. Carries no
/// secret material.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub id: String,
    pub username: String,
    pub roles: Vec<Role>,
}

/// Extract the token from an `Authorization` header.
///
/// Accepts exactly `Bearer <token>`; anything else (missing header, other
/// schemes, empty or whitespace-bearing token) counts as no token at all.
pub fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Authorize a request against an operation's required role set.
///
/// `required` is "any of": a single held role from the set is enough, and
/// an empty set admits any authenticated caller. Token problems surface
/// before role checks, so an unauthenticated request is never reported as
/// a role failure.
pub fn authorize(
    jwt: &JwtValidator,
    auth_header: Option<&str>,
    required: &[Role],
) -> Result<CallerContext, AuthError> {
    let token = extract_bearer(auth_header).ok_or(AuthError::MalformedToken)?;

    let claims = jwt.validate(token)?;

    if !roles::is_allowed(required, &claims.roles) {
        return Err(AuthError::InsufficientRole);
    }

    Ok(CallerContext {
        id: claims.sub,
        username: claims.username,
        roles: claims.roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Identity, IdentityStatus};

    fn test_jwt() -> JwtValidator {
        JwtValidator::new("test-secret-that-is-at-least-32-characters-long", 3600).unwrap()
    }

    fn token_with_roles(jwt: &JwtValidator, roles: Vec<Role>) -> String {
        jwt.issue(&Identity {
            id: "64b0c8f2a3d4e5f60718293a".into(),
            username: "alice".into(),
            roles,
            status: IdentityStatus::Active,
            password_hash: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn test_extract_bearer_is_strict() {
        assert_eq!(extract_bearer(Some("Bearer abc123")), Some("abc123"));

        // Everything else counts as absent
        assert_eq!(extract_bearer(None), None);
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Bearer a b")), None);
        assert_eq!(extract_bearer(Some("Basic abc123")), None);
        assert_eq!(extract_bearer(Some("abc123")), None);
        assert_eq!(extract_bearer(Some("bearer abc123")), None);
    }

    #[test]
    fn test_missing_token_short_circuits() {
        let jwt = test_jwt();
        let err = authorize(&jwt, None, &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthError::MalformedToken);

        let err = authorize(&jwt, Some("invalid-format"), &[]).unwrap_err();
        assert_eq!(err, AuthError::MalformedToken);
    }

    #[test]
    fn test_empty_requirement_admits_any_authenticated_caller() {
        let jwt = test_jwt();
        let token = token_with_roles(&jwt, vec![Role::User]);

        let ctx = authorize(&jwt, Some(&format!("Bearer {}", token)), &[]).unwrap();
        assert_eq!(ctx.username, "alice");
        assert_eq!(ctx.roles, vec![Role::User]);
    }

    #[test]
    fn test_role_mismatch_is_forbidden_not_unauthorized() {
        let jwt = test_jwt();
        let token = token_with_roles(&jwt, vec![Role::User]);
        let header = format!("Bearer {}", token);

        let err = authorize(&jwt, Some(&header), &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthError::InsufficientRole);

        // Distinct from the unauthenticated outcome
        let unauth = authorize(&jwt, Some("invalid-format"), &[Role::Admin]).unwrap_err();
        assert_ne!(err, unauth);
    }

    #[test]
    fn test_matching_role_is_allowed() {
        let jwt = test_jwt();
        let token = token_with_roles(&jwt, vec![Role::User, Role::Admin]);
        let header = format!("Bearer {}", token);

        let ctx = authorize(&jwt, Some(&header), &[Role::Admin]).unwrap();
        assert_eq!(ctx.id, "64b0c8f2a3d4e5f60718293a");
        assert!(ctx.roles.contains(&Role::Admin));
    }

    #[test]
    fn test_tampered_token_is_unauthorized() {
        let jwt = test_jwt();
        let token = token_with_roles(&jwt, vec![Role::Admin]);
        let tampered = format!("Bearer {}x", token);

        let err = authorize(&jwt, Some(&tampered), &[Role::Admin]).unwrap_err();
        assert_eq!(err, AuthError::MalformedToken);
    }
}
