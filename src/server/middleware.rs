use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::error::AppError;

/// Legacy header carrying the raw token
const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// JWT authentication middleware.
///
/// Accepts `Authorization: Bearer <token>` or `x-auth-token: <token>`. On
/// success the decoded `Claims` are stored in the request extensions. When no
/// secret is configured every request passes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(validator) = &state.jwt_validator else {
        return Ok(next.run(req).await);
    };

    let token = extract_bearer_token(&req).or_else(|| {
        req.headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
    });

    let Some(token) = token else {
        return Err(AppError::Auth("Access denied. No token provided.".to_string()));
    };

    let claims = validator.validate(token)?;
    tracing::debug!(user_id = claims.user_id, "Request authenticated");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi"));

        let req = Request::builder()
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&req), None);
    }
}
