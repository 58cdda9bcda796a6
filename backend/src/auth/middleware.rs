//! Authentication middleware
//!
//! [`require_auth`] is installed with `route_layer` on protected routes. It
//! validates the bearer token and attaches the verified [`AuthUser`] to the
//! request extensions; handlers receive it through the [`AuthUser`]
//! extractor.
//!
//! Every rejection is the same opaque 401. Why a token failed only
//! reaches the debug log.

use crate::auth::jwt::{Identity, TokenService};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

const BEARER_SCHEME: &str = "Bearer";

/// Message returned for every authentication failure
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication required";

/// Verified identity of the caller, scoped to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.username,
        }
    }
}

/// Reads the identity attached by [`require_auth`]
///
/// Fails closed: a handler reached without the gate sees 401.
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// The header must be exactly two space-separated parts with a `Bearer`
/// scheme (case-insensitive) and a non-empty token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return None;
    }

    Some(token)
}

/// Middleware that rejects requests without a valid bearer token
///
/// ```ignore
/// Router::new()
///     .route("/items", get(list_items))
///     .route_layer(middleware::from_fn_with_state(tokens, require_auth))
/// ```
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = {
        let token = extract_bearer_token(request.headers()).ok_or_else(|| {
            debug!(path = %request.uri().path(), "Missing or malformed authorization header");
            ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
        })?;

        tokens.validate(token).map_err(|e| {
            debug!(path = %request.uri().path(), reason = %e, "Rejected identity token");
            ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
        })?
    };

    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::SigningKey;
    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn test_tokens() -> TokenService {
        TokenService::new(SigningKey::from_secret("gate-test-secret"))
    }

    /// Protected router whose handler counts invocations and echoes the caller
    fn protected_app(tokens: TokenService, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |user: AuthUser| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        format!("{}:{}", user.user_id, user.username)
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(tokens, require_auth))
    }

    async fn send(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/protected").method("GET");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("bearer token", Some("token"))]
    #[case("Bearer", None)]
    #[case("Bearer ", None)]
    #[case("Bearer x y", None)]
    #[case("Bearer  token", None)]
    #[case("Basic dXNlcjpwYXNz", None)]
    #[case("token", None)]
    #[case("", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        let headers = headers_with(header);
        assert_eq!(extract_bearer_token(&headers), expected);
    }

    #[test]
    fn test_extract_without_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer"))]
    #[case(Some("Bearer x y"))]
    #[case(Some("Bearer badtoken"))]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[tokio::test]
    async fn test_rejected_requests_never_reach_handler(#[case] authorization: Option<&str>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = protected_app(test_tokens(), calls.clone());

        let (status, body) = send(app, authorization).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(UNAUTHORIZED_MESSAGE));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejection_body_is_opaque() {
        let tokens = test_tokens();
        let expired = tokens
            .issue_at(
                &Identity::new(7, "alice"),
                Utc::now() - Duration::hours(25),
            )
            .unwrap();
        let foreign = TokenService::new(SigningKey::from_secret("other"))
            .issue(&Identity::new(7, "alice"))
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let (_, expired_body) = send(
            protected_app(tokens.clone(), calls.clone()),
            Some(&format!("Bearer {}", expired)),
        )
        .await;
        let (_, foreign_body) = send(
            protected_app(tokens, calls.clone()),
            Some(&format!("Bearer {}", foreign)),
        )
        .await;

        assert_eq!(expired_body, foreign_body);
        assert!(!expired_body.to_lowercase().contains("expired"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let tokens = test_tokens();
        let token = tokens.issue(&Identity::new(7, "alice")).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = protected_app(tokens, calls.clone());

        let (status, body) = send(app, Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7:alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extractor_fails_closed_without_gate() {
        let app = Router::new().route("/protected", get(|_user: AuthUser| async { "reached" }));

        let (status, _) = send(app, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
