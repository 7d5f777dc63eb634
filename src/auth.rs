use crate::{error::AppError, handlers::AppState};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::Response,
};

/// Entitlement middleware
/// Extracts the Bearer credential, verifies it and attaches the decoded
/// claims to the request for the paid-tier handlers.
pub async fn entitlement_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Only POST consumes an entitlement; the method router answers the rest
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized("Missing or invalid authorization token"))?;

    let token = extract_bearer_token(auth_header)?;

    let claims = state
        .signer
        .verify(token)
        .ok_or(AppError::Unauthorized("Invalid or expired token"))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    const BEARER_PREFIX: &str = "Bearer ";

    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AppError::Unauthorized("Missing or invalid authorization token"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing or invalid authorization token"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        estimator::EstimateInput,
        payment::PaymentGate,
        token::{Entitlement, EntitlementClaims, EntitlementSigner},
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::post,
        Extension, Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "auth-test-secret-0123456789abcdef0123";

    #[test]
    fn test_extract_bearer_token_success() {
        let token = extract_bearer_token("Bearer eyJhbGciOi.abc.def").unwrap();
        assert_eq!(token, "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_extract_bearer_token_missing_prefix() {
        assert!(extract_bearer_token("eyJhbGciOi.abc.def").is_err());
        assert!(extract_bearer_token("Basic dXNlcjpwYXNz").is_err());
    }

    #[test]
    fn test_extract_bearer_token_empty() {
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("Bearer    ").is_err());
    }

    fn test_app() -> (Router, Arc<EntitlementSigner>) {
        let signer = Arc::new(EntitlementSigner::new(SECRET));
        let state = AppState {
            signer: signer.clone(),
            payments: Arc::new(PaymentGate::new(None, false)),
        };

        let app = Router::new()
            .route(
                "/test",
                post(|Extension(claims): Extension<EntitlementClaims>| async move {
                    claims.purchase_id
                }),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                entitlement_middleware,
            ))
            .with_state(state);

        (app, signer)
    }

    fn issue(signer: &EntitlementSigner) -> String {
        let input = EstimateInput::parse(1200.0, "basic", "low", "g1").unwrap();
        signer
            .issue(&Entitlement {
                purchase_id: "sale-auth".to_string(),
                cost: input.cost(),
                input,
                timestamp: 0,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_middleware_valid_credential() {
        let (app, signer) = test_app();
        let token = issue(&signer);

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_missing_header() {
        let (app, _) = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_middleware_foreign_credential() {
        let (app, _) = test_app();
        let foreign = EntitlementSigner::new("some-other-secret-entirely-0000000");
        let token = issue(&foreign);

        let request = Request::builder()
            .method("POST")
            .uri("/test")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
