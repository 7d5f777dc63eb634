use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    estimator::EstimateError,
    payment::PaymentError,
    token::TokenError,
};

/// Application error types
///
/// The `Display` output may carry internal detail and is only logged. The
/// response body uses [`AppError::public_message`].
#[derive(Debug, Error)]
pub enum AppError {
    /// A field of the estimate input failed validation
    #[error("Invalid {0}")]
    InvalidInput(&'static str),
    /// Request body absent, malformed or incomplete
    #[error("Missing required fields")]
    MissingFields,
    /// Missing, invalid or expired entitlement credential
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),
    /// Provider rejected the purchase (unknown, refunded, disputed)
    #[error("Payment not valid: {0}")]
    PaymentNotValid(&'static str),
    /// Provider unreachable or timed out
    #[error("Payment verification unavailable: {0}")]
    PaymentVerificationUnavailable(String),
    /// Real payments expected but the server cannot verify them
    #[error("Server misconfigured: {0}")]
    ServerMisconfigured(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not found")]
    NotFound,
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::MissingFields | Self::PaymentNotValid(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PaymentVerificationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerMisconfigured(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Stable message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(field) => format!("Invalid {}", field),
            Self::MissingFields => "Missing required fields".to_string(),
            Self::Unauthorized(msg) | Self::PaymentNotValid(msg) => msg.to_string(),
            Self::PaymentVerificationUnavailable(_) => {
                "Payment verification unavailable".to_string()
            }
            Self::ServerMisconfigured(_) => "Payment verification not configured".to_string(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            Self::NotFound => "Not found".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::MissingFields => "missing_fields",
            Self::Unauthorized(_) => "unauthorized",
            Self::PaymentNotValid(_) => "payment_not_valid",
            Self::PaymentVerificationUnavailable(_) => "payment_verification_unavailable",
            Self::ServerMisconfigured(_) => "server_misconfigured",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::NotFound => "not_found",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, error_type = self.error_type(), "Request failed");
        } else {
            tracing::debug!(error = %self, error_type = self.error_type(), "Request rejected");
        }

        let body = Json(json!({
            "error": self.public_message(),
            "type": self.error_type(),
        }));

        (status, body).into_response()
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::InvalidInput { field } => Self::InvalidInput(field),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rejected(status) => Self::PaymentNotValid(status.message()),
            PaymentError::Unavailable(detail) => Self::PaymentVerificationUnavailable(detail),
            PaymentError::NotConfigured => {
                Self::ServerMisconfigured("no payment provider access token".to_string())
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => Self::InternalError(err.to_string()),
            TokenError::Rejected(_) | TokenError::Unverified => {
                Self::Unauthorized("Invalid or expired token")
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::SaleStatus;

    #[test]
    fn test_error_display() {
        let error = AppError::InvalidInput("area");
        assert_eq!(error.to_string(), "Invalid area");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(AppError::Unauthorized("x").error_type(), "unauthorized");
        assert_eq!(AppError::MissingFields.error_type(), "missing_fields");
    }

    #[test]
    fn test_internal_detail_not_public() {
        let error = AppError::PaymentVerificationUnavailable(
            "error sending request for url (https://api.gumroad.com/v2/sales/abc)".to_string(),
        );
        assert!(!error.public_message().contains("gumroad"));

        let error = AppError::InternalError("signing key exploded".to_string());
        assert_eq!(error.public_message(), "Internal server error");
    }

    #[test]
    fn test_payment_error_mapping() {
        let refunded: AppError = PaymentError::Rejected(SaleStatus::Refunded).into();
        assert_eq!(refunded.status(), StatusCode::BAD_REQUEST);
        assert_eq!(refunded.public_message(), "Payment was refunded or disputed");

        let down: AppError = PaymentError::Unavailable("timeout".to_string()).into();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

        let unconfigured: AppError = PaymentError::NotConfigured.into();
        assert_eq!(unconfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response() {
        let error = AppError::Unauthorized("Invalid or expired token");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid or expired token");
        assert_eq!(body["type"], "unauthorized");
    }
}
