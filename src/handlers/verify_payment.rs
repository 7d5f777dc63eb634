use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    error::AppError,
    handlers::{non_blank, AppState, EstimateFields},
    logging::Masked,
    metrics,
    payment::Authorization,
    token::Entitlement,
};

const ENDPOINT: &str = "/api/verify-payment";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "purchaseId")]
    pub purchase_id: Option<String>,
    #[serde(flatten)]
    pub fields: EstimateFields,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

/// Handle /api/verify-payment
///
/// Verifies the purchase with the payment provider, recomputes the cost from
/// the submitted inputs and returns a signed entitlement credential.
pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let start = Instant::now();
    metrics::record_request(ENDPOINT);

    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable verify-payment body");
        AppError::MissingFields
    })?;

    let purchase_id = non_blank(request.purchase_id).ok_or(AppError::MissingFields)?;
    let input = request.fields.into_input()?;

    let authorization = match state.payments.authorize(&purchase_id).await {
        Ok(authorization) => authorization,
        Err(e) => {
            metrics::record_payment_verification(e.outcome());
            tracing::warn!(
                purchase_id = %Masked::new(&purchase_id),
                outcome = e.outcome(),
                error = %e,
                "Payment verification failed"
            );
            metrics::record_duration(ENDPOINT, start.elapsed());
            return Err(e.into());
        }
    };

    metrics::record_payment_verification(match authorization {
        Authorization::Verified => "verified",
        Authorization::DevBypass => "dev_bypass",
    });

    // Paid figures come only from the server-side estimator
    let cost = input.cost();

    tracing::info!(
        purchase_id = %Masked::new(&purchase_id),
        authorization = ?authorization,
        area = input.area,
        specification = %input.specification,
        min_cost = cost.min_cost,
        max_cost = cost.max_cost,
        "Payment verified, issuing entitlement"
    );

    let token = state.signer.issue(&Entitlement {
        purchase_id,
        input,
        cost,
        timestamp: Utc::now().timestamp_millis(),
    })?;

    metrics::record_duration(ENDPOINT, start.elapsed());

    Ok(Json(VerifyPaymentResponse {
        success: true,
        token,
        message: "Payment verified successfully".to_string(),
    }))
}
