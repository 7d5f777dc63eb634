use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;

use crate::{
    error::AppError,
    estimator::CostRange,
    handlers::EstimateFields,
    metrics,
    preview::rough_estimate,
};

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub success: bool,
    pub data: CostRange,
}

/// Handle /api/estimate
///
/// Free preview only. The paid figures come from /api/verify-payment.
pub async fn estimate(
    payload: Result<Json<EstimateFields>, JsonRejection>,
) -> Result<Json<EstimateResponse>, AppError> {
    metrics::record_request("/api/estimate");

    let Json(fields) = payload.map_err(|_| AppError::MissingFields)?;
    let input = fields.into_input()?;

    Ok(Json(EstimateResponse {
        success: true,
        data: rough_estimate(&input),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_estimate_returns_preview() {
        let fields: EstimateFields = serde_json::from_value(json!({
            "area": 1000,
            "specification": "standard",
            "location": "medium",
            "floors": "g0"
        }))
        .unwrap();

        let Json(response) = estimate(Ok(Json(fields))).await.unwrap();
        assert_eq!(response.data.min_cost, 2_024_000);
        assert_eq!(response.data.max_cost, 2_376_000);
    }

    #[tokio::test]
    async fn test_estimate_missing_fields() {
        let result = estimate(Ok(Json(EstimateFields::default()))).await;
        assert!(matches!(result, Err(AppError::MissingFields)));
    }
}
