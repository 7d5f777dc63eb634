use axum::{Extension, Json};
use serde::Serialize;

use crate::{
    estimator::{get_breakdown, get_timeline, BreakdownLine, Timeline},
    metrics,
    token::EntitlementClaims,
};

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub success: bool,
    pub data: BreakdownData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownData {
    pub breakdown: Vec<BreakdownLine>,
    pub timeline: Timeline,
    pub min_cost: u64,
    pub max_cost: u64,
    pub area: f64,
}

/// Handle /api/get-breakdown
///
/// Breakdown and timeline are derived fresh from the credential's cost range
/// and area on every call.
pub async fn get_breakdown_handler(
    Extension(claims): Extension<EntitlementClaims>,
) -> Json<BreakdownResponse> {
    metrics::record_request("/api/get-breakdown");

    tracing::debug!(
        min_cost = claims.min_cost,
        max_cost = claims.max_cost,
        "Serving breakdown"
    );

    Json(BreakdownResponse {
        success: true,
        data: BreakdownData {
            breakdown: get_breakdown(claims.min_cost, claims.max_cost),
            timeline: get_timeline(claims.area),
            min_cost: claims.min_cost,
            max_cost: claims.max_cost,
            area: claims.area,
        },
    })
}
