use axum::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    estimator::{get_breakdown, get_timeline, BreakdownLine, Floors, Location, Specification, Timeline},
    metrics,
    token::EntitlementClaims,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub success: bool,
    pub pdf_data: ReportData,
}

/// Flat bundle consumed by the report renderer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub area: f64,
    pub specification: Specification,
    pub location: Location,
    pub floors: Floors,
    pub min_cost: u64,
    pub max_cost: u64,
    pub breakdown: Vec<BreakdownLine>,
    pub timeline: Timeline,
    pub generated_at: String,
}

impl ReportData {
    pub fn from_claims(claims: &EntitlementClaims) -> Self {
        Self {
            area: claims.area,
            specification: claims.specification,
            location: claims.location,
            floors: claims.floors,
            min_cost: claims.min_cost,
            max_cost: claims.max_cost,
            breakdown: get_breakdown(claims.min_cost, claims.max_cost),
            timeline: get_timeline(claims.area),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Handle /api/generate-pdf
pub async fn get_report_data(
    Extension(claims): Extension<EntitlementClaims>,
) -> Json<ReportResponse> {
    metrics::record_request("/api/generate-pdf");

    Json(ReportResponse {
        success: true,
        pdf_data: ReportData::from_claims(&claims),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_report_data_shape() {
        let claims = EntitlementClaims {
            purchase_id: "sale-9".to_string(),
            area: 1800.0,
            specification: Specification::Premium,
            location: Location::High,
            floors: Floors::G2,
            min_cost: 5_920_200,
            max_cost: 7_286_400,
            verified: true,
            timestamp: 0,
            iat: 0,
            exp: 0,
        };

        let Json(response) = get_report_data(Extension(claims)).await;
        let json = serde_json::to_value(&response).unwrap();
        let data = &json["pdfData"];

        assert_eq!(json["success"], true);
        assert_eq!(data["specification"], "premium");
        assert_eq!(data["location"], "high");
        assert_eq!(data["floors"], "g2");
        assert_eq!(data["timeline"], "8-12 months");
        assert_eq!(data["breakdown"].as_array().unwrap().len(), 6);
        assert!(data.get("purchaseId").is_none());

        let generated = data["generatedAt"].as_str().unwrap();
        assert!(generated.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(generated).is_ok());
    }
}
