//! HTTP handlers
//!
//! - verify_payment: check a purchase and issue an entitlement credential
//! - breakdown: detailed cost breakdown for a credential holder
//! - report: report-ready data bundle for a credential holder
//! - estimate: free rough estimate
//! - health / metrics_handler: operational endpoints

pub mod breakdown;
pub mod estimate;
pub mod health;
pub mod metrics_handler;
pub mod report;
pub mod verify_payment;

use crate::{
    config::Config,
    error::AppError,
    estimator::EstimateInput,
    payment::PaymentGate,
    token::EntitlementSigner,
};
use serde::Deserialize;
use std::sync::Arc;

/// Application state, immutable after startup
#[derive(Clone, Debug)]
pub struct AppState {
    pub signer: Arc<EntitlementSigner>,
    pub payments: Arc<PaymentGate>,
}

impl AppState {
    pub fn from_config(config: &Config, http_client: reqwest::Client) -> anyhow::Result<Self> {
        Ok(Self {
            signer: Arc::new(EntitlementSigner::new(config.signing_secret()?)),
            payments: Arc::new(PaymentGate::from_config(http_client, &config.payment)),
        })
    }
}

/// Area as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AreaField {
    Number(f64),
    Text(String),
}

/// Estimate fields shared by the free and paid request bodies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateFields {
    pub area: Option<AreaField>,
    pub specification: Option<String>,
    pub location: Option<String>,
    pub floors: Option<String>,
}

impl EstimateFields {
    /// `MissingFields` if anything is absent or blank, otherwise the
    /// estimator's field validation.
    pub fn into_input(self) -> Result<EstimateInput, AppError> {
        let area = match self.area {
            Some(AreaField::Text(s)) if s.trim().is_empty() => None,
            area => area,
        };

        let (Some(area), Some(specification), Some(location), Some(floors)) = (
            area,
            non_blank(self.specification),
            non_blank(self.location),
            non_blank(self.floors),
        ) else {
            return Err(AppError::MissingFields);
        };

        let area = match area {
            AreaField::Number(n) => n,
            AreaField::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::InvalidInput("area"))?,
        };

        Ok(EstimateInput::parse(area, &specification, &location, &floors)?)
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Answer for methods a route does not support
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Answer for unknown paths
pub async fn not_found() -> AppError {
    AppError::NotFound
}
