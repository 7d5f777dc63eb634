//! Entitlement credentials
//!
//! A credential is an HS256 JWT carrying the verified purchase and the cost
//! computation it unlocks. The credential is the only state; nothing is
//! stored server-side.

use crate::estimator::{CostRange, EstimateInput, Floors, Location, Specification};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Validity window of an issued credential
pub const CREDENTIAL_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign credential: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("credential rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
    #[error("credential is not marked as verified")]
    Unverified,
}

impl TokenError {
    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Signing(_) => "signing",
            Self::Unverified => "unverified",
            Self::Rejected(err) => match err.kind() {
                ErrorKind::ExpiredSignature => "expired",
                ErrorKind::InvalidSignature => "bad_signature",
                _ => "malformed",
            },
        }
    }
}

/// What the payment step hands over for signing
#[derive(Debug, Clone, PartialEq)]
pub struct Entitlement {
    pub purchase_id: String,
    pub input: EstimateInput,
    pub cost: CostRange,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Signed credential payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementClaims {
    pub purchase_id: String,
    pub area: f64,
    pub specification: Specification,
    pub location: Location,
    pub floors: Floors,
    pub min_cost: u64,
    pub max_cost: u64,
    pub verified: bool,
    pub timestamp: i64,
    pub iat: i64,
    pub exp: i64,
}

impl EntitlementClaims {
    pub fn input(&self) -> EstimateInput {
        EstimateInput {
            area: self.area,
            specification: self.specification,
            location: self.location,
            floors: self.floors,
        }
    }

    pub fn cost(&self) -> CostRange {
        CostRange {
            min_cost: self.min_cost,
            max_cost: self.max_cost,
        }
    }
}

/// Issues and verifies entitlement credentials with a process-wide secret
#[derive(Clone)]
pub struct EntitlementSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for EntitlementSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementSigner")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_hours", &CREDENTIAL_TTL_HOURS)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl EntitlementSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a credential valid for [`CREDENTIAL_TTL_HOURS`] from now
    pub fn issue(&self, entitlement: &Entitlement) -> Result<String, TokenError> {
        self.issue_at(entitlement, Utc::now())
    }

    /// Sign a credential as if issued at `issued_at`
    pub fn issue_at(
        &self,
        entitlement: &Entitlement,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::hours(CREDENTIAL_TTL_HOURS);

        let claims = EntitlementClaims {
            purchase_id: entitlement.purchase_id.clone(),
            area: entitlement.input.area,
            specification: entitlement.input.specification,
            location: entitlement.input.location,
            floors: entitlement.input.floors,
            min_cost: entitlement.cost.min_cost,
            max_cost: entitlement.cost.max_cost,
            verified: true,
            timestamp: entitlement.timestamp,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Decode and validate a credential, reporting why it was rejected
    pub fn decode(&self, token: &str) -> Result<EntitlementClaims, TokenError> {
        let data = decode::<EntitlementClaims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Rejected)?;

        if !data.claims.verified {
            return Err(TokenError::Unverified);
        }

        Ok(data.claims)
    }

    /// Decode and validate a credential. Any failure yields `None`.
    pub fn verify(&self, token: &str) -> Option<EntitlementClaims> {
        match self.decode(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(reason = e.reason(), error = %e, "Rejected entitlement credential");
                crate::metrics::record_entitlement_rejection(e.reason());
                None
            }
        }
    }
}
