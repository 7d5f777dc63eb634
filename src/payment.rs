use crate::{config::PaymentConfig, logging::Masked};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

/// Purchase reference accepted without a provider call in development setups
pub const DEV_BYPASS_REFERENCE: &str = "dev_test_token";

/// Provider verdict for a purchase reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStatus {
    Valid,
    NotFound,
    Refunded,
    Disputed,
    WrongProduct,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::NotFound => "not_found",
            Self::Refunded => "refunded",
            Self::Disputed => "disputed",
            Self::WrongProduct => "wrong_product",
        }
    }

    /// Client-facing rejection message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "Payment verified",
            Self::NotFound => "Invalid purchase ID",
            Self::Refunded | Self::Disputed => "Payment was refunded or disputed",
            Self::WrongProduct => "Purchase is for a different product",
        }
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment rejected: {}", .0.as_str())]
    Rejected(SaleStatus),
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
    #[error("payment verification is not configured")]
    NotConfigured,
}

impl PaymentError {
    /// Outcome label for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Rejected(status) => status.as_str(),
            Self::Unavailable(_) => "unavailable",
            Self::NotConfigured => "not_configured",
        }
    }
}

/// Sale lookup against an external payment provider
#[async_trait]
pub trait PaymentVerifier: Send + Sync + 'static {
    /// Provider name for logs and metrics
    fn name(&self) -> &str;

    /// Look up a purchase reference. Transport failures and timeouts are
    /// `PaymentError::Unavailable`; they never count as a valid sale.
    async fn verify_sale(&self, purchase_id: &str) -> Result<SaleStatus, PaymentError>;
}

/// Gumroad sales API client
#[derive(Debug, Clone)]
pub struct GumroadClient {
    client: Client,
    base_url: String,
    access_token: String,
    timeout: Duration,
    product_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaleResponse {
    #[serde(default)]
    success: Option<bool>,
    sale: Option<Sale>,
}

#[derive(Debug, Deserialize)]
struct Sale {
    #[serde(default)]
    refunded: bool,
    #[serde(default)]
    disputed: bool,
    #[serde(default)]
    product_id: Option<String>,
}

impl GumroadClient {
    /// Build a client from configuration. Returns `None` when no access
    /// token is configured.
    pub fn from_config(client: Client, config: &PaymentConfig) -> Option<Self> {
        let access_token = config.access_token.clone()?;

        Some(Self {
            client,
            base_url: config.base_url.clone(),
            access_token,
            timeout: Duration::from_secs(config.timeout_seconds),
            product_id: config.product_id.clone(),
        })
    }

    fn sale_url(&self, purchase_id: &str) -> Result<Url, PaymentError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PaymentError::Unavailable(format!("invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| PaymentError::Unavailable("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("sales")
            .push(purchase_id);

        Ok(url)
    }
}

#[async_trait]
impl PaymentVerifier for GumroadClient {
    fn name(&self) -> &str {
        "gumroad"
    }

    async fn verify_sale(&self, purchase_id: &str) -> Result<SaleStatus, PaymentError> {
        let url = self.sale_url(purchase_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        if response.status().is_server_error() {
            return Err(PaymentError::Unavailable(format!(
                "provider returned {}",
                response.status()
            )));
        }

        if !response.status().is_success() {
            info!(
                purchase_id = %Masked::new(purchase_id),
                status = response.status().as_u16(),
                "Payment provider did not find sale"
            );
            return Ok(SaleStatus::NotFound);
        }

        let body: SaleResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Unavailable(format!("undecodable sale response: {}", e)))?;

        let sale = match (body.success, body.sale) {
            (Some(false), _) | (_, None) => return Ok(SaleStatus::NotFound),
            (_, Some(sale)) => sale,
        };

        if sale.refunded {
            return Ok(SaleStatus::Refunded);
        }
        if sale.disputed {
            return Ok(SaleStatus::Disputed);
        }
        if let Some(expected) = &self.product_id {
            if sale.product_id.as_deref() != Some(expected.as_str()) {
                return Ok(SaleStatus::WrongProduct);
            }
        }

        Ok(SaleStatus::Valid)
    }
}

/// How a purchase reference was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Verified,
    DevBypass,
}

/// Decides whether a purchase reference unlocks the paid tier
#[derive(Clone)]
pub struct PaymentGate {
    verifier: Option<Arc<dyn PaymentVerifier>>,
    dev_bypass: bool,
}

impl PaymentGate {
    pub fn new(verifier: Option<Arc<dyn PaymentVerifier>>, dev_bypass: bool) -> Self {
        Self { verifier, dev_bypass }
    }

    pub fn from_config(client: Client, config: &PaymentConfig) -> Self {
        let verifier = GumroadClient::from_config(client, config)
            .map(|c| Arc::new(c) as Arc<dyn PaymentVerifier>);
        Self::new(verifier, config.dev_bypass)
    }

    /// Whether a real provider is wired in
    pub fn is_live(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn authorize(&self, purchase_id: &str) -> Result<Authorization, PaymentError> {
        let Some(verifier) = &self.verifier else {
            // The bypass only exists when no provider is configured at all
            if self.dev_bypass && purchase_id == DEV_BYPASS_REFERENCE {
                warn!("Development bypass accepted, payment provider not called");
                return Ok(Authorization::DevBypass);
            }
            return Err(PaymentError::NotConfigured);
        };

        match verifier.verify_sale(purchase_id).await? {
            SaleStatus::Valid => Ok(Authorization::Verified),
            status => Err(PaymentError::Rejected(status)),
        }
    }
}

impl std::fmt::Debug for PaymentGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGate")
            .field("verifier", &self.verifier.as_ref().map(|v| v.name().to_string()))
            .field("dev_bypass", &self.dev_bypass)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    struct FixedVerifier(SaleStatus);

    #[async_trait]
    impl PaymentVerifier for FixedVerifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn verify_sale(&self, _purchase_id: &str) -> Result<SaleStatus, PaymentError> {
            Ok(self.0)
        }
    }

    fn payment_config(base_url: String) -> PaymentConfig {
        PaymentConfig {
            access_token: Some("gum-access-token".to_string()),
            base_url,
            timeout_seconds: 2,
            product_id: None,
            dev_bypass: false,
        }
    }

    #[tokio::test]
    async fn test_bypass_requires_flag_and_missing_provider() {
        let gate = PaymentGate::new(None, true);
        assert_eq!(
            gate.authorize(DEV_BYPASS_REFERENCE).await.unwrap(),
            Authorization::DevBypass
        );

        let gate = PaymentGate::new(None, false);
        assert!(matches!(
            gate.authorize(DEV_BYPASS_REFERENCE).await,
            Err(PaymentError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_rejects_other_references() {
        let gate = PaymentGate::new(None, true);
        assert!(matches!(
            gate.authorize("sale-1").await,
            Err(PaymentError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_bypass_ignored_when_provider_configured() {
        let verifier = Arc::new(FixedVerifier(SaleStatus::NotFound));
        let gate = PaymentGate::new(Some(verifier), true);
        assert!(matches!(
            gate.authorize(DEV_BYPASS_REFERENCE).await,
            Err(PaymentError::Rejected(SaleStatus::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_gumroad_valid_sale() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/sales/sale-abc")
                    .header("authorization", "Bearer gum-access-token");
                then.status(200).json_body(json!({
                    "success": true,
                    "sale": { "refunded": false, "disputed": false, "product_id": "prod-1" }
                }));
            })
            .await;

        let client = GumroadClient::from_config(Client::new(), &payment_config(server.url("/v2")))
            .unwrap();
        assert_eq!(client.verify_sale("sale-abc").await.unwrap(), SaleStatus::Valid);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gumroad_refunded_and_disputed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/sales/refunded");
                then.status(200)
                    .json_body(json!({ "success": true, "sale": { "refunded": true } }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/sales/disputed");
                then.status(200)
                    .json_body(json!({ "success": true, "sale": { "disputed": true } }));
            })
            .await;

        let client = GumroadClient::from_config(Client::new(), &payment_config(server.url("/v2")))
            .unwrap();
        assert_eq!(client.verify_sale("refunded").await.unwrap(), SaleStatus::Refunded);
        assert_eq!(client.verify_sale("disputed").await.unwrap(), SaleStatus::Disputed);
    }

    #[tokio::test]
    async fn test_gumroad_unknown_sale() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/sales/missing");
                then.status(404)
                    .json_body(json!({ "success": false, "message": "not found" }));
            })
            .await;

        let client = GumroadClient::from_config(Client::new(), &payment_config(server.url("/v2")))
            .unwrap();
        assert_eq!(client.verify_sale("missing").await.unwrap(), SaleStatus::NotFound);
    }

    #[tokio::test]
    async fn test_gumroad_product_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/sales/other-product");
                then.status(200).json_body(json!({
                    "success": true,
                    "sale": { "product_id": "prod-2" }
                }));
            })
            .await;

        let mut config = payment_config(server.url("/v2"));
        config.product_id = Some("prod-1".to_string());
        let client = GumroadClient::from_config(Client::new(), &config).unwrap();
        assert_eq!(
            client.verify_sale("other-product").await.unwrap(),
            SaleStatus::WrongProduct
        );
    }

    #[tokio::test]
    async fn test_gumroad_timeout_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/sales/slow");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({ "success": true, "sale": {} }));
            })
            .await;

        let mut config = payment_config(server.url("/v2"));
        config.timeout_seconds = 1;
        let client = GumroadClient::from_config(Client::new(), &config).unwrap();
        assert!(matches!(
            client.verify_sale("slow").await,
            Err(PaymentError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_purchase_id_is_path_encoded() {
        let client = GumroadClient::from_config(
            Client::new(),
            &payment_config("https://api.gumroad.com/v2/".to_string()),
        )
        .unwrap();
        let url = client.sale_url("../admin?x=1").unwrap();
        assert!(url.path().starts_with("/v2/sales/"));
        assert!(!url.path().contains("/admin"));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_no_token_means_no_client() {
        let mut config = payment_config("https://api.gumroad.com/v2".to_string());
        config.access_token = None;
        assert!(GumroadClient::from_config(Client::new(), &config).is_none());
        assert!(!PaymentGate::from_config(Client::new(), &config).is_live());
    }
}
