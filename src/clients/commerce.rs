//! Commerce platform REST client.
//!
//! Orders are created over an HTTPS JSON endpoint authenticated by a static
//! access token header; failures surface the raw response body so operators
//! can diagnose them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::ServiceError;

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceOrderPayload {
    pub order: CommerceOrderBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceOrderBody {
    pub line_items: Vec<CommerceLineItem>,
    pub customer: CommerceCustomer,
    pub billing_address: CommerceAddress,
    pub shipping_address: CommerceAddress,
    pub email: String,
    pub financial_status: String,
    /// "bypass" so stock desynchronization does not block order creation
    pub inventory_behaviour: String,
    pub tags: String,
    pub transactions: Vec<CommerceTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceLineItem {
    pub variant_id: i64,
    pub quantity: u32,
    /// Major currency units with two decimals, e.g. "80.00"
    pub price: String,
}

/// Customer identification carries email only; the platform rejects orders
/// reusing a phone number already attached to another customer record, so
/// phone lives on the addresses instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceTransaction {
    pub kind: String,
    pub status: String,
    /// Major currency units with two decimals
    pub amount: String,
    pub currency: String,
    /// Payment gateway display name
    pub gateway: String,
    /// Gateway payment identifier
    pub authorization: String,
}

/// The platform's created order record: the relay's terminal output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCommerceOrder {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub order_number: Option<i64>,
    #[serde(default)]
    pub order_status_url: Option<String>,
}

#[derive(Deserialize)]
struct CreatedOrderEnvelope {
    order: CreatedCommerceOrder,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommercePlatformClient: Send + Sync {
    async fn create_order(
        &self,
        payload: CommerceOrderPayload,
    ) -> Result<CreatedCommerceOrder, ServiceError>;
}

/// reqwest-backed commerce client.
#[derive(Clone)]
pub struct HttpCommercePlatformClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpCommercePlatformClient {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("commerce http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.commerce_host.trim_end_matches('/').to_string(),
            token: config.commerce_token.clone(),
        })
    }
}

#[async_trait]
impl CommercePlatformClient for HttpCommercePlatformClient {
    async fn create_order(
        &self,
        payload: CommerceOrderPayload,
    ) -> Result<CreatedCommerceOrder, ServiceError> {
        let response = self
            .http
            .post(format!("{}/orders.json", self.base_url))
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::CommerceOrderFailed {
                details: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::CommerceOrderFailed {
                details: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(ServiceError::CommerceOrderFailed {
                details: format!("{}: {}", status, body),
            });
        }

        let envelope: CreatedOrderEnvelope =
            serde_json::from_str(&body).map_err(|e| ServiceError::CommerceOrderFailed {
                details: format!("invalid response body: {}", e),
            })?;

        Ok(envelope.order)
    }
}
