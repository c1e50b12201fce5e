//! Payment gateway REST client.
//!
//! The gateway is the source of truth for payment state: the relay never
//! trusts client-supplied status, it always re-fetches.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use strum::Display;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Gateway-side payment lifecycle. `created` → `authorized` → `captured`,
/// or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Failed,
}

/// Gateway order record (the payment intent minted at create-payment time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Gateway payment record fetched at verify time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCustomer {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct CreateGatewayOrder {
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    pub customer_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateGatewayCustomer {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub notes: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder, ServiceError>;
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, ServiceError>;
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, ServiceError>;
    async fn create_customer(
        &self,
        request: CreateGatewayCustomer,
    ) -> Result<GatewayCustomer, ServiceError>;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    /// Ask the gateway to capture automatically on authorization
    payment_capture: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateCustomerBody<'a> {
    name: &'a str,
    email: &'a str,
    contact: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

/// reqwest-backed gateway client authenticated with basic auth
/// (key id / key secret).
#[derive(Clone)]
pub struct HttpPaymentGatewayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl HttpPaymentGatewayClient {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("gateway http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            key_id: config.gateway_key_id.clone(),
            key_secret: config.gateway_key_secret.clone(),
        })
    }

    fn gateway_error(context: &str, details: impl Into<String>) -> ServiceError {
        ServiceError::GatewayError {
            context: context.to_string(),
            details: details.into(),
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::gateway_error(context, e.to_string()))?;

        if !status.is_success() {
            return Err(Self::gateway_error(context, format!("{}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| Self::gateway_error(context, format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl PaymentGatewayClient for HttpPaymentGatewayClient {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder, ServiceError> {
        let body = CreateOrderBody {
            amount: request.amount_minor,
            currency: &request.currency,
            receipt: &request.receipt,
            payment_capture: 1,
            customer_id: request.customer_ref.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::gateway_error("create order", e.to_string()))?;

        Self::decode(response, "create order").await
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, ServiceError> {
        let response = self
            .http
            .get(format!("{}/payments/{}", self.base_url, payment_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| Self::gateway_error("fetch payment", e.to_string()))?;

        Self::decode(response, "fetch payment").await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, ServiceError> {
        let response = self
            .http
            .get(format!("{}/orders/{}", self.base_url, order_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| Self::gateway_error("fetch order", e.to_string()))?;

        Self::decode(response, "fetch order").await
    }

    async fn create_customer(
        &self,
        request: CreateGatewayCustomer,
    ) -> Result<GatewayCustomer, ServiceError> {
        let body = CreateCustomerBody {
            name: &request.name,
            email: &request.email,
            contact: &request.contact,
            notes: request.notes.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/customers", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::gateway_error("create customer", e.to_string()))?;

        Self::decode(response, "create customer").await
    }
}
