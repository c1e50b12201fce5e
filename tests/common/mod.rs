#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use checkout_relay::clients::commerce::{
    CommerceOrderPayload, CommercePlatformClient, CreatedCommerceOrder,
};
use checkout_relay::clients::gateway::{
    CreateGatewayCustomer, CreateGatewayOrder, GatewayCustomer, GatewayOrder, GatewayPayment,
    PaymentGatewayClient,
};
use checkout_relay::config::AppConfig;
use checkout_relay::errors::ServiceError;
use checkout_relay::{api_routes, AppState};

pub const TEST_SECRET: &str = "test_signing_secret";
pub const TEST_KEY_ID: &str = "rzp_test_key";

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        log_level: "info".into(),
        log_json: false,
        gateway_key_id: TEST_KEY_ID.into(),
        gateway_key_secret: TEST_SECRET.into(),
        gateway_base_url: "https://gateway.invalid/v1".into(),
        gateway_name: "Razorpay".into(),
        commerce_host: "https://shop.invalid".into(),
        commerce_token: "shp_test_token".into(),
        default_currency: "INR".into(),
        default_country: "India".into(),
        upstream_timeout_secs: 5,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
    }
}

/// Scripted gateway: create-order echoes the request, fetches return the
/// configured records. Calls are counted so tests can assert an endpoint was
/// never reached.
#[derive(Default)]
pub struct StubGateway {
    pub payment: Option<GatewayPayment>,
    pub order: Option<GatewayOrder>,
    pub create_order_calls: AtomicUsize,
}

#[async_trait]
impl PaymentGatewayClient for StubGateway {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder, ServiceError> {
        self.create_order_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: "order_NXhT2vKkWqYx9A".into(),
            amount: request.amount_minor,
            currency: request.currency,
            status: "created".into(),
            receipt: Some(request.receipt),
        })
    }

    async fn fetch_payment(&self, _payment_id: &str) -> Result<GatewayPayment, ServiceError> {
        self.payment
            .clone()
            .ok_or_else(|| ServiceError::GatewayError {
                context: "fetch payment".into(),
                details: "no payment configured in stub".into(),
            })
    }

    async fn fetch_order(&self, _order_id: &str) -> Result<GatewayOrder, ServiceError> {
        self.order.clone().ok_or_else(|| ServiceError::GatewayError {
            context: "fetch order".into(),
            details: "no order configured in stub".into(),
        })
    }

    async fn create_customer(
        &self,
        _request: CreateGatewayCustomer,
    ) -> Result<GatewayCustomer, ServiceError> {
        Ok(GatewayCustomer {
            id: "cust_NXhVqL8mPdTz3E".into(),
        })
    }
}

/// Scripted commerce platform: records the submitted payload and either
/// returns a created order or the configured failure body.
#[derive(Default)]
pub struct StubCommerce {
    pub fail_with: Option<String>,
    pub create_order_calls: AtomicUsize,
    pub last_payload: Mutex<Option<CommerceOrderPayload>>,
}

#[async_trait]
impl CommercePlatformClient for StubCommerce {
    async fn create_order(
        &self,
        payload: CommerceOrderPayload,
    ) -> Result<CreatedCommerceOrder, ServiceError> {
        self.create_order_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload);

        if let Some(details) = &self.fail_with {
            return Err(ServiceError::CommerceOrderFailed {
                details: details.clone(),
            });
        }

        Ok(CreatedCommerceOrder {
            id: 5212345,
            name: "#1024".into(),
            order_number: Some(1024),
            order_status_url: Some("https://shop.invalid/orders/abc/status".into()),
        })
    }
}

pub struct TestApp {
    router: Router,
    pub gateway: Arc<StubGateway>,
    pub commerce: Arc<StubCommerce>,
}

impl TestApp {
    pub fn new(gateway: StubGateway, commerce: StubCommerce) -> Self {
        let gateway = Arc::new(gateway);
        let commerce = Arc::new(commerce);
        let state = AppState::new(test_config(), gateway.clone(), commerce.clone());

        let router = api_routes()
            .layer(axum::middleware::from_fn(
                checkout_relay::middleware_helpers::request_id::request_id_middleware,
            ))
            .with_state(state);

        Self {
            router,
            gateway,
            commerce,
        }
    }

    pub async fn post(&self, path: &str, payload: Value) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }

    pub async fn get(&self, path: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn assert_status_and_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    response_json(response).await
}
