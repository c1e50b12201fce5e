use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::cart::CartSnapshot;
use crate::models::customer::CustomerDetails;
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "amount": 250.00,
    "currency": "INR",
    "customerDetails": {
        "first_name": "Asha", "last_name": "Patel",
        "email": "asha.patel@example.com", "phone": "+919876543210",
        "address": "14 Marine Drive", "city": "Mumbai",
        "state": "Maharashtra", "zip": "400001"
    }
}))]
pub struct CreatePaymentRequest {
    /// Amount in major currency units
    #[schema(example = "250.00")]
    pub amount: Decimal,
    /// Currency code (ISO 4217); defaults to the configured currency
    #[schema(example = "INR")]
    pub currency: Option<String>,
    /// Optional at create time; the storefront resubmits it at verify time
    #[validate]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePaymentResponse {
    /// Always `true`.
    pub success: bool,
    /// Gateway order identifier for the hosted checkout UI
    #[schema(example = "order_NXhT2vKkWqYx9A")]
    pub order_id: String,
    /// Amount in minor currency units, as minted on the gateway order
    #[schema(example = 25000)]
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
    /// Public gateway key id the checkout widget initializes with
    pub key_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Gateway order identifier returned by create-payment
    #[validate(length(min = 1, message = "orderId is required"))]
    #[schema(example = "order_NXhT2vKkWqYx9A")]
    pub order_id: String,
    /// Gateway payment identifier from the completed checkout
    #[validate(length(min = 1, message = "paymentId is required"))]
    #[schema(example = "pay_NXhUVt3qYxA2Bc")]
    pub payment_id: String,
    /// Hex-encoded HMAC-SHA256 signature over `orderId|paymentId`
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
    pub cart_data: CartSnapshot,
    #[validate]
    pub customer_details: CustomerDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    /// Always `true`.
    pub success: bool,
    pub commerce_order_id: i64,
    /// Display name, e.g. "#1024"
    #[schema(example = "#1024")]
    pub order_name: String,
    /// Customer-facing order status URL, when the platform provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
}

/// Create a payment-gateway order for a checkout
#[utoipa::path(
    post,
    path = "/create-payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Gateway order created", body = CreatePaymentResponse),
        (status = 400, description = "Invalid amount or currency", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<CreatePaymentResponse>, ServiceError> {
    request.validate()?;

    let order = state
        .orders
        .create_order(request.amount, request.currency)
        .await?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: state.config.gateway_key_id.clone(),
    }))
}

/// Verify a completed payment and create the commerce order
#[utoipa::path(
    post,
    path = "/verify-payment",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified, commerce order created", body = VerifyPaymentResponse),
        (status = 400, description = "Signature mismatch, payment not captured, or amount mismatch", body = crate::errors::ErrorResponse),
        (status = 500, description = "Upstream failure; payment_verified distinguishes a verified payment whose order creation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ServiceError> {
    request.validate()?;
    request.cart_data.validate_items()?;

    let created = state
        .verification
        .verify_and_relay(
            &request.order_id,
            &request.payment_id,
            &request.signature,
            &request.cart_data,
            &request.customer_details,
        )
        .await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        commerce_order_id: created.id,
        order_name: created.name,
        status_url: created.order_status_url,
    }))
}

/// Payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment", post(create_payment))
        .route("/verify-payment", post(verify_payment))
}
