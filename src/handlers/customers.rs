use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::clients::gateway::CreateGatewayCustomer;
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 128, message = "name is required"))]
    #[schema(example = "Asha Patel")]
    pub name: String,

    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "asha.patel@example.com")]
    pub email: String,

    /// Contact number
    #[validate(length(min = 7, max = 16, message = "contact must be 7-15 digits"))]
    #[schema(example = "+919876543210")]
    pub contact: String,

    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCustomerResponse {
    /// Always `true`.
    pub success: bool,
    #[schema(example = "cust_NXhVqL8mPdTz3E")]
    pub customer_id: String,
}

/// Create a gateway customer record (optional storefront flow)
#[utoipa::path(
    post,
    path = "/create-customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer created", body = CreateCustomerResponse),
        (status = 400, description = "Invalid customer fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<CreateCustomerResponse>, ServiceError> {
    request.validate()?;

    let customer = state
        .customers
        .create_customer(CreateGatewayCustomer {
            name: request.name,
            email: request.email,
            contact: request.contact,
            notes: request.notes,
        })
        .await?;

    Ok(Json(CreateCustomerResponse {
        success: true,
        customer_id: customer.id,
    }))
}

/// Customer routes
pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/create-customer", post(create_customer))
}
