use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkout Relay API",
        version = "0.1.0",
        description = r#"
# Checkout Relay

A stateless bridge between a payment gateway and a commerce platform:

- **POST /create-payment** mints a gateway order for a checkout amount
- **POST /verify-payment** authenticates a payment confirmation (HMAC-SHA256),
  confirms capture and amount with the gateway, and creates the matching
  commerce-platform order
- **POST /create-customer** creates a gateway customer record
- **GET /health** liveness probe

Failure responses always carry `success: false`; when a payment was verified
but the commerce order could not be created, `payment_verified: true` marks
the state that needs manual order creation.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        crate::handlers::payments::create_payment,
        crate::handlers::payments::verify_payment,
        crate::handlers::customers::create_customer,
        crate::handlers::health::health_check,
    ),
    components(schemas(
        crate::handlers::payments::CreatePaymentRequest,
        crate::handlers::payments::CreatePaymentResponse,
        crate::handlers::payments::VerifyPaymentRequest,
        crate::handlers::payments::VerifyPaymentResponse,
        crate::handlers::customers::CreateCustomerRequest,
        crate::handlers::customers::CreateCustomerResponse,
        crate::handlers::health::HealthResponse,
        crate::errors::ErrorResponse,
        crate::models::cart::CartSnapshot,
        crate::models::cart::CartItem,
        crate::models::customer::CustomerDetails,
        crate::clients::gateway::PaymentStatus,
    )),
    tags(
        (name = "Payments", description = "Gateway order creation and payment verification"),
        (name = "Customers", description = "Gateway customer records"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
