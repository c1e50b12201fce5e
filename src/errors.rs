use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::clients::gateway::PaymentStatus;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint.
///
/// `payment_verified` is set only when the payment side of a verify call has
/// already succeeded and the failure happened downstream; that state needs a
/// different remediation (manual order creation) than a failed payment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "error": "payment not captured (status: authorized)",
    "request_id": "req-abc123xyz",
    "timestamp": "2025-08-07T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error description
    #[schema(example = "payment not captured (status: authorized)")]
    pub error: String,
    /// Raw upstream payload, present on dependency failures for operator diagnosis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Set to `true` when the payment was verified but commerce-order creation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_verified: Option<bool>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    #[schema(example = "2025-08-07T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // Never reveals the computed signature.
    #[error("payment signature verification failed")]
    SignatureMismatch,

    #[error("payment not captured (status: {0})")]
    PaymentNotCaptured(PaymentStatus),

    #[error("payment amount {payment_amount} does not match order amount {order_amount}")]
    AmountMismatch {
        payment_amount: i64,
        order_amount: i64,
    },

    #[error("payment gateway {context} failed")]
    GatewayError { context: String, details: String },

    #[error("payment verified but commerce order creation failed")]
    CommerceOrderFailed { details: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_)
            | Self::InvalidAmount(_)
            | Self::SignatureMismatch
            | Self::PaymentNotCaptured(_)
            | Self::AmountMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::GatewayError { .. }
            | Self::CommerceOrderFailed { .. }
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Raw upstream payload attached to dependency failures.
    fn details(&self) -> Option<String> {
        match self {
            Self::GatewayError { details, .. } | Self::CommerceOrderFailed { details } => {
                Some(details.clone())
            }
            _ => None,
        }
    }

    fn payment_verified(&self) -> Option<bool> {
        match self {
            Self::CommerceOrderFailed { .. } => Some(true),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            success: false,
            error: self.to_string(),
            details: self.details(),
            payment_verified: self.payment_verified(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let errors = [
            ServiceError::ValidationError("email is required".into()),
            ServiceError::InvalidAmount("amount must be greater than zero".into()),
            ServiceError::SignatureMismatch,
            ServiceError::PaymentNotCaptured(PaymentStatus::Authorized),
            ServiceError::AmountMismatch {
                payment_amount: 25000,
                order_amount: 20000,
            },
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn upstream_errors_map_to_internal_server_error() {
        let gateway = ServiceError::GatewayError {
            context: "create order".into(),
            details: "503: unavailable".into(),
        };
        let commerce = ServiceError::CommerceOrderFailed {
            details: "{\"errors\":\"variant not found\"}".into(),
        };
        assert_eq!(gateway.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(commerce.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn commerce_failure_is_marked_payment_verified() {
        let err = ServiceError::CommerceOrderFailed {
            details: "422: line item invalid".into(),
        };
        assert_eq!(err.payment_verified(), Some(true));
        assert!(err.details().is_some());

        let other = ServiceError::SignatureMismatch;
        assert_eq!(other.payment_verified(), None);
    }

    #[test]
    fn signature_mismatch_message_does_not_leak_signatures() {
        let msg = ServiceError::SignatureMismatch.to_string();
        assert_eq!(msg, "payment signature verification failed");
    }
}
