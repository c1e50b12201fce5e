//! Payment confirmation verification.
//!
//! The single control point preventing a forged client-side "payment
//! succeeded" event from producing a real commerce order. Per-request
//! ordering is fixed: signature check, capture check, amount cross-check,
//! commerce submission. No step is skipped or reordered.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::clients::commerce::CreatedCommerceOrder;
use crate::clients::gateway::{PaymentGatewayClient, PaymentStatus};
use crate::errors::ServiceError;
use crate::models::cart::CartSnapshot;
use crate::models::customer::CustomerDetails;
use crate::services::commerce::CommerceOrderService;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 over `order_id + "|" + payment_id`.
pub fn expected_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

pub struct VerificationService {
    gateway: Arc<dyn PaymentGatewayClient>,
    commerce_orders: CommerceOrderService,
    signing_secret: String,
}

impl VerificationService {
    pub fn new(
        gateway: Arc<dyn PaymentGatewayClient>,
        commerce_orders: CommerceOrderService,
        signing_secret: String,
    ) -> Self {
        Self {
            gateway,
            commerce_orders,
            signing_secret,
        }
    }

    /// Fails closed on mismatch; the computed signature is never revealed.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        claimed: &str,
    ) -> Result<(), ServiceError> {
        let expected = expected_signature(order_id, payment_id, &self.signing_secret);
        if !constant_time_eq(&expected, claimed) {
            warn!(order_id, payment_id, "payment signature verification failed");
            return Err(ServiceError::SignatureMismatch);
        }
        Ok(())
    }

    /// Full verify flow: authenticate the confirmation, confirm capture and
    /// amount with the gateway, then create the commerce order.
    #[instrument(skip(self, signature, cart, customer))]
    pub async fn verify_and_relay(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        cart: &CartSnapshot,
        customer: &CustomerDetails,
    ) -> Result<CreatedCommerceOrder, ServiceError> {
        self.verify_signature(order_id, payment_id, signature)?;

        // Status comes from the gateway, never from client input.
        let payment = self.gateway.fetch_payment(payment_id).await?;
        if payment.status != PaymentStatus::Captured {
            warn!(status = %payment.status, "payment not captured");
            return Err(ServiceError::PaymentNotCaptured(payment.status));
        }

        let order = self.gateway.fetch_order(order_id).await?;
        if payment.amount != order.amount {
            warn!(
                payment_amount = payment.amount,
                order_amount = order.amount,
                "captured amount does not match order amount"
            );
            return Err(ServiceError::AmountMismatch {
                payment_amount: payment.amount,
                order_amount: order.amount,
            });
        }

        self.commerce_orders
            .submit_order(&payment, cart, customer)
            .await
    }
}
