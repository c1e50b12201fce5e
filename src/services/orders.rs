//! Gateway order creation: amount validation, minor-unit conversion, and
//! receipt identifiers.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::gateway::{CreateGatewayOrder, GatewayOrder, PaymentGatewayClient};
use crate::config::validate_currency_code;
use crate::errors::ServiceError;

/// The gateway's minimum order: one major currency unit.
pub const MIN_ORDER_MINOR_UNITS: i64 = 100;

/// Converts a major-unit amount to minor units, rounding half away from zero
/// rather than truncating, so fractional paise are never silently dropped.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }

    let minor = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let minor = minor
        .to_i64()
        .ok_or_else(|| ServiceError::InvalidAmount("amount out of range".to_string()))?;

    if minor < MIN_ORDER_MINOR_UNITS {
        return Err(ServiceError::InvalidAmount(format!(
            "amount must be at least one major currency unit ({} minor units)",
            MIN_ORDER_MINOR_UNITS
        )));
    }

    Ok(minor)
}

/// Receipt identifier unique per request. Time-based with a random suffix;
/// collision probability is negligible within the gateway's dedup window.
fn receipt_id() -> String {
    format!(
        "rcpt_{}_{:04x}",
        Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}

#[derive(Clone)]
pub struct OrderService {
    gateway: Arc<dyn PaymentGatewayClient>,
    default_currency: String,
}

impl OrderService {
    pub fn new(gateway: Arc<dyn PaymentGatewayClient>, default_currency: String) -> Self {
        Self {
            gateway,
            default_currency,
        }
    }

    /// Mints a gateway order for the given major-unit amount.
    ///
    /// No retry on downstream failure: a blind retry could mint a duplicate
    /// intent, so the structured error is surfaced to the caller instead.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: Option<String>,
    ) -> Result<GatewayOrder, ServiceError> {
        let currency = match currency {
            Some(code) => {
                validate_currency_code(&code).map_err(|_| {
                    ServiceError::ValidationError(
                        "currency must be a 3-letter ISO code".to_string(),
                    )
                })?;
                code.to_ascii_uppercase()
            }
            None => self.default_currency.clone(),
        };

        let amount_minor = to_minor_units(amount)?;
        let receipt = receipt_id();

        info!(%currency, amount_minor, receipt, "creating gateway order");

        self.gateway
            .create_order(CreateGatewayOrder {
                amount_minor,
                currency,
                receipt,
                customer_ref: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::gateway::MockPaymentGatewayClient;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_major_units_by_rounding() {
        assert_eq!(to_minor_units(dec!(250.00)).unwrap(), 25000);
        assert_eq!(to_minor_units(dec!(99.999)).unwrap(), 10000);
        assert_eq!(to_minor_units(dec!(1.005)).unwrap(), 101);
        assert_eq!(to_minor_units(dec!(1)).unwrap(), 100);
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert!(matches!(
            to_minor_units(Decimal::ZERO),
            Err(ServiceError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_minor_units(dec!(-10)),
            Err(ServiceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_amounts_below_one_major_unit() {
        assert!(matches!(
            to_minor_units(dec!(0.99)),
            Err(ServiceError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_minor_units(dec!(0.01)),
            Err(ServiceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn receipt_ids_are_unique_per_call() {
        let a = receipt_id();
        let b = receipt_id();
        assert!(a.starts_with("rcpt_"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_the_gateway() {
        // A mock with no expectations panics on any call.
        let gateway = Arc::new(MockPaymentGatewayClient::new());
        let service = OrderService::new(gateway, "INR".into());

        let err = service.create_order(dec!(-5), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn invalid_currency_never_reaches_the_gateway() {
        let gateway = Arc::new(MockPaymentGatewayClient::new());
        let service = OrderService::new(gateway, "INR".into());

        let err = service
            .create_order(dec!(250), Some("RUPEES".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn forwards_converted_amount_and_currency() {
        let mut gateway = MockPaymentGatewayClient::new();
        gateway
            .expect_create_order()
            .withf(|req| req.amount_minor == 25000 && req.currency == "INR")
            .times(1)
            .returning(|req| {
                Ok(GatewayOrder {
                    id: "order_NXhT2vKkWqYx9A".into(),
                    amount: req.amount_minor,
                    currency: req.currency,
                    status: "created".into(),
                    receipt: Some(req.receipt),
                })
            });

        let service = OrderService::new(Arc::new(gateway), "INR".into());
        let order = service.create_order(dec!(250.00), None).await.unwrap();
        assert_eq!(order.amount, 25000);
        assert_eq!(order.currency, "INR");
    }
}
