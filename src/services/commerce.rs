//! Cart-to-commerce-order translation and submission.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::commerce::{
    CommerceAddress, CommerceCustomer, CommerceLineItem, CommerceOrderBody, CommerceOrderPayload,
    CommercePlatformClient, CommerceTransaction, CreatedCommerceOrder,
};
use crate::clients::gateway::GatewayPayment;
use crate::errors::ServiceError;
use crate::models::cart::{minor_to_major_string, CartSnapshot};
use crate::models::customer::CustomerDetails;

#[derive(Clone)]
pub struct CommerceOrderService {
    client: Arc<dyn CommercePlatformClient>,
    /// Commerce orders already created, keyed by gateway payment id. A
    /// duplicated verify call returns the existing reference instead of
    /// creating a second order for the same payment.
    relayed: Arc<DashMap<String, CreatedCommerceOrder>>,
    default_country: String,
    gateway_name: String,
}

impl CommerceOrderService {
    pub fn new(
        client: Arc<dyn CommercePlatformClient>,
        default_country: String,
        gateway_name: String,
    ) -> Self {
        Self {
            client,
            relayed: Arc::new(DashMap::new()),
            default_country,
            gateway_name,
        }
    }

    fn address_from(&self, customer: &CustomerDetails) -> CommerceAddress {
        CommerceAddress {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            address1: customer.address.clone(),
            city: customer.city.clone(),
            province: customer.state.clone(),
            zip: customer.zip.clone(),
            country: customer
                .country
                .clone()
                .unwrap_or_else(|| self.default_country.clone()),
            phone: customer.phone.clone(),
        }
    }

    /// Builds the platform order payload: discounted line prices, customer
    /// and address sub-records, and a transaction marking the order paid.
    pub fn build_order_payload(
        &self,
        payment: &GatewayPayment,
        cart: &CartSnapshot,
        customer: &CustomerDetails,
    ) -> CommerceOrderPayload {
        let line_items = cart
            .items
            .iter()
            .map(|item| CommerceLineItem {
                variant_id: item.variant_id,
                quantity: item.quantity,
                price: item.effective_price_major(),
            })
            .collect();

        let address = self.address_from(customer);

        CommerceOrderPayload {
            order: CommerceOrderBody {
                line_items,
                customer: CommerceCustomer {
                    first_name: customer.first_name.clone(),
                    last_name: customer.last_name.clone(),
                    email: customer.email.clone(),
                },
                billing_address: address.clone(),
                shipping_address: address,
                email: customer.email.clone(),
                financial_status: "paid".to_string(),
                inventory_behaviour: "bypass".to_string(),
                tags: format!("{}, API", self.gateway_name),
                transactions: vec![CommerceTransaction {
                    kind: "sale".to_string(),
                    status: "success".to_string(),
                    amount: minor_to_major_string(payment.amount),
                    currency: payment.currency.clone(),
                    gateway: self.gateway_name.clone(),
                    authorization: payment.id.clone(),
                }],
            },
        }
    }

    /// Submits the commerce order for a verified, captured payment.
    #[instrument(skip(self, payment, cart, customer), fields(payment_id = %payment.id))]
    pub async fn submit_order(
        &self,
        payment: &GatewayPayment,
        cart: &CartSnapshot,
        customer: &CustomerDetails,
    ) -> Result<CreatedCommerceOrder, ServiceError> {
        if let Some(existing) = self.relayed.get(&payment.id) {
            let existing = existing.value().clone();
            info!(
                commerce_order_id = existing.id,
                "payment already relayed, returning existing commerce order"
            );
            return Ok(existing);
        }

        let payload = self.build_order_payload(payment, cart, customer);
        let created = self.client.create_order(payload).await?;

        info!(
            commerce_order_id = created.id,
            order_name = %created.name,
            "commerce order created"
        );
        self.relayed.insert(payment.id.clone(), created.clone());

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::commerce::MockCommercePlatformClient;
    use crate::clients::gateway::PaymentStatus;
    use crate::models::cart::CartItem;

    fn captured_payment() -> GatewayPayment {
        GatewayPayment {
            id: "pay_NXhUVt3qYxA2Bc".into(),
            order_id: Some("order_NXhT2vKkWqYx9A".into()),
            amount: 25000,
            currency: "INR".into(),
            status: PaymentStatus::Captured,
            method: Some("upi".into()),
        }
    }

    fn cart() -> CartSnapshot {
        CartSnapshot {
            items: vec![
                CartItem {
                    variant_id: 40543217348719,
                    quantity: 2,
                    price: 10000,
                    final_price: Some(8000),
                },
                CartItem {
                    variant_id: 40543217348720,
                    quantity: 1,
                    price: 5000,
                    final_price: None,
                },
            ],
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            first_name: "Asha".into(),
            last_name: "Patel".into(),
            email: "asha.patel@example.com".into(),
            phone: "+919876543210".into(),
            address: "14 Marine Drive".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            zip: "400001".into(),
            country: None,
        }
    }

    fn service(client: MockCommercePlatformClient) -> CommerceOrderService {
        CommerceOrderService::new(Arc::new(client), "India".into(), "Razorpay".into())
    }

    #[test]
    fn line_items_use_discounted_price_when_present() {
        let svc = service(MockCommercePlatformClient::new());
        let payload = svc.build_order_payload(&captured_payment(), &cart(), &customer());

        let items = &payload.order.line_items;
        assert_eq!(items[0].price, "80.00");
        assert_eq!(items[1].price, "50.00");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn payload_marks_order_paid_and_bypasses_inventory() {
        let svc = service(MockCommercePlatformClient::new());
        let payload = svc.build_order_payload(&captured_payment(), &cart(), &customer());

        assert_eq!(payload.order.financial_status, "paid");
        assert_eq!(payload.order.inventory_behaviour, "bypass");

        let tx = &payload.order.transactions[0];
        assert_eq!(tx.kind, "sale");
        assert_eq!(tx.gateway, "Razorpay");
        assert_eq!(tx.authorization, "pay_NXhUVt3qYxA2Bc");
        assert_eq!(tx.amount, "250.00");
        assert_eq!(tx.currency, "INR");
    }

    #[test]
    fn addresses_default_country_and_carry_phone() {
        let svc = service(MockCommercePlatformClient::new());
        let payload = svc.build_order_payload(&captured_payment(), &cart(), &customer());

        assert_eq!(payload.order.shipping_address.country, "India");
        assert_eq!(payload.order.billing_address.phone, "+919876543210");

        let mut abroad = customer();
        abroad.country = Some("Singapore".into());
        let payload = svc.build_order_payload(&captured_payment(), &cart(), &abroad);
        assert_eq!(payload.order.billing_address.country, "Singapore");
    }

    #[tokio::test]
    async fn duplicate_submission_returns_existing_order() {
        let mut client = MockCommercePlatformClient::new();
        client.expect_create_order().times(1).returning(|_| {
            Ok(CreatedCommerceOrder {
                id: 5212345,
                name: "#1024".into(),
                order_number: Some(1024),
                order_status_url: None,
            })
        });

        let svc = service(client);
        let first = svc
            .submit_order(&captured_payment(), &cart(), &customer())
            .await
            .unwrap();
        let second = svc
            .submit_order(&captured_payment(), &cart(), &customer())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn failed_submission_is_not_recorded_as_relayed() {
        let mut client = MockCommercePlatformClient::new();
        let mut attempts = 0;
        client.expect_create_order().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(ServiceError::CommerceOrderFailed {
                    details: "502: upstream hiccup".into(),
                })
            } else {
                Ok(CreatedCommerceOrder {
                    id: 1,
                    name: "#1".into(),
                    order_number: None,
                    order_status_url: None,
                })
            }
        });

        let svc = service(client);
        let err = svc
            .submit_order(&captured_payment(), &cart(), &customer())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CommerceOrderFailed { .. }));

        // A later retry by the caller may still succeed.
        let created = svc
            .submit_order(&captured_payment(), &cart(), &customer())
            .await
            .unwrap();
        assert_eq!(created.id, 1);
    }
}
