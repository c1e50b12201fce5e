//! Gateway customer creation (optional storefront flow).

use std::sync::Arc;
use tracing::{info, instrument};

use crate::clients::gateway::{CreateGatewayCustomer, GatewayCustomer, PaymentGatewayClient};
use crate::errors::ServiceError;

#[derive(Clone)]
pub struct CustomerService {
    gateway: Arc<dyn PaymentGatewayClient>,
}

impl CustomerService {
    pub fn new(gateway: Arc<dyn PaymentGatewayClient>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateGatewayCustomer,
    ) -> Result<GatewayCustomer, ServiceError> {
        info!("creating gateway customer");
        self.gateway.create_customer(request).await
    }
}
