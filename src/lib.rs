//! Checkout Relay Library
//!
//! A stateless payment-to-commerce bridge: mints payment-gateway orders,
//! verifies completed payments, and creates the matching commerce-platform
//! order.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod clients;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{routing::get, Router};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub orders: services::orders::OrderService,
    pub verification: Arc<services::verification::VerificationService>,
    pub customers: services::customers::CustomerService,
}

impl AppState {
    /// Wires the service graph on top of the two upstream clients. Used by
    /// `main` with the reqwest-backed clients and by tests with stubs.
    pub fn new(
        config: config::AppConfig,
        gateway: Arc<dyn clients::gateway::PaymentGatewayClient>,
        commerce: Arc<dyn clients::commerce::CommercePlatformClient>,
    ) -> Self {
        let commerce_orders = services::commerce::CommerceOrderService::new(
            commerce,
            config.default_country.clone(),
            config.gateway_name.clone(),
        );
        let verification = Arc::new(services::verification::VerificationService::new(
            gateway.clone(),
            commerce_orders,
            config.gateway_key_secret.clone(),
        ));
        let orders =
            services::orders::OrderService::new(gateway.clone(), config.default_currency.clone());
        let customers = services::customers::CustomerService::new(gateway);

        Self {
            config,
            orders,
            verification,
            customers,
        }
    }
}

/// Relay routes: banner, health, payments, customers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "checkout-relay up" }))
        .route("/health", get(handlers::health::health_check))
        .merge(handlers::payments::payment_routes())
        .merge(handlers::customers::customer_routes())
}
