use std::path::Path;
use std::sync::Arc;

use crate::collab::{HttpCouponValidator, HttpInvoiceIssuer};
use crate::config::Config;
use crate::orders::money::CurrencyConfig;
use crate::orders::OrdersManager;

/// Server state - shared handles for the HTTP layer
///
/// Cloning is shallow; the manager is shared through an `Arc`.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Order command engine
    pub orders: Arc<OrdersManager>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("orders", &self.orders)
            .finish()
    }
}

impl ServerState {
    /// Initialize all services from the configuration
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = Path::new(&config.work_dir).join("orders.redb");

        let mut manager = OrdersManager::new(
            &db_path,
            config.vat_rate,
            CurrencyConfig {
                decimal_places: config.currency_decimals,
            },
        )?;

        if let Some(url) = &config.coupon_service_url {
            tracing::info!(url = %url, "Coupon service configured");
            manager.set_coupon_validator(Arc::new(HttpCouponValidator::new(url.clone())));
        }
        if let Some(url) = &config.invoice_service_url {
            tracing::info!(url = %url, "Invoice service configured");
            manager.set_invoice_issuer(Arc::new(HttpInvoiceIssuer::new(url.clone())));
        }

        tracing::info!(db = %db_path.display(), "Order storage opened");

        Ok(Self {
            config: config.clone(),
            orders: Arc::new(manager),
        })
    }
}
