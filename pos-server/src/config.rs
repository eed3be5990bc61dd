//! Server configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/pos | Work directory (order database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | VAT_RATE | 21.0 | VAT rate (percent), frozen onto new orders |
//! | CURRENCY_DECIMALS | 2 | Minor-unit digits of the currency |
//! | COUPON_SERVICE_URL | (unset) | Coupon service base URL |
//! | INVOICE_SERVICE_URL | (unset) | Invoice service base URL |
//! | ENVIRONMENT | development | development / staging / production |
//!
//! ```ignore
//! WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
//! ```

#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory, holds the order database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// VAT rate (percent) applied to new orders
    pub vat_rate: f64,
    /// Minor-unit digits of the operating currency
    pub currency_decimals: u32,
    /// Coupon service base URL; COUPON discounts fail without it
    pub coupon_service_url: Option<String>,
    /// Invoice service base URL; closes skip invoicing without it
    pub invoice_service_url: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/pos".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            vat_rate: std::env::var("VAT_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(21.0),
            currency_decimals: std::env::var("CURRENCY_DECIMALS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            coupon_service_url: std::env::var("COUPON_SERVICE_URL").ok(),
            invoice_service_url: std::env::var("INVOICE_SERVICE_URL").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Production gates file logging and stricter defaults
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_production_matches_environment() {
        let mut config = Config::from_env();
        config.environment = "production".to_string();
        assert!(config.is_production());
        config.environment = "development".to_string();
        assert!(!config.is_production());
    }
}
