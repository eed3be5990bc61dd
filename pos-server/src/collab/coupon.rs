//! Coupon service client
//!
//! Coupons are resolved BEFORE the order write transaction opens, so the
//! transaction never waits on the network.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CollabError, CollabResult};

/// What the coupon service granted for a code
#[derive(Debug, Clone)]
pub struct CouponResolution {
    /// Absolute discount amount, in the order's currency
    pub discount_amount: f64,
}

/// Validates a coupon code against the current order amount
#[async_trait]
pub trait CouponValidator: Send + Sync {
    async fn validate(&self, code: &str, order_amount: f64) -> CollabResult<CouponResolution>;
}

/// HTTP coupon service client
pub struct HttpCouponValidator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCouponValidator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CouponValidator for HttpCouponValidator {
    async fn validate(&self, code: &str, order_amount: f64) -> CollabResult<CouponResolution> {
        let resp = self
            .client
            .post(format!("{}/api/coupons/validate", self.base_url))
            .json(&serde_json::json!({ "code": code, "order_amount": order_amount }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CollabError::Remote(format!(
                "coupon service returned {}",
                resp.status()
            )));
        }

        #[derive(Deserialize)]
        struct ValidateResponse {
            valid: bool,
            discount_amount: Option<f64>,
            reason: Option<String>,
        }

        let data: ValidateResponse = resp
            .json()
            .await
            .map_err(|e| CollabError::Remote(format!("invalid coupon service response: {e}")))?;

        if !data.valid {
            return Err(CollabError::Rejected(
                data.reason.unwrap_or_else(|| "coupon not valid".to_string()),
            ));
        }

        match data.discount_amount {
            Some(amount) if amount > 0.0 => Ok(CouponResolution {
                discount_amount: amount,
            }),
            _ => Err(CollabError::Remote(
                "coupon service accepted the code but sent no amount".to_string(),
            )),
        }
    }
}

/// Test double: resolves codes from a fixed table
#[cfg(test)]
pub struct StaticCouponValidator {
    pub coupons: std::collections::HashMap<String, f64>,
}

#[cfg(test)]
impl StaticCouponValidator {
    pub fn with_coupon(code: &str, amount: f64) -> Self {
        let mut coupons = std::collections::HashMap::new();
        coupons.insert(code.to_string(), amount);
        Self { coupons }
    }
}

#[cfg(test)]
#[async_trait]
impl CouponValidator for StaticCouponValidator {
    async fn validate(&self, code: &str, _order_amount: f64) -> CollabResult<CouponResolution> {
        match self.coupons.get(code) {
            Some(&discount_amount) => Ok(CouponResolution { discount_amount }),
            None => Err(CollabError::Rejected(format!("unknown code: {code}"))),
        }
    }
}
