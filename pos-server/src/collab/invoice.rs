//! Invoice service client
//!
//! Invoices are issued AFTER the closing transaction commits, best-effort:
//! a failure is reported to the operator but never rolls the close back.

use async_trait::async_trait;
use serde::Deserialize;
use shared::order::OrderSnapshot;

use super::{CollabError, CollabResult};
use crate::orders::money::vat_amount;

/// Issues a fiscal invoice for a closed order
#[async_trait]
pub trait InvoiceIssuer: Send + Sync {
    /// Returns the invoice number assigned by the service
    async fn create_invoice(&self, order: &OrderSnapshot) -> CollabResult<String>;
}

/// HTTP invoice service client
pub struct HttpInvoiceIssuer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInvoiceIssuer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl InvoiceIssuer for HttpInvoiceIssuer {
    async fn create_invoice(&self, order: &OrderSnapshot) -> CollabResult<String> {
        let resp = self
            .client
            .post(format!("{}/api/invoices", self.base_url))
            .json(&serde_json::json!({
                "order_id": order.order_id,
                "table_id": order.table_id,
                "subtotal": order.subtotal,
                "discount": order.discount.as_ref().map(|d| d.amount),
                "total": order.total,
                "vat_rate": order.vat_rate,
                "vat_amount": vat_amount(order.total, order.vat_rate, order.currency_decimals),
                "payments": order.payments,
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CollabError::Remote(format!(
                "invoice service returned {}",
                resp.status()
            )));
        }

        #[derive(Deserialize)]
        struct InvoiceResponse {
            success: bool,
            invoice_number: Option<String>,
            error: Option<String>,
        }

        let data: InvoiceResponse = resp
            .json()
            .await
            .map_err(|e| CollabError::Remote(format!("invalid invoice service response: {e}")))?;

        if !data.success {
            return Err(CollabError::Rejected(data.error.unwrap_or_default()));
        }

        data.invoice_number.ok_or_else(|| {
            CollabError::Remote("invoice service sent no invoice number".to_string())
        })
    }
}

/// Test double: hands out a fixed invoice number, or fails on demand
#[cfg(test)]
pub struct StaticInvoiceIssuer {
    pub invoice_number: Option<String>,
}

#[cfg(test)]
#[async_trait]
impl InvoiceIssuer for StaticInvoiceIssuer {
    async fn create_invoice(&self, _order: &OrderSnapshot) -> CollabResult<String> {
        match &self.invoice_number {
            Some(n) => Ok(n.clone()),
            None => Err(CollabError::Remote("invoice service down".to_string())),
        }
    }
}
