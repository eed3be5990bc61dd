//! External collaborator clients
//!
//! The order engine talks to two remote services: the coupon service
//! (validates coupon codes before a discount is applied) and the invoice
//! service (issues a fiscal invoice number when an order closes). Both
//! are behind traits so the manager can be tested without a network.

use thiserror::Error;

mod coupon;
mod invoice;

pub use coupon::{CouponResolution, CouponValidator, HttpCouponValidator};
pub use invoice::{HttpInvoiceIssuer, InvoiceIssuer};

#[cfg(test)]
pub use coupon::StaticCouponValidator;
#[cfg(test)]
pub use invoice::StaticInvoiceIssuer;

/// Collaborator call errors
#[derive(Debug, Error)]
pub enum CollabError {
    /// The service answered and said no (e.g. unknown coupon code)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The service could not be reached or answered garbage
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type CollabResult<T> = Result<T, CollabError>;
