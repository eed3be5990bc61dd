use super::super::storage::StorageError;
use super::super::traits::OrderError;
use crate::collab::CollabError;
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Coupon service error: {0}")]
    CouponService(String),
}

/// Classify storage failures into error codes (the client localizes them)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return CommandErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    CommandErrorCode::SystemBusy
}

fn order_error_code(e: &OrderError) -> CommandErrorCode {
    match e {
        OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
        OrderError::OrderAlreadyClosed(_) => CommandErrorCode::OrderAlreadyClosed,
        OrderError::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
        OrderError::ItemAlreadySent(_) => CommandErrorCode::ItemAlreadySent,
        OrderError::RoundNotFound(_) => CommandErrorCode::RoundNotFound,
        OrderError::Validation(_) => CommandErrorCode::ValidationError,
        OrderError::Overpayment { .. } => CommandErrorCode::Overpayment,
        OrderError::InvalidCoupon(_) => CommandErrorCode::InvalidCoupon,
        OrderError::NotFullyPaid { .. } => CommandErrorCode::NotFullyPaid,
        OrderError::DiscountAlreadyApplied => CommandErrorCode::DiscountAlreadyApplied,
        OrderError::DiscountBelowPaid { .. } => CommandErrorCode::DiscountBelowPaid,
        OrderError::StaleVersion { .. } => CommandErrorCode::StaleVersion,
        OrderError::Storage(_) => CommandErrorCode::InternalError,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::Order(e) => (order_error_code(&e), e.to_string()),
            ManagerError::CouponService(msg) => (CommandErrorCode::RemoteError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<CollabError> for ManagerError {
    fn from(err: CollabError) -> Self {
        match err {
            // The service saw the code and said no
            CollabError::Rejected(reason) => ManagerError::Order(OrderError::InvalidCoupon(reason)),
            other => ManagerError::CouponService(other.to_string()),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
