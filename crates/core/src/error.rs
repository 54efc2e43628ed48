use thiserror::Error;

use crate::types::CustomerStatus;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid payment plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid customer status: {0}")]
    InvalidStatus(String),

    #[error("Status transition not allowed: {from} -> {to}")]
    InvalidTransition {
        from: CustomerStatus,
        to: CustomerStatus,
    },

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Payment record not found: {0}")]
    PaymentNotFound(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
