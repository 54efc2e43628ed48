//! Shared domain model for the cable billing workspace: customers, plans,
//! statuses, calendar helpers, configuration and the error taxonomy.

pub mod config;
pub mod dates;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{BillingError, BillingResult};
pub use types::{Customer, CustomerId, CustomerStatus, PaymentPlan, PaymentRecord};
