//! Customer store for the cable billing workspace.
//!
//! Owns customer records, payment history and status changes. Status moves
//! only through the transitions the billing engine allows. Data lives in
//! DashMap and can be loaded from, or written back to, JSON snapshots in the
//! REST backend's response shape.

pub mod snapshot;
pub mod store;

pub use snapshot::StoreSnapshot;
pub use store::{BulkOutcome, CustomerStore, NewCustomer, ResetSummary};
