//! JSON snapshots in the backend's `/customers` response shape, with the
//! payment history carried alongside.

use cable_core::types::{ApiEnvelope, CustomerRecord, PaymentRecordWire};
use cable_core::{BillingResult, Customer, PaymentRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::store::CustomerStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(flatten)]
    pub customers: ApiEnvelope<Vec<CustomerRecord>>,
    #[serde(default)]
    pub payments: Vec<PaymentRecordWire>,
}

impl CustomerStore {
    /// Load customers (and history, if present) from a snapshot file.
    /// A record with a bad plan, status or date fails the whole load.
    pub fn load_snapshot(&self, path: &Path) -> BillingResult<usize> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;

        let customers = snapshot
            .customers
            .into_data()?
            .into_iter()
            .map(Customer::try_from)
            .collect::<BillingResult<Vec<_>>>()?;
        let payments = snapshot
            .payments
            .into_iter()
            .map(PaymentRecord::try_from)
            .collect::<BillingResult<Vec<_>>>()?;

        let count = self.import(customers);
        self.import_history(payments);
        info!(path = %path.display(), count, "Snapshot loaded");
        Ok(count)
    }

    pub fn save_snapshot(&self, path: &Path) -> BillingResult<()> {
        let customers = self.list();
        let mut payments = Vec::new();
        for c in &customers {
            for rec in self.payment_history(&c.id, usize::MAX)? {
                payments.push(PaymentRecordWire::from(&rec));
            }
        }
        let snapshot = StoreSnapshot {
            customers: ApiEnvelope::ok(customers.iter().map(CustomerRecord::from).collect()),
            payments,
        };
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        info!(path = %path.display(), count = customers.len(), "Snapshot saved");
        Ok(())
    }
}
