//! Customer store: customer records, payment history and every operator
//! action that changes payment status. Backed by DashMap; the REST backend
//! is the production source of truth and is mirrored through snapshots.
//!
//! Lock order is always `customers` before `history`.

use cable_billing::cycle::derive_next_due;
use cable_billing::status::{advise_status, check_transition};
use cable_billing::PlanPricing;
use cable_core::config::BillingConfig;
use cable_core::{
    BillingError, BillingResult, Customer, CustomerId, CustomerStatus, PaymentPlan, PaymentRecord,
};
use chrono::{Duration, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fields an operator supplies when adding a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub payment_plan: PaymentPlan,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Result of a bulk action. Failures do not stop the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<CustomerId>,
    pub failed: Vec<(CustomerId, String)>,
}

impl BulkOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub customers_reset: usize,
    pub history_records_deleted: usize,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory customer store backed by `DashMap`.
pub struct CustomerStore {
    customers: Arc<DashMap<CustomerId, Customer>>,
    history: Arc<DashMap<CustomerId, Vec<PaymentRecord>>>,
    pricing: PlanPricing,
}

impl Default for CustomerStore {
    fn default() -> Self {
        Self::new(PlanPricing::default())
    }
}

impl CustomerStore {
    /// Create a new empty store that prices payments with `pricing`.
    pub fn new(pricing: PlanPricing) -> Self {
        info!(currency = pricing.currency(), "CustomerStore initialized");
        Self {
            customers: Arc::new(DashMap::new()),
            history: Arc::new(DashMap::new()),
            pricing,
        }
    }

    pub fn pricing(&self) -> &PlanPricing {
        &self.pricing
    }

    // -- customers --

    /// Add a customer who has not paid yet.
    pub fn add_customer(&self, new: NewCustomer) -> Customer {
        let customer = Customer {
            id: CustomerId::generate(),
            name: new.name.trim().to_string(),
            phone: new.phone,
            address: new.address,
            payment_plan: new.payment_plan,
            last_paid_date: None,
            next_due_date: None,
            status: CustomerStatus::DueButActive,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        };
        info!(customer_id = %customer.id, plan = %customer.payment_plan, "Customer added");
        self.customers.insert(customer.id.clone(), customer.clone());
        customer
    }

    /// Insert or replace customers wholesale, e.g. from a backend export.
    pub fn import(&self, customers: Vec<Customer>) -> usize {
        let count = customers.len();
        for c in customers {
            self.customers.insert(c.id.clone(), c);
        }
        info!(count, "Customers imported");
        count
    }

    /// Append history records as-is (snapshot restore).
    pub fn import_history(&self, records: Vec<PaymentRecord>) {
        for rec in records {
            self.history
                .entry(rec.customer_id.clone())
                .or_default()
                .push(rec);
        }
    }

    pub fn get(&self, id: &CustomerId) -> BillingResult<Customer> {
        self.customers
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))
    }

    pub fn list(&self) -> Vec<Customer> {
        let mut list: Vec<_> = self.customers.iter().map(|e| e.value().clone()).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Rename and/or change plan. A plan change moves the due date.
    pub fn update_details(
        &self,
        id: &CustomerId,
        name: Option<String>,
        payment_plan: Option<PaymentPlan>,
    ) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            entry.name = name.trim().to_string();
        }
        if let Some(plan) = payment_plan {
            entry.payment_plan = plan;
            entry.next_due_date = derive_next_due(entry.last_paid_date, plan);
        }
        info!(customer_id = %id, "Customer details updated");
        Ok(entry.clone())
    }

    pub fn update_notes(&self, id: &CustomerId, notes: Option<String>) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        entry.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(entry.clone())
    }

    /// Remove a customer together with their payment history.
    pub fn delete_customer(&self, id: &CustomerId) -> BillingResult<Customer> {
        let (_, removed) = self
            .customers
            .remove(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        let dropped = self.history.remove(id).map(|(_, h)| h.len()).unwrap_or(0);
        info!(customer_id = %id, history_dropped = dropped, "Customer deleted");
        Ok(removed)
    }

    // -- status actions --

    /// Mark a customer paid on `payment_date` and start a new cycle.
    pub fn record_payment(
        &self,
        id: &CustomerId,
        payment_date: NaiveDate,
        notes: Option<String>,
    ) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        check_transition(entry.status, CustomerStatus::Paid)?;

        entry.status = CustomerStatus::Paid;
        entry.last_paid_date = Some(payment_date);
        entry.next_due_date = derive_next_due(Some(payment_date), entry.payment_plan);

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            customer_id: id.clone(),
            payment_date,
            payment_plan: entry.payment_plan,
            amount: Some(self.pricing.cost(entry.payment_plan)),
            status: CustomerStatus::Paid,
            notes,
            recorded_at: Utc::now(),
        };
        self.history.entry(id.clone()).or_default().push(record);

        info!(
            customer_id = %id,
            paid_on = %payment_date,
            next_due = ?entry.next_due_date,
            "Payment recorded"
        );
        Ok(entry.clone())
    }

    /// Mark a customer "Due but Active" and log the change in their history.
    pub fn mark_due(&self, id: &CustomerId, on: NaiveDate) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        check_transition(entry.status, CustomerStatus::DueButActive)?;
        entry.status = CustomerStatus::DueButActive;

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            customer_id: id.clone(),
            payment_date: on,
            payment_plan: entry.payment_plan,
            amount: None,
            status: CustomerStatus::DueButActive,
            notes: None,
            recorded_at: Utc::now(),
        };
        self.history.entry(id.clone()).or_default().push(record);

        info!(customer_id = %id, "Customer marked due");
        Ok(entry.clone())
    }

    pub fn mark_overdue(&self, id: &CustomerId) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        check_transition(entry.status, CustomerStatus::Overdue)?;
        entry.status = CustomerStatus::Overdue;
        info!(customer_id = %id, "Customer marked overdue");
        Ok(entry.clone())
    }

    // -- history --

    /// Most recent first, at most `limit` entries.
    pub fn payment_history(&self, id: &CustomerId, limit: usize) -> BillingResult<Vec<PaymentRecord>> {
        if !self.customers.contains_key(id) {
            return Err(BillingError::CustomerNotFound(id.to_string()));
        }
        let mut records = self
            .history
            .get(id)
            .map(|h| h.value().clone())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then_with(|| b.recorded_at.cmp(&a.recorded_at))
        });
        records.truncate(limit);
        Ok(records)
    }

    /// Settle a "Due but Active" history entry. The customer is moved to
    /// `Paid` on the entry's date unless they already are.
    pub fn mark_history_paid(&self, payment_id: Uuid) -> BillingResult<PaymentRecord> {
        let customer_id = self
            .history
            .iter()
            .find(|e| e.value().iter().any(|r| r.id == payment_id))
            .map(|e| e.key().clone())
            .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;

        let mut customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or_else(|| BillingError::CustomerNotFound(customer_id.to_string()))?;
        let mut history = self
            .history
            .get_mut(&customer_id)
            .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;
        let record = history
            .iter_mut()
            .find(|r| r.id == payment_id)
            .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;

        if record.status != CustomerStatus::Paid {
            record.status = CustomerStatus::Paid;
            record.amount.get_or_insert(self.pricing.cost(record.payment_plan));
        }
        if customer.status != CustomerStatus::Paid {
            check_transition(customer.status, CustomerStatus::Paid)?;
            customer.status = CustomerStatus::Paid;
            customer.last_paid_date = Some(record.payment_date);
            customer.next_due_date =
                derive_next_due(Some(record.payment_date), customer.payment_plan);
        }

        info!(customer_id = %customer_id, %payment_id, "History entry marked paid");
        Ok(record.clone())
    }

    /// Delete all payment history and forget the last payment, as one step.
    /// The customer goes back to "Due but Active".
    ///
    /// The customer entry stays locked for the whole operation, so no reader
    /// sees an empty history next to a stale `last_paid_date`.
    pub fn purge_billing_history(&self, id: &CustomerId) -> BillingResult<usize> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        let deleted = self.history.remove(id).map(|(_, h)| h.len()).unwrap_or(0);
        entry.status = CustomerStatus::DueButActive;
        entry.last_paid_date = None;
        entry.next_due_date = None;
        info!(customer_id = %id, deleted, "Billing history purged");
        Ok(deleted)
    }

    /// Clear `last_paid_date` for customers whose history was removed
    /// before purges reset it. A customer with no payment on record is
    /// "Due but Active".
    pub fn clear_last_paid_date(&self, id: &CustomerId) -> BillingResult<Customer> {
        let mut entry = self
            .customers
            .get_mut(id)
            .ok_or_else(|| BillingError::CustomerNotFound(id.to_string()))?;
        entry.status = CustomerStatus::DueButActive;
        entry.last_paid_date = None;
        entry.next_due_date = None;
        info!(customer_id = %id, "Last paid date cleared");
        Ok(entry.clone())
    }

    /// Start everyone over as "Due but Active" with no payment dates.
    pub fn reset_all_payment_data(&self, clear_history: bool) -> ResetSummary {
        let mut summary = ResetSummary::default();
        for mut entry in self.customers.iter_mut() {
            entry.status = CustomerStatus::DueButActive;
            entry.last_paid_date = None;
            entry.next_due_date = None;
            summary.customers_reset += 1;
        }
        if clear_history {
            summary.history_records_deleted = self.history.iter().map(|h| h.len()).sum();
            self.history.clear();
        }
        warn!(
            customers = summary.customers_reset,
            history_deleted = summary.history_records_deleted,
            "All payment data reset"
        );
        summary
    }

    // -- bulk --

    pub fn bulk_mark_paid(&self, ids: &[CustomerId], payment_date: NaiveDate) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.record_payment(id, payment_date, None) {
                Ok(_) => outcome.succeeded.push(id.clone()),
                Err(e) => {
                    warn!(customer_id = %id, error = %e, "Bulk mark-paid failed");
                    outcome.failed.push((id.clone(), e.to_string()));
                }
            }
        }
        outcome
    }

    pub fn bulk_mark_due(&self, ids: &[CustomerId], on: NaiveDate) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.mark_due(id, on) {
                Ok(_) => outcome.succeeded.push(id.clone()),
                Err(e) => {
                    warn!(customer_id = %id, error = %e, "Bulk mark-due failed");
                    outcome.failed.push((id.clone(), e.to_string()));
                }
            }
        }
        outcome
    }

    // -- advice --

    /// Apply the engine's status advice to every customer. Returns the
    /// customers whose status changed, sorted by id.
    pub fn apply_status_advice(
        &self,
        today: NaiveDate,
        cfg: &BillingConfig,
    ) -> Vec<(CustomerId, CustomerStatus)> {
        let mut changed = Vec::new();
        for mut entry in self.customers.iter_mut() {
            let Some(next) = advise_status(entry.value(), today, cfg) else {
                continue;
            };
            if check_transition(entry.status, next).is_ok() {
                entry.status = next;
                changed.push((entry.id.clone(), next));
            }
        }
        changed.sort_by(|a, b| a.0.cmp(&b.0));
        if !changed.is_empty() {
            info!(changed = changed.len(), %today, "Status advice applied");
        }
        changed
    }

    // -- demo data --

    /// Seed a handful of customers in every status, dated relative to `today`.
    pub fn seed_demo_data(&self, today: NaiveDate) {
        let demo = [
            ("Arjun Reddy", PaymentPlan::Monthly, Some(5), CustomerStatus::Paid),
            ("Bhavani Devi", PaymentPlan::HalfYearly, Some(40), CustomerStatus::Paid),
            ("Chandra Shekar", PaymentPlan::Monthly, Some(33), CustomerStatus::DueButActive),
            ("Durga Prasad", PaymentPlan::Yearly, Some(300), CustomerStatus::Paid),
            ("Gowri Shankar", PaymentPlan::Monthly, Some(75), CustomerStatus::Overdue),
            ("Kavitha Rani", PaymentPlan::Monthly, None, CustomerStatus::DueButActive),
        ];

        for (i, (name, plan, paid_days_ago, status)) in demo.into_iter().enumerate() {
            let id = CustomerId(format!("demo-{:03}", i + 1));
            let last_paid = paid_days_ago.map(|d| today - Duration::days(d));
            let customer = Customer {
                id: id.clone(),
                name: name.to_string(),
                phone: None,
                address: Some("Bethigal".to_string()),
                payment_plan: plan,
                last_paid_date: last_paid,
                next_due_date: derive_next_due(last_paid, plan),
                status,
                notes: None,
                created_at: Utc::now(),
            };
            if let Some(paid_on) = last_paid {
                self.history.entry(id.clone()).or_default().push(PaymentRecord {
                    id: Uuid::new_v4(),
                    customer_id: id.clone(),
                    payment_date: paid_on,
                    payment_plan: plan,
                    amount: None,
                    status: CustomerStatus::Paid,
                    notes: None,
                    recorded_at: Utc::now(),
                });
            }
            self.customers.insert(id, customer);
        }
        info!(count = self.customers.len(), "Demo data seeded");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
