//! Monthly revenue report.
//!
//! A report reflects *current* status: a customer who paid in the target
//! month but has since been marked `Overdue` is not counted as paid. This
//! keeps the report's paid count equal to the live dashboard's for the same
//! month.

use cable_core::dates::month_bounds;
use cable_core::{BillingResult, Customer, CustomerStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pricing::PlanPricing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_customers: usize,
    pub paid_customers: Vec<Customer>,
    pub due_customers: Vec<Customer>,
    pub paid_count: usize,
    pub due_count: usize,
    pub total_revenue: u64,
}

impl MonthlyReport {
    /// e.g. `March 2024`.
    pub fn period_label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}

fn within(date: Option<NaiveDate>, start: NaiveDate, end: NaiveDate) -> bool {
    matches!(date, Some(d) if start <= d && d <= end)
}

fn paid_in_month(c: &Customer, start: NaiveDate, end: NaiveDate) -> bool {
    c.status == CustomerStatus::Paid && within(c.last_paid_date, start, end)
}

fn due_in_month(c: &Customer, start: NaiveDate, end: NaiveDate) -> bool {
    if !within(c.next_due_date, start, end) {
        return false;
    }
    let settled_this_cycle = c.status == CustomerStatus::Paid
        && matches!(c.last_paid_date, Some(paid) if paid >= start);
    !settled_this_cycle
}

/// Aggregate paid/due customers and revenue for `(year, month)`.
///
/// Dates are calendar dates, so "on or before the last day" is the same
/// bound as "before 23:59:59 on the last day".
pub fn calculate_monthly_report(
    customers: &[Customer],
    year: i32,
    month: u32,
    pricing: &PlanPricing,
) -> BillingResult<MonthlyReport> {
    let (start, end) = month_bounds(year, month)?;

    let paid_customers: Vec<Customer> = customers
        .iter()
        .filter(|c| paid_in_month(c, start, end))
        .cloned()
        .collect();
    let due_customers: Vec<Customer> = customers
        .iter()
        .filter(|c| due_in_month(c, start, end))
        .cloned()
        .collect();
    let total_revenue: u64 = paid_customers
        .iter()
        .map(|c| pricing.cost(c.payment_plan))
        .sum();

    debug!(
        year,
        month,
        total = customers.len(),
        paid = paid_customers.len(),
        due = due_customers.len(),
        revenue = total_revenue,
        "Monthly report calculated"
    );

    Ok(MonthlyReport {
        year,
        month,
        total_customers: customers.len(),
        paid_count: paid_customers.len(),
        due_count: due_customers.len(),
        paid_customers,
        due_customers,
        total_revenue,
    })
}
