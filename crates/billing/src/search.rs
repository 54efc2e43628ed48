//! Customer search and filter chips.

use cable_core::dates::format_display_date;
use cable_core::{Customer, CustomerStatus, PaymentPlan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Search criteria. Every `None` field means "any".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub status: Option<CustomerStatus>,
    pub payment_plan: Option<PaymentPlan>,
    /// Inclusive lower bound on the next due date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the next due date.
    pub end_date: Option<NaiveDate>,
}

impl CustomerFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(query) = self.name.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !customer
                .name
                .to_lowercase()
                .contains(&query.to_lowercase())
            {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != customer.status) {
            return false;
        }
        if self.payment_plan.is_some_and(|p| p != customer.payment_plan) {
            return false;
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(due) = customer.next_due_date else {
                return false;
            };
            if self.start_date.is_some_and(|start| due < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| due > end) {
                return false;
            }
        }
        true
    }

    /// Human-readable chips for the filters in effect.
    pub fn active_filters(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            chips.push(format!("Name: {}", name.trim()));
        }
        if let Some(status) = self.status {
            chips.push(format!("Status: {status}"));
        }
        if let Some(plan) = self.payment_plan {
            chips.push(format!("Plan: {plan}"));
        }
        if let Some(start) = self.start_date {
            chips.push(format!("From: {}", format_display_date(Some(start))));
        }
        if let Some(end) = self.end_date {
            chips.push(format!("To: {}", format_display_date(Some(end))));
        }
        chips
    }
}

pub fn search(customers: &[Customer], filter: &CustomerFilter) -> Vec<Customer> {
    let mut hits: Vec<Customer> = customers
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect();
    hits.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    hits
}
