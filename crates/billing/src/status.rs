//! Status transitions and advisory reclassification.
//!
//! The store owns status. This module only says which transitions are legal
//! and what status the dates suggest; applying the suggestion is up to the
//! caller.

use cable_core::config::BillingConfig;
use cable_core::{BillingError, BillingResult, Customer, CustomerStatus};
use chrono::NaiveDate;

use crate::overdue::days_overdue;

pub fn can_transition(from: CustomerStatus, to: CustomerStatus) -> bool {
    use CustomerStatus::*;
    match (from, to) {
        _ if from == to => true,
        (DueButActive, Paid) | (DueButActive, Overdue) => true,
        (Overdue, Paid) | (Overdue, DueButActive) => true,
        (Paid, DueButActive) => true,
        // Paid -> Overdue: a paid customer has to fall due first.
        _ => false,
    }
}

pub fn check_transition(from: CustomerStatus, to: CustomerStatus) -> BillingResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(BillingError::InvalidTransition { from, to })
    }
}

/// Status the dates point to, if different from the current one.
pub fn advise_status(
    customer: &Customer,
    today: NaiveDate,
    cfg: &BillingConfig,
) -> Option<CustomerStatus> {
    match customer.status {
        CustomerStatus::Paid => match customer.next_due_date {
            Some(due) if due <= today => Some(CustomerStatus::DueButActive),
            _ => None,
        },
        CustomerStatus::DueButActive => {
            let late = days_overdue(customer.next_due_date, today);
            (late > cfg.overdue_after_days).then_some(CustomerStatus::Overdue)
        }
        CustomerStatus::Overdue => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cable_core::{CustomerId, PaymentPlan};
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn customer(status: CustomerStatus, next_due: Option<NaiveDate>) -> Customer {
        Customer {
            id: CustomerId::from("c"),
            name: "C".into(),
            phone: None,
            address: None,
            payment_plan: PaymentPlan::Monthly,
            last_paid_date: None,
            next_due_date: next_due,
            status,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_transition_table() {
        use CustomerStatus::*;
        assert!(can_transition(DueButActive, Paid));
        assert!(can_transition(DueButActive, Overdue));
        assert!(can_transition(Paid, DueButActive));
        assert!(can_transition(Overdue, Paid));
        assert!(can_transition(Overdue, DueButActive));
        assert!(can_transition(Paid, Paid));
        assert!(!can_transition(Paid, Overdue));
        assert!(matches!(
            check_transition(Paid, Overdue),
            Err(BillingError::InvalidTransition { from: Paid, to: Overdue })
        ));
    }

    #[test]
    fn test_paid_falls_due_on_due_date() {
        let cfg = BillingConfig::default();
        let c = customer(CustomerStatus::Paid, Some(ymd(2024, 4, 15)));
        assert_eq!(advise_status(&c, ymd(2024, 4, 14), &cfg), None);
        assert_eq!(
            advise_status(&c, ymd(2024, 4, 15), &cfg),
            Some(CustomerStatus::DueButActive)
        );
    }

    #[test]
    fn test_due_becomes_overdue_after_grace() {
        let cfg = BillingConfig {
            overdue_after_days: 5,
            upcoming_window_days: 7,
        };
        let c = customer(CustomerStatus::DueButActive, Some(ymd(2024, 4, 15)));
        assert_eq!(advise_status(&c, ymd(2024, 4, 20), &cfg), None);
        assert_eq!(
            advise_status(&c, ymd(2024, 4, 21), &cfg),
            Some(CustomerStatus::Overdue)
        );
    }

    #[test]
    fn test_never_paid_due_customer_is_left_alone() {
        let c = customer(CustomerStatus::DueButActive, None);
        assert_eq!(advise_status(&c, ymd(2030, 1, 1), &BillingConfig::default()), None);
    }

    #[test]
    fn test_overdue_has_no_advice() {
        let c = customer(CustomerStatus::Overdue, Some(ymd(2024, 1, 1)));
        assert_eq!(advise_status(&c, ymd(2024, 6, 1), &BillingConfig::default()), None);
    }
}
