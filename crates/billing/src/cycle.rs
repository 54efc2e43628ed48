//! Billing-cycle arithmetic.

use cable_core::dates::add_months;
use cable_core::PaymentPlan;
use chrono::NaiveDate;

/// Due date of the cycle that starts on `last_paid`.
pub fn next_due_date(last_paid: NaiveDate, plan: PaymentPlan) -> NaiveDate {
    add_months(last_paid, plan.cycle_months())
}

/// `None` for customers who have never paid.
pub fn derive_next_due(last_paid: Option<NaiveDate>, plan: PaymentPlan) -> Option<NaiveDate> {
    last_paid.map(|d| next_due_date(d, plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cycle_lengths() {
        let paid = ymd(2024, 3, 15);
        assert_eq!(next_due_date(paid, PaymentPlan::Monthly), ymd(2024, 4, 15));
        assert_eq!(next_due_date(paid, PaymentPlan::HalfYearly), ymd(2024, 9, 15));
        assert_eq!(next_due_date(paid, PaymentPlan::Yearly), ymd(2025, 3, 15));
    }

    #[test]
    fn test_month_end_payment_clamps() {
        assert_eq!(
            next_due_date(ymd(2024, 1, 31), PaymentPlan::Monthly),
            ymd(2024, 2, 29)
        );
        assert_eq!(
            next_due_date(ymd(2024, 2, 29), PaymentPlan::Yearly),
            ymd(2025, 2, 28)
        );
    }

    #[test]
    fn test_never_paid_has_no_due_date() {
        assert_eq!(derive_next_due(None, PaymentPlan::Monthly), None);
    }
}
