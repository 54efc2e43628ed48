//! Dashboard figures: status counts and the upcoming-due list.

use cable_core::config::BillingConfig;
use cable_core::{Customer, CustomerId, CustomerStatus, PaymentPlan};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::overdue::{days_overdue, format_overdue_duration};

/// One row of the upcoming-due list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueEntry {
    pub customer_id: CustomerId,
    pub name: String,
    pub payment_plan: PaymentPlan,
    pub status: CustomerStatus,
    pub next_due_date: NaiveDate,
    pub days_overdue: u32,
    pub overdue_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: usize,
    pub paid_customers: usize,
    pub due_customers: usize,
    pub overdue_customers: usize,
    pub upcoming_due: Vec<DueEntry>,
}

fn count_status(customers: &[Customer], status: CustomerStatus) -> usize {
    customers.iter().filter(|c| c.status == status).count()
}

pub fn dashboard_stats(
    customers: &[Customer],
    today: NaiveDate,
    cfg: &BillingConfig,
) -> DashboardStats {
    let horizon = today + Duration::days(i64::from(cfg.upcoming_window_days));

    let mut upcoming_due: Vec<DueEntry> = customers
        .iter()
        .filter_map(|c| {
            let due = c.next_due_date.filter(|d| *d <= horizon)?;
            let days = days_overdue(Some(due), today);
            Some(DueEntry {
                customer_id: c.id.clone(),
                name: c.name.clone(),
                payment_plan: c.payment_plan,
                status: c.status,
                next_due_date: due,
                days_overdue: days,
                overdue_label: format_overdue_duration(days),
            })
        })
        .collect();
    upcoming_due.sort_by(|a, b| {
        a.next_due_date
            .cmp(&b.next_due_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    DashboardStats {
        total_customers: customers.len(),
        paid_customers: count_status(customers, CustomerStatus::Paid),
        due_customers: count_status(customers, CustomerStatus::DueButActive),
        overdue_customers: count_status(customers, CustomerStatus::Overdue),
        upcoming_due,
    }
}

/// Drill-down behind a status card; `None` lists everyone.
pub fn customers_by_status(customers: &[Customer], status: Option<CustomerStatus>) -> Vec<Customer> {
    customers
        .iter()
        .filter(|c| status.map_or(true, |s| c.status == s))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn customer(name: &str, status: CustomerStatus, next_due: Option<NaiveDate>) -> Customer {
        Customer {
            id: CustomerId::from(name),
            name: name.into(),
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

    fn fixture() -> Vec<Customer> {
        vec![
            customer("Anil", CustomerStatus::Paid, Some(ymd(2024, 4, 20))),
            customer("Bala", CustomerStatus::DueButActive, Some(ymd(2024, 4, 12))),
            customer("Chitra", CustomerStatus::Overdue, Some(ymd(2024, 2, 25))),
            customer("Devi", CustomerStatus::Paid, Some(ymd(2024, 4, 17))),
            customer("Esha", CustomerStatus::DueButActive, None),
        ]
    }

    #[test]
    fn test_status_counts() {
        let stats = dashboard_stats(&fixture(), ymd(2024, 4, 10), &BillingConfig::default());
        assert_eq!(stats.total_customers, 5);
        assert_eq!(stats.paid_customers, 2);
        assert_eq!(stats.due_customers, 2);
        assert_eq!(stats.overdue_customers, 1);
    }

    #[test]
    fn test_upcoming_due_window_and_order() {
        let stats = dashboard_stats(&fixture(), ymd(2024, 4, 10), &BillingConfig::default());
        let names: Vec<_> = stats.upcoming_due.iter().map(|e| e.name.as_str()).collect();
        // Anil (Apr 20) is outside the 7-day window, Esha has no due date.
        assert_eq!(names, vec!["Chitra", "Bala", "Devi"]);

        let chitra = &stats.upcoming_due[0];
        assert_eq!(chitra.days_overdue, 45);
        assert_eq!(chitra.overdue_label, "1 month 15 days overdue");
        assert_eq!(stats.upcoming_due[1].overdue_label, "");
    }

    #[test]
    fn test_customers_by_status() {
        let all = fixture();
        assert_eq!(customers_by_status(&all, None).len(), 5);
        let overdue = customers_by_status(&all, Some(CustomerStatus::Overdue));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].name, "Chitra");
    }
}
