//! Billing status engine for the cable subscription tracker.
//!
//! Pure functions over customer snapshots: plan pricing, billing cycles,
//! days overdue, monthly revenue reports, dashboard figures, search and
//! status advice. Nothing here holds state or performs I/O; the customer
//! store owns the data and decides which advice to apply.

pub mod cycle;
pub mod dashboard;
pub mod overdue;
pub mod pricing;
pub mod report;
pub mod search;
pub mod status;

pub use dashboard::{dashboard_stats, DashboardStats, DueEntry};
pub use overdue::{days_overdue, format_overdue_duration};
pub use pricing::PlanPricing;
pub use report::{calculate_monthly_report, MonthlyReport};
pub use search::CustomerFilter;
