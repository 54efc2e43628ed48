//! Cable Admin CLI: monthly reports, dashboard, search and payment actions
//! for the cable subscription tracker.

use anyhow::Context;
use cable_billing::dashboard::customers_by_status;
use cable_billing::search::search;
use cable_billing::{
    calculate_monthly_report, dashboard_stats, days_overdue, format_overdue_duration,
    CustomerFilter, MonthlyReport, PlanPricing,
};
use cable_core::dates::{format_display_date, parse_billing_date, parse_month};
use cable_core::{AppConfig, Customer, CustomerId, CustomerStatus, PaymentPlan};
use cable_store::{CustomerStore, NewCustomer};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cable-admin")]
#[command(about = "Cable subscription billing administration tool")]
#[command(version)]
struct Cli {
    /// Customer snapshot (backend `/customers` JSON); demo data when omitted
    #[arg(long, global = true, env = "CABLE_BILLING__STORE__DATA_FILE")]
    data: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly paid/due report with revenue
    Report {
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Status counts and customers falling due soon
    Dashboard,

    /// Customers past their due date, longest overdue first
    Overdue,

    /// List customers by status ("all" for everyone)
    Status {
        /// Paid, "Due but Active", Overdue or all
        status: String,
    },

    /// Search customers
    Search {
        /// Case-insensitive name fragment
        #[arg(short, long)]
        name: Option<String>,

        /// Paid, "Due but Active" or Overdue
        #[arg(short, long)]
        status: Option<String>,

        /// Monthly, Half-Yearly or Yearly
        #[arg(short, long)]
        plan: Option<String>,

        /// Next due date on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Next due date on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show the plan price list
    Plans,

    /// Add a customer
    Add {
        name: String,

        /// Monthly, Half-Yearly or Yearly
        #[arg(short, long, default_value = "Monthly")]
        plan: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a customer's payment history
    History {
        id: String,

        /// Max entries (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Mark customers as paid
    Pay {
        ids: Vec<String>,

        /// Payment date (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Mark customers as "Due but Active"
    MarkDue { ids: Vec<String> },

    /// Delete a customer's payment history and last paid date
    PurgeHistory { id: String },

    /// Apply suggested status changes (Paid -> Due, Due -> Overdue)
    Sweep,
}

fn parse_status_arg(s: &str) -> anyhow::Result<Option<CustomerStatus>> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    Ok(Some(s.parse()?))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cable_admin=info,cable_store=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let today = match cli.today.as_deref() {
        Some(raw) => parse_billing_date(raw)?,
        None => Local::now().date_naive(),
    };

    let store = CustomerStore::new(PlanPricing::from_config(&config.pricing));
    let data_path = cli
        .data
        .or_else(|| config.store.data_file.as_ref().map(PathBuf::from));
    match &data_path {
        Some(path) => {
            store
                .load_snapshot(path)
                .with_context(|| format!("loading {}", path.display()))?;
        }
        None => {
            info!("No data file given, using demo customers");
            store.seed_demo_data(today);
        }
    }

    let mutated = run(cli.command, &store, &config, today)?;

    if mutated {
        if let Some(path) = &data_path {
            store
                .save_snapshot(path)
                .with_context(|| format!("saving {}", path.display()))?;
        }
    }
    Ok(())
}

/// Run one command. Returns whether the store was changed.
fn run(
    command: Commands,
    store: &CustomerStore,
    config: &AppConfig,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    match command {
        Commands::Report { month, json } => {
            let (year, month) = match month {
                Some(m) => parse_month(&m)?,
                None => (today.year(), today.month()),
            };
            let report = calculate_monthly_report(&store.list(), year, month, store.pricing())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, store.pricing());
            }
            Ok(false)
        }
        Commands::Dashboard => {
            cmd_dashboard(store, config, today);
            Ok(false)
        }
        Commands::Overdue => {
            cmd_overdue(store, today);
            Ok(false)
        }
        Commands::Status { status } => {
            let status = parse_status_arg(&status)?;
            let customers = customers_by_status(&store.list(), status);
            let title = match status {
                Some(CustomerStatus::Paid) => "Paid Customers",
                Some(CustomerStatus::DueButActive) => "Due Customers",
                Some(CustomerStatus::Overdue) => "Overdue Customers",
                None => "All Customers",
            };
            println!("=== {title} ===");
            println!();
            print_customer_table(&customers, today);
            Ok(false)
        }
        Commands::Search {
            name,
            status,
            plan,
            from,
            to,
        } => {
            let filter = CustomerFilter {
                name,
                status: status.as_deref().map(parse_status_arg).transpose()?.flatten(),
                payment_plan: plan.as_deref().map(str::parse).transpose()?,
                start_date: from.as_deref().map(parse_billing_date).transpose()?,
                end_date: to.as_deref().map(parse_billing_date).transpose()?,
            };
            cmd_search(store, &filter, today);
            Ok(false)
        }
        Commands::Plans => {
            cmd_plans(store.pricing());
            Ok(false)
        }
        Commands::Add { name, plan, notes } => {
            let plan: PaymentPlan = plan.parse()?;
            let customer = store.add_customer(NewCustomer {
                name,
                payment_plan: plan,
                phone: None,
                address: None,
                notes,
            });
            println!("Customer \"{}\" added", customer.name);
            println!("  ID:    {}", customer.id);
            println!("  Plan:  {}", customer.payment_plan);
            Ok(true)
        }
        Commands::History { id, limit } => {
            let id = CustomerId(id);
            let customer = store.get(&id)?;
            let limit = limit.unwrap_or(config.store.history_limit);
            cmd_history(store, &customer, limit)?;
            Ok(false)
        }
        Commands::Pay { ids, date } => {
            anyhow::ensure!(!ids.is_empty(), "select at least one customer");
            let date = match date.as_deref() {
                Some(raw) => parse_billing_date(raw)?,
                None => today,
            };
            let ids: Vec<CustomerId> = ids.into_iter().map(CustomerId).collect();
            let outcome = store.bulk_mark_paid(&ids, date);
            print_bulk_result("marked as paid", &outcome);
            Ok(!outcome.succeeded.is_empty())
        }
        Commands::MarkDue { ids } => {
            anyhow::ensure!(!ids.is_empty(), "select at least one customer");
            let ids: Vec<CustomerId> = ids.into_iter().map(CustomerId).collect();
            let outcome = store.bulk_mark_due(&ids, today);
            print_bulk_result("marked as due", &outcome);
            Ok(!outcome.succeeded.is_empty())
        }
        Commands::PurgeHistory { id } => {
            let deleted = store.purge_billing_history(&CustomerId(id))?;
            println!("Payment history cleared: {deleted} record(s) deleted");
            println!("Last paid date has been cleared");
            Ok(true)
        }
        Commands::Sweep => {
            let changed = store.apply_status_advice(today, &config.billing);
            if changed.is_empty() {
                println!("No status changes needed");
            } else {
                println!("Updated {} customer(s):", changed.len());
                for (id, status) in &changed {
                    println!("  {:<38} -> {}", id, status);
                }
            }
            Ok(!changed.is_empty())
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_report(report: &MonthlyReport, pricing: &PlanPricing) {
    let cur = currency_symbol(pricing.currency());

    println!("=== Report for {} ===", report.period_label());
    println!();
    println!("  Total customers:   {}", report.total_customers);
    println!("  Paid customers:    {}", report.paid_count);
    println!("  Due customers:     {}", report.due_count);
    println!(
        "  Total revenue:     {cur}{}",
        format_amount(report.total_revenue)
    );
    println!(
        "  Expected revenue:  {cur}{} (all paid, monthly plan)",
        format_amount(pricing.expected_monthly_revenue(report.total_customers))
    );

    println!();
    println!("  Paid Customers ({})", report.paid_count);
    if report.paid_customers.is_empty() {
        println!("    No customers paid in this month");
    }
    for c in &report.paid_customers {
        println!(
            "    {:<24} Paid on: {:<12} {}",
            truncate(&c.name, 22),
            format_display_date(c.last_paid_date),
            c.payment_plan
        );
    }

    println!();
    println!("  Due Customers ({})", report.due_count);
    if report.due_customers.is_empty() {
        println!("    No customers due in this month");
    }
    for c in &report.due_customers {
        println!(
            "    {:<24} Due: {:<12} {}",
            truncate(&c.name, 22),
            format_display_date(c.next_due_date),
            c.status
        );
    }
}

fn cmd_dashboard(store: &CustomerStore, config: &AppConfig, today: NaiveDate) {
    let stats = dashboard_stats(&store.list(), today, &config.billing);

    println!("=== Dashboard ({}) ===", format_display_date(Some(today)));
    println!();
    println!("  Total customers:    {}", stats.total_customers);
    println!("  Paid:               {}", stats.paid_customers);
    println!("  Due but Active:     {}", stats.due_customers);
    println!("  Overdue:            {}", stats.overdue_customers);
    println!();
    println!(
        "  Upcoming due (next {} days)",
        config.billing.upcoming_window_days
    );
    if stats.upcoming_due.is_empty() {
        println!("    No upcoming payments");
        return;
    }
    println!(
        "    {:<24} {:<12} {:<15} {:<12} Overdue",
        "Name", "Plan", "Status", "Due"
    );
    println!("    {}", "-".repeat(85));
    for e in &stats.upcoming_due {
        println!(
            "    {:<24} {:<12} {:<15} {:<12} {}",
            truncate(&e.name, 22),
            e.payment_plan,
            e.status,
            format_display_date(Some(e.next_due_date)),
            e.overdue_label
        );
    }
}

fn cmd_overdue(store: &CustomerStore, today: NaiveDate) {
    let mut late: Vec<(Customer, u32)> = store
        .list()
        .into_iter()
        .map(|c| {
            let days = days_overdue(c.next_due_date, today);
            (c, days)
        })
        .filter(|(_, days)| *days > 0)
        .collect();
    late.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));

    println!("=== Overdue Customers ===");
    println!();
    if late.is_empty() {
        println!("  Nobody is past their due date");
        return;
    }
    for (c, days) in &late {
        println!(
            "  {:<24} {:<15} due {:<12} {}",
            truncate(&c.name, 22),
            c.status,
            format_display_date(c.next_due_date),
            format_overdue_duration(*days)
        );
    }
    println!();
    println!("  Total: {}", late.len());
}

fn cmd_search(store: &CustomerStore, filter: &CustomerFilter, today: NaiveDate) {
    let hits = search(&store.list(), filter);

    println!("=== Search ===");
    let chips = filter.active_filters();
    if !chips.is_empty() {
        println!("  Filters: {}", chips.join(" | "));
    }
    println!();
    if hits.is_empty() {
        println!("  No customers found");
        return;
    }
    print_customer_table(&hits, today);
}

fn cmd_plans(pricing: &PlanPricing) {
    let cur = currency_symbol(pricing.currency());
    println!("Plans:");
    println!();
    for (plan, cost) in pricing.price_list() {
        println!(
            "  {:<12} {cur}{:>7}   every {} month(s)",
            plan.as_str(),
            format_amount(cost),
            plan.cycle_months()
        );
    }
}

fn cmd_history(store: &CustomerStore, customer: &Customer, limit: usize) -> anyhow::Result<()> {
    let records = store.payment_history(&customer.id, limit)?;
    let cur = currency_symbol(store.pricing().currency());

    println!("=== Payment History: {} ===", customer.name);
    println!();
    println!("  Last paid:  {}", format_display_date(customer.last_paid_date));
    println!("  Next due:   {}", format_display_date(customer.next_due_date));
    println!();
    if records.is_empty() {
        println!("  No payment history");
        return Ok(());
    }
    println!(
        "  {:<38} {:<12} {:>8} {:<15} {:<12} Notes",
        "Payment ID", "Date", "Amount", "Status", "Plan"
    );
    println!("  {}", "-".repeat(100));
    for r in &records {
        println!(
            "  {:<38} {:<12} {:>8} {:<15} {:<12} {}",
            r.id,
            format_display_date(Some(r.payment_date)),
            format!("{cur}{}", format_amount(store.pricing().payment_amount(r))),
            r.status,
            r.payment_plan,
            r.notes.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn print_customer_table(customers: &[Customer], today: NaiveDate) {
    if customers.is_empty() {
        println!("  No customers found");
        return;
    }
    println!(
        "  {:<38} {:<22} {:<12} {:<15} {:<12} {:<12} Overdue",
        "ID", "Name", "Plan", "Status", "Last Paid", "Next Due"
    );
    println!("  {}", "-".repeat(130));
    for c in customers {
        println!(
            "  {:<38} {:<22} {:<12} {:<15} {:<12} {:<12} {}",
            c.id,
            truncate(&c.name, 20),
            c.payment_plan,
            c.status,
            format_display_date(c.last_paid_date),
            format_display_date(c.next_due_date),
            format_overdue_duration(days_overdue(c.next_due_date, today))
        );
    }
    println!();
    println!("  Total: {} customer(s)", customers.len());
}

fn print_bulk_result(action: &str, outcome: &cable_store::BulkOutcome) {
    let ok = outcome.succeeded.len();
    if outcome.is_clean() {
        println!("Successfully {action}: {ok} customer(s)");
        return;
    }
    println!("{ok} customer(s) {action}.");
    println!("{} customer(s) failed:", outcome.failed.len());
    for (id, reason) in &outcome.failed {
        println!("  {id}: {reason}");
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn currency_symbol(code: &str) -> &str {
    match code {
        "INR" => "₹",
        "USD" => "$",
        other => other,
    }
}

/// Indian digit grouping: 1234567 -> 12,34,567.
fn format_amount(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn truncate(s: &str, max: usize) -> String {
    if max < 3 {
        return s.chars().take(max).collect();
    }
    let char_count = s.chars().count();
    if char_count > max {
        let truncated: String = s.chars().take(max - 2).collect();
        format!("{truncated}..")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_indian_grouping() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(300), "300");
        assert_eq!(format_amount(3700), "3,700");
        assert_eq!(format_amount(123_456), "1,23,456");
        assert_eq!(format_amount(1_234_567), "12,34,567");
    }

    #[test]
    fn test_parse_status_arg() {
        assert_eq!(parse_status_arg("all").unwrap(), None);
        assert_eq!(
            parse_status_arg("Due but Active").unwrap(),
            Some(CustomerStatus::DueButActive)
        );
        assert!(parse_status_arg("late").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Chandra Shekar", 10), "Chandra ..");
        assert_eq!(truncate("Ravi", 10), "Ravi");
    }
}
