//! Plan price list. Built once from configuration and passed into every
//! entry point that needs money figures.

use cable_core::config::PricingConfig;
use cable_core::{BillingResult, PaymentPlan, PaymentRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPricing {
    monthly: u64,
    half_yearly: u64,
    yearly: u64,
    currency: String,
}

impl Default for PlanPricing {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl PlanPricing {
    pub fn from_config(cfg: &PricingConfig) -> Self {
        Self {
            monthly: cfg.monthly,
            half_yearly: cfg.half_yearly,
            yearly: cfg.yearly,
            currency: cfg.currency.clone(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn cost(&self, plan: PaymentPlan) -> u64 {
        match plan {
            PaymentPlan::Monthly => self.monthly,
            PaymentPlan::HalfYearly => self.half_yearly,
            PaymentPlan::Yearly => self.yearly,
        }
    }

    /// Cost lookup by wire name. Unknown plans are an error rather than zero.
    pub fn plan_cost(&self, plan: &str) -> BillingResult<u64> {
        Ok(self.cost(plan.parse()?))
    }

    /// Amount a payment record stands for.
    pub fn payment_amount(&self, record: &PaymentRecord) -> u64 {
        record
            .amount
            .unwrap_or_else(|| self.cost(record.payment_plan))
    }

    /// Revenue if every customer paid one monthly fee.
    pub fn expected_monthly_revenue(&self, total_customers: usize) -> u64 {
        total_customers as u64 * self.monthly
    }

    pub fn price_list(&self) -> Vec<(PaymentPlan, u64)> {
        PaymentPlan::ALL
            .iter()
            .map(|plan| (*plan, self.cost(*plan)))
            .collect()
    }
}
