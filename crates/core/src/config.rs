use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `cable-billing.toml` and environment variables with the prefix
/// `CABLE_BILLING__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// List price per plan, in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_monthly_cost")]
    pub monthly: u64,
    #[serde(default = "default_half_yearly_cost")]
    pub half_yearly: u64,
    #[serde(default = "default_yearly_cost")]
    pub yearly: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillingConfig {
    /// Days past the due date before the advisor suggests `Overdue`.
    #[serde(default = "default_overdue_after_days")]
    pub overdue_after_days: u32,
    #[serde(default = "default_upcoming_window_days")]
    pub upcoming_window_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub data_file: Option<String>,
}

// Default functions
fn default_monthly_cost() -> u64 {
    300
}
fn default_half_yearly_cost() -> u64 {
    1700
}
fn default_yearly_cost() -> u64 {
    3400
}
fn default_currency() -> String {
    "INR".to_string()
}
fn default_overdue_after_days() -> u32 {
    0
}
fn default_upcoming_window_days() -> u32 {
    7
}
fn default_history_limit() -> usize {
    50
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            monthly: default_monthly_cost(),
            half_yearly: default_half_yearly_cost(),
            yearly: default_yearly_cost(),
            currency: default_currency(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            overdue_after_days: default_overdue_after_days(),
            upcoming_window_days: default_upcoming_window_days(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            data_file: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            billing: BillingConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("cable-billing")
    }

    /// Same as [`AppConfig::load`] with an explicit config file stem.
    pub fn load_from(file_stem: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix("CABLE_BILLING")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
