use crate::domain::ledger::OverpaymentPolicy;
use crate::domain::reservation::RoomRates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub rates: RoomRates,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

/// The room pool. Rooms are interchangeable, so only the count matters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PoolConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct LedgerConfig {
    #[serde(default)]
    pub overpayment: OverpaymentPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ReportingConfig {
    /// Length of the rolling availability calendar, in days after today.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

fn default_capacity() -> u32 {
    4
}

fn default_window_days() -> u32 {
    30
}
