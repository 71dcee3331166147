pub mod types;

use std::path::Path;

use crate::error::{BookingError, Result};
use types::Config;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "roombook.yaml";

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        BookingError::Config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yml::from_str(&content)?
    };
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.pool.capacity == 0 {
            return Err(BookingError::Config(
                "pool.capacity must be at least 1".into(),
            ));
        }
        if self.reporting.window_days == 0 {
            return Err(BookingError::Config(
                "reporting.window_days must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::OverpaymentPolicy;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;
    use std::io::Write as _;

    #[test]
    fn test_load_config_missing_file_returns_defaults() {
        let config = load_config(Path::new("/tmp/nonexistent_roombook_config_12345.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_valid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "pool:\n  capacity: 6\nrates:\n  standard_room_only: 300\nledger:\n  overpayment: clamp"
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.pool.capacity, 6);
        assert_eq!(config.rates.standard_room_only, Money::new(dec!(300)).unwrap());
        // unspecified rate keeps its default
        assert_eq!(
            config.rates.standard_with_breakfast,
            Money::new(dec!(280)).unwrap()
        );
        assert_eq!(config.ledger.overpayment, OverpaymentPolicy::Clamp);
        assert_eq!(config.reporting.window_days, 30);
    }

    #[test]
    fn test_load_config_empty_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp).unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_config_rejects_zero_capacity() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "pool:\n  capacity: 0").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(BookingError::Config(_))
        ));
    }

    #[test]
    fn test_load_config_rejects_negative_rate() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "rates:\n  standard_room_only: -10").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "{{{{invalid yaml: [[[").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }
}
