use super::errors::ConfigError;
use crate::LookupBudget;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinalizeConfig {
    /// Upstream lookups allowed per alias chain. Signed so that a configured
    /// zero or negative value is reported instead of failing to deserialize.
    #[serde(default = "default_max_lookup")]
    pub max_lookup: i64,
}

impl FinalizeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lookup <= 0 {
            return Err(ConfigError::Validation(
                "max_lookup parameter must be greater than 0".to_string(),
            ));
        }
        if self.max_lookup > i64::from(u32::MAX) {
            return Err(ConfigError::Validation(format!(
                "max_lookup parameter must be at most {}",
                u32::MAX
            )));
        }
        Ok(())
    }

    pub fn lookup_budget(&self) -> Result<LookupBudget, ConfigError> {
        self.validate()?;
        Ok(LookupBudget::new(self.max_lookup as u32))
    }
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            max_lookup: default_max_lookup(),
        }
    }
}

fn default_max_lookup() -> i64 {
    LookupBudget::DEFAULT.max_lookups() as i64
}
