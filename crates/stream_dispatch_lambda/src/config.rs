use crate::error::ConfigError;

pub const TABLE_NAME_ENV: &str = "DYNAMODB_TABLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub table_name: String,
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = lookup(TABLE_NAME_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(TABLE_NAME_ENV))?;
        Ok(Self { table_name })
    }
}
