use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
    }

    /// Anything that is not recognisably production falls back to development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Read and parse an environment variable. `Ok(None)` when unset; a value
/// that is set but does not parse is an error rather than a silent default.
pub fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Ok(value) = env::var(key) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e| anyhow::anyhow!("Invalid value {:?} for {}: {}", value, key, e))
}

/// Read a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn env_flag(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
