// SPDX-License-Identifier: Apache-2.0

use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Process configuration, read from the environment.
#[derive(Debug)]
pub struct Config {
    pub influx_host: String,
    pub influx_user: String,
    pub influx_pass: String,
    pub influx_db_name: String,
    pub log_level: String,
    /// Optional log file to read instead of stdin.
    pub input_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            influx_host: required("INFLUX_HOST")?,
            influx_user: required("INFLUX_USER")?,
            influx_pass: required("INFLUX_PASS")?,
            influx_db_name: required("INFLUX_DB_NAME")?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            input_file: env::args().nth(1),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_error_names_the_variable() {
        assert_eq!(
            ConfigError::MissingVar("INFLUX_HOST").to_string(),
            "missing required environment variable INFLUX_HOST"
        );
    }
}
