use std::fmt;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub environment: Environment,
    pub log_level: String,
    pub max_connections: u32,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Unknown values fall back to development.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            _ => Self::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        })
    }
}

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`
    /// Optional with defaults: `ENVIRONMENT`, `LOG_LEVEL`, `DATABASE_MAX_CONNECTIONS`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is not set or `DATABASE_MAX_CONNECTIONS` is not a
    /// positive integer.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = Environment::parse(
            &std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => parse_max_connections(&raw)?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            environment,
            log_level,
            max_connections,
        })
    }
}

fn parse_max_connections(raw: &str) -> anyhow::Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(anyhow::anyhow!(
            "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
        )),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" Staging "), Environment::Staging);
        assert_eq!(Environment::parse("qa"), Environment::Development);
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_max_connections_must_be_positive() {
        assert_eq!(parse_max_connections("25").unwrap_or_default(), 25);
        assert!(parse_max_connections("0").is_err());
        assert!(parse_max_connections("-3").is_err());
        assert!(parse_max_connections("many").is_err());
    }
}
