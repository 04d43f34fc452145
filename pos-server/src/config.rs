//! Server configuration

use crate::error::BoxError;

/// POS server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_expiry_hours: i64,
    /// Directory product images are written to
    pub upload_dir: String,
    /// URL prefix under which `upload_dir` is served
    pub public_url_prefix: String,
    /// Attempts per report recomputation before the refresh is dropped
    pub report_max_attempts: u32,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: Self::parse_or("DB_MAX_CONNECTIONS", 10),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: Self::parse_or("JWT_EXPIRY_HOURS", 24),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./public/uploads".into()),
            public_url_prefix: std::env::var("PUBLIC_URL_PREFIX")
                .unwrap_or_else(|_| "/public/uploads".into()),
            report_max_attempts: Self::parse_or("REPORT_MAX_ATTEMPTS", 5).max(1),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_falls_back_in_development() {
        let val = Config::require_secret("POS_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-POS_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_rejects_missing_in_production() {
        let err = Config::require_secret("POS_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set in production"));
    }

    #[test]
    fn test_parse_or_uses_default_for_garbage() {
        assert_eq!(Config::parse_or::<u16>("POS_TEST_UNSET_PORT", 8080), 8080);
    }
}
