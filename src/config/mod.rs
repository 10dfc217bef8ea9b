use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Upper bound on a ticket lookup before it surfaces as LookupFailed.
    pub lookup_timeout_ms: u64,
    /// Upper bound on the conditional admit write before AdmitFailed.
    pub admit_timeout_ms: u64,
    /// How long a cached verifier-role grant stays valid.
    pub access_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Security overrides
        if let Ok(v) = env::var("GATECHECK_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Verification overrides
        if let Ok(v) = env::var("VERIFY_LOOKUP_TIMEOUT_MS") {
            self.verification.lookup_timeout_ms = v.parse().unwrap_or(self.verification.lookup_timeout_ms);
        }
        if let Ok(v) = env::var("VERIFY_ADMIT_TIMEOUT_MS") {
            self.verification.admit_timeout_ms = v.parse().unwrap_or(self.verification.admit_timeout_ms);
        }
        if let Ok(v) = env::var("VERIFY_ACCESS_TTL_SECS") {
            self.verification.access_ttl_secs = v.parse().unwrap_or(self.verification.access_ttl_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB, scan payloads are small
            },
            security: SecurityConfig {
                jwt_secret: "gatecheck-dev-secret".to_string(),
                jwt_expiry_hours: 24,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            verification: VerificationConfig {
                lookup_timeout_ms: 10_000,
                admit_timeout_ms: 10_000,
                access_ttl_secs: 300,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                // Must come from GATECHECK_JWT_SECRET; auth middleware rejects
                // every request while the secret is empty.
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                cors_origins: vec!["https://staging.gatecheck.example.com".to_string()],
            },
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            verification: VerificationConfig {
                lookup_timeout_ms: 8_000,
                admit_timeout_ms: 8_000,
                access_ttl_secs: 120,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                cors_origins: vec!["https://gatecheck.example.com".to_string()],
            },
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            verification: VerificationConfig {
                // Gate lines stall fast; operators would rather retry than wait.
                lookup_timeout_ms: 5_000,
                admit_timeout_ms: 5_000,
                access_ttl_secs: 60,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.verification.lookup_timeout_ms, 10_000);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.verification.lookup_timeout_ms, 5_000);
        assert!(!config.api.enable_request_logging);
    }
}
