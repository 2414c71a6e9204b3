use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub jwt: JwtSettings,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub busy_timeout_ms: u64,
}

/// Token signing settings. The secret must be at least 32 bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    #[serde(skip_serializing, default)]
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub upload_dir: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://ems.db?mode=rwc";
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024; // 100MB
const DEV_JWT_SECRET: &str = "development-secret-change-me-0123456789abcdef";

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
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        parse_var("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        parse_var("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        parse_var("DATABASE_BUSY_TIMEOUT_MS", &mut self.database.busy_timeout_ms);

        if let Ok(v) = env::var("JWT_SECRET").or_else(|_| env::var("JWT_SETTINGS_SECRET")) {
            self.jwt.secret = v;
        }
        parse_var("JWT_SETTINGS_ISSUER", &mut self.jwt.issuer);
        parse_var("JWT_SETTINGS_AUDIENCE", &mut self.jwt.audience);
        parse_var("JWT_SETTINGS_EXPIRY_HOURS", &mut self.jwt.expiry_hours);

        // PORT wins over API_PORT
        parse_var("API_PORT", &mut self.api.port);
        parse_var("PORT", &mut self.api.port);
        parse_var("API_MAX_UPLOAD_BYTES", &mut self.api.max_upload_bytes);
        parse_var("API_UPLOAD_DIR", &mut self.api.upload_dir);
        parse_var("API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);

        parse_var("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 30,
                busy_timeout_ms: 5_000,
            },
            jwt: JwtSettings {
                secret: DEV_JWT_SECRET.to_string(),
                issuer: "employee-monitoring-api".to_string(),
                audience: "employee-monitoring-clients".to_string(),
                expiry_hours: 24 * 7, // 1 week
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: MAX_UPLOAD_BYTES,
                upload_dir: "uploads".to_string(),
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 20,
                connection_timeout: 10,
                busy_timeout_ms: 5_000,
            },
            jwt: JwtSettings {
                // must come from JWT_SECRET outside development
                secret: String::new(),
                issuer: "employee-monitoring-api".to_string(),
                audience: "employee-monitoring-clients".to_string(),
                expiry_hours: 24,
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: MAX_UPLOAD_BYTES,
                upload_dir: "uploads".to_string(),
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 50,
                connection_timeout: 5,
                busy_timeout_ms: 10_000,
            },
            jwt: JwtSettings {
                secret: String::new(),
                issuer: "employee-monitoring-api".to_string(),
                audience: "employee-monitoring-clients".to_string(),
                expiry_hours: 8,
            },
            api: ApiConfig {
                port: 8000,
                max_upload_bytes: MAX_UPLOAD_BYTES,
                upload_dir: "uploads".to_string(),
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

/// Replace `target` with the parsed value of `var` when it is set and parses.
fn parse_var<T: FromStr>(var: &str, target: &mut T) {
    if let Some(value) = env::var(var).ok().and_then(|v| v.parse().ok()) {
        *target = value;
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.url, "sqlite://ems.db?mode=rwc");
        assert_eq!(config.api.max_upload_bytes, 104_857_600);
        assert!(config.jwt.secret.len() >= 32);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.jwt.secret.is_empty());
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.api.max_upload_bytes, 104_857_600);
    }

    #[test]
    fn test_jwt_secret_is_not_serialized() {
        let json = serde_json::to_value(AppConfig::development()).unwrap();
        assert!(json["jwt"].get("secret").is_none());
        assert_eq!(json["jwt"]["issuer"], "employee-monitoring-api");
    }
}
