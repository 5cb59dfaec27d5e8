use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Registry database holding the tenants table.
    pub system_db_name: String,
    /// Template database cloned for every new tenant.
    pub tenant_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub sudo_expiry_minutes: u64,
    pub skeleton_expiry_minutes: u64,
    pub refresh_window_days: i64,
    /// Developer mode: return the underlying cause of 500s to the client.
    pub expose_internal_errors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
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
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("OPSDESK_SYSTEM_DB") {
            self.database.system_db_name = v;
        }
        if let Ok(v) = env::var("OPSDESK_TENANT_TEMPLATE") {
            self.database.tenant_template = v;
        }

        // API overrides
        if let Some(port) = env::var("OPSDESK_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SUDO_EXPIRY_MINUTES") {
            self.security.sudo_expiry_minutes = v.parse().unwrap_or(self.security.sudo_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_SKELETON_EXPIRY_MINUTES") {
            self.security.skeleton_expiry_minutes =
                v.parse().unwrap_or(self.security.skeleton_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_EXPOSE_INTERNAL_ERRORS") {
            self.security.expose_internal_errors =
                v.parse().unwrap_or(self.security.expose_internal_errors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_JSON") {
            self.logging.json = v.parse().unwrap_or(self.logging.json);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
                system_db_name: "opsdesk_main".to_string(),
                tenant_template: "template_opsdesk".to_string(),
            },
            api: ApiConfig {
                port: 3000,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                sudo_expiry_minutes: 60,
                skeleton_expiry_minutes: 120,
                refresh_window_days: 7,
                expose_internal_errors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            logging: LoggingConfig { json: false },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 10,
                system_db_name: "opsdesk_main".to_string(),
                tenant_template: "template_opsdesk".to_string(),
            },
            api: ApiConfig {
                port: 3000,
                max_page_size: 500,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                sudo_expiry_minutes: 15,
                skeleton_expiry_minutes: 60,
                refresh_window_days: 7,
                expose_internal_errors: false,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            logging: LoggingConfig { json: true },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
                system_db_name: "opsdesk_main".to_string(),
                tenant_template: "template_opsdesk".to_string(),
            },
            api: ApiConfig {
                port: 3000,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                sudo_expiry_minutes: 15,
                skeleton_expiry_minutes: 30,
                refresh_window_days: 7,
                expose_internal_errors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            logging: LoggingConfig { json: true },
        }
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
        assert!(config.security.expose_internal_errors);
        assert_eq!(config.api.max_page_size, 1000);
        assert_eq!(config.database.system_db_name, "opsdesk_main");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.security.expose_internal_errors);
        assert_eq!(config.api.max_page_size, 100);
        assert!(config.logging.json);
    }

    #[test]
    fn jwt_secret_is_never_serialized() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "s3cret".to_string();
        let text = serde_json::to_string(&config).unwrap();
        assert!(!text.contains("s3cret"));
    }
}
