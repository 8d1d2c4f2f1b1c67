use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub network: NetworkConfig,
    pub security: SecurityConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// Append the networks of `neutron_default_tenant_id` to every listing
    pub use_neutron_default_nets: bool,
    pub neutron_default_tenant_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub endpoint: String,
    /// Used when the request context carries no token of its own
    pub service_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub file: Option<PathBuf>,
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
        // API overrides
        if let Some(v) = env::var("TNET_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_USE_NEUTRON_DEFAULT_NETS") {
            self.api.use_neutron_default_nets = v.parse().unwrap_or(self.api.use_neutron_default_nets);
        }
        if let Ok(v) = env::var("API_NEUTRON_DEFAULT_TENANT_ID") {
            if !v.trim().is_empty() {
                self.api.neutron_default_tenant_id = v.trim().to_string();
            }
        }

        // Network service overrides
        if let Ok(v) = env::var("NETWORK_ENDPOINT") {
            self.network.endpoint = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("NETWORK_SERVICE_TOKEN") {
            self.network.service_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Ok(v) = env::var("NETWORK_TIMEOUT_SECS") {
            self.network.timeout_secs = v.parse().unwrap_or(self.network.timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Policy overrides
        if let Ok(v) = env::var("POLICY_FILE") {
            self.policy.file = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 8774,
                use_neutron_default_nets: false,
                neutron_default_tenant_id: "default".to_string(),
            },
            network: NetworkConfig {
                endpoint: "http://127.0.0.1:9696".to_string(),
                service_token: None,
                timeout_secs: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            policy: PolicyConfig { file: None },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 8774,
                use_neutron_default_nets: false,
                neutron_default_tenant_id: "default".to_string(),
            },
            network: NetworkConfig {
                endpoint: "http://127.0.0.1:9696".to_string(),
                service_token: None,
                timeout_secs: 15,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            policy: PolicyConfig { file: None },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 8774,
                use_neutron_default_nets: false,
                neutron_default_tenant_id: "default".to_string(),
            },
            network: NetworkConfig {
                endpoint: "http://127.0.0.1:9696".to_string(),
                service_token: None,
                timeout_secs: 10,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            policy: PolicyConfig { file: None },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
