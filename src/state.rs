use std::sync::Arc;

use crate::cache::DefaultNetworkCache;
use crate::config::AppConfig;
use crate::network::{NetworkApi, NeutronClient, NetworkError};
use crate::policy::{PolicyEnforcer, PolicyError};

/// Whether listings include the default project's networks, and which project that is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultNetworkSettings {
    pub enabled: bool,
    pub project_id: String,
}

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub network_api: Arc<dyn NetworkApi>,
    pub default_networks: Arc<DefaultNetworkCache>,
    pub defaults: DefaultNetworkSettings,
    pub policy: Arc<PolicyEnforcer>,
    pub jwt_secret: Arc<str>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Network client error: {0}")]
    Network(#[from] NetworkError),
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
}

impl AppState {
    pub fn new(
        network_api: Arc<dyn NetworkApi>,
        defaults: DefaultNetworkSettings,
        policy: PolicyEnforcer,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            network_api,
            default_networks: Arc::new(DefaultNetworkCache::new()),
            defaults,
            policy: Arc::new(policy),
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Production wiring: Neutron client, policy file overrides, configured secret
    pub fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        let network_api = Arc::new(NeutronClient::from_config(&config.network)?);

        let policy = match &config.policy.file {
            Some(path) => PolicyEnforcer::from_file(path)?,
            None => PolicyEnforcer::with_defaults()?,
        };

        let defaults = DefaultNetworkSettings {
            enabled: config.api.use_neutron_default_nets,
            project_id: config.api.neutron_default_tenant_id.clone(),
        };

        Ok(Self::new(network_api, defaults, policy, config.security.jwt_secret.as_str()))
    }
}
