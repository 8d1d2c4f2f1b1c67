pub mod neutron;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::RequestContext;

pub use neutron::NeutronClient;

/// Network as returned by the network service. Backends fill in
/// whichever attributes they know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Network {
    /// Identifier the API exposes: a non-empty `uuid`, falling back to `id`
    pub fn api_id(&self) -> Option<&str> {
        self.uuid
            .as_deref()
            .filter(|uuid| !uuid.is_empty())
            .or(self.id.as_deref())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Network {0} could not be found.")]
    NotFound(String),

    #[error("Network service authorization failed: {0}")]
    Unauthorized(String),

    #[error("Network service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network service transport error: {0}")]
    Transport(String),

    #[error("Network service response could not be decoded: {0}")]
    Decode(String),
}

/// Read access to the network service on behalf of a request context
#[async_trait]
pub trait NetworkApi: Send + Sync {
    /// All networks visible to `ctx`
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<Network>, NetworkError>;

    /// A single network; `NetworkError::NotFound` when it does not exist
    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Network, NetworkError>;
}
