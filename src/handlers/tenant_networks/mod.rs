// handlers/tenant_networks/mod.rs - os-tenant-networks handlers
//
// Routes, microversions and policy live in routes.rs; these handlers assume
// the gate already authorized the caller.

use serde::{Deserialize, Serialize};

use crate::network::Network;

pub mod create; // POST   /v2.1/os-tenant-networks         (410)
pub mod delete; // DELETE /v2.1/os-tenant-networks/:id     (410)
pub mod list;   // GET    /v2.1/os-tenant-networks
pub mod show;   // GET    /v2.1/os-tenant-networks/:id

pub use create::create;
pub use delete::delete;
pub use list::index;
pub use show::show;

/// Rendering of a network in API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkView {
    pub id: Option<String>,
    /// Stringified cidr; a network without one renders as "None"
    pub cidr: String,
    pub label: Option<String>,
}

impl From<&Network> for NetworkView {
    fn from(network: &Network) -> Self {
        Self {
            id: network.api_id().map(str::to_string),
            cidr: network.cidr.clone().unwrap_or_else(|| "None".to_string()),
            label: network.label.clone(),
        }
    }
}

pub fn network_dict(network: &Network) -> NetworkView {
    NetworkView::from(network)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkList {
    pub networks: Vec<NetworkView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkShow {
    pub network: NetworkView,
}

#[derive(Debug, Deserialize)]
pub struct NetworkPath {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_cidr_renders_as_none() {
        let net = Network {
            id: Some("n1".into()),
            label: Some("private".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(network_dict(&net)).unwrap(),
            json!({"id": "n1", "cidr": "None", "label": "private"})
        );
    }

    #[test]
    fn uuid_wins_over_id() {
        let net = Network {
            uuid: Some("3f1c".into()),
            id: Some("7".into()),
            cidr: Some("10.0.0.0/24".into()),
            label: Some("private".into()),
        };
        let view = network_dict(&net);
        assert_eq!(view.id.as_deref(), Some("3f1c"));
        assert_eq!(view.cidr, "10.0.0.0/24");
    }

    #[test]
    fn empty_record_projects_to_nulls() {
        assert_eq!(
            serde_json::to_value(network_dict(&Network::default())).unwrap(),
            json!({"id": null, "cidr": "None", "label": null})
        );
    }
}
