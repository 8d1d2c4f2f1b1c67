use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{Network, NetworkApi, NetworkError};
use crate::config::NetworkConfig;
use crate::context::RequestContext;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const REQUEST_ID_HEADER: &str = "X-OpenStack-Request-ID";

#[derive(Debug, Deserialize)]
struct NeutronNetwork {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NetworkList {
    networks: Vec<NeutronNetwork>,
}

#[derive(Debug, Deserialize)]
struct NetworkShow {
    network: NeutronNetwork,
}

impl From<NeutronNetwork> for Network {
    fn from(net: NeutronNetwork) -> Self {
        // Neutron networks carry no cidr of their own; subnets do
        Network {
            uuid: Some(net.id),
            id: None,
            cidr: None,
            label: net.name,
        }
    }
}

/// `NetworkApi` over the Neutron v2.0 HTTP API
#[derive(Debug, Clone)]
pub struct NeutronClient {
    http: reqwest::Client,
    base: Url,
    service_token: Option<String>,
}

impl NeutronClient {
    pub fn new(
        endpoint: &str,
        service_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NetworkError> {
        // Without a trailing slash Url::join would drop the last path segment
        let normalized = format!("{}/", endpoint.trim_end_matches('/'));
        let base = Url::parse(&normalized)
            .map_err(|e| NetworkError::Transport(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        Ok(Self { http, base, service_token })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, NetworkError> {
        Self::new(
            &config.endpoint,
            config.service_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// The caller's own token, else the service token.
    /// Returns whether the service token was chosen.
    fn token_for<'a>(&'a self, ctx: &'a RequestContext) -> Result<(&'a str, bool), NetworkError> {
        if let Some(token) = ctx.auth_token.as_deref() {
            return Ok((token, false));
        }
        match self.service_token.as_deref() {
            Some(token) => Ok((token, true)),
            None => Err(NetworkError::Unauthorized(format!(
                "no credentials available for request {}",
                ctx.request_id
            ))),
        }
    }

    fn networks_url(&self) -> Result<Url, NetworkError> {
        self.base
            .join("v2.0/networks")
            .map_err(|e| NetworkError::Transport(e.to_string()))
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        url: Url,
        token: &str,
    ) -> Result<reqwest::Response, NetworkError> {
        tracing::debug!(request_id = %ctx.request_id, "GET {}", url);
        self.http
            .get(url)
            .header(AUTH_TOKEN_HEADER, token)
            .header(REQUEST_ID_HEADER, &ctx.request_id)
            .send()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))
    }
}

async fn error_for(response: reqwest::Response) -> NetworkError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NetworkError::Unauthorized(body),
        _ => NetworkError::Http { status: status.as_u16(), body },
    }
}

#[async_trait]
impl NetworkApi for NeutronClient {
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<Network>, NetworkError> {
        let (token, as_service) = self.token_for(ctx)?;

        let mut url = self.networks_url()?;
        if as_service {
            // A service token sees everything, so scope it to the context's project
            if let Some(project_id) = &ctx.project_id {
                url.query_pairs_mut().append_pair("tenant_id", project_id);
            }
        }

        let response = self.send(ctx, url, token).await?;
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let list: NetworkList = response
            .json()
            .await
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        Ok(list.networks.into_iter().map(Network::from).collect())
    }

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Network, NetworkError> {
        let (token, _) = self.token_for(ctx)?;

        let mut url = self.networks_url()?;
        url.path_segments_mut()
            .map_err(|_| NetworkError::Transport("endpoint cannot be a base URL".to_string()))?
            .push(id);

        let response = self.send(ctx, url, token).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(NetworkError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let show: NetworkShow = response
            .json()
            .await
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        Ok(show.network.into())
    }
}
