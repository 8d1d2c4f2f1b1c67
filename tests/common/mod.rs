#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

use tenant_networks_api::auth::{generate_jwt, Claims};
use tenant_networks_api::context::RequestContext;
use tenant_networks_api::network::{Network, NetworkApi, NetworkError};
use tenant_networks_api::policy::PolicyEnforcer;
use tenant_networks_api::{app, AppState, DefaultNetworkSettings};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const DEFAULT_PROJECT: &str = "defaults";

pub fn network(uuid: &str, cidr: Option<&str>, label: &str) -> Network {
    Network {
        uuid: Some(uuid.to_string()),
        id: None,
        cidr: cidr.map(str::to_string),
        label: Some(label.to_string()),
    }
}

/// In-memory network service keyed by project id
#[derive(Default)]
pub struct FakeNetworkApi {
    pub by_project: HashMap<String, Vec<Network>>,
    pub failing_projects: HashSet<String>,
    pub broken_ids: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
    pub get_all_calls: AtomicUsize,
}

impl FakeNetworkApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: &str, networks: Vec<Network>) -> Self {
        self.by_project.insert(project.to_string(), networks);
        self
    }

    pub fn failing_for(mut self, project: &str) -> Self {
        self.failing_projects.insert(project.to_string());
        self
    }

    pub fn broken_id(mut self, id: &str) -> Self {
        self.broken_ids.insert(id.to_string());
        self
    }

    /// Number of `get_all` calls made for `project`
    pub fn calls_for(&self, project: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(project).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl NetworkApi for FakeNetworkApi {
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<Network>, NetworkError> {
        let project = ctx.project_id.clone().unwrap_or_default();
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(project.clone()).or_default() += 1;
        }
        // Let concurrent callers pile up behind one another
        tokio::time::sleep(Duration::from_millis(20)).await;

        if self.failing_projects.contains(&project) {
            return Err(NetworkError::Transport("connection refused".to_string()));
        }
        Ok(self.by_project.get(&project).cloned().unwrap_or_default())
    }

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Network, NetworkError> {
        if self.broken_ids.contains(id) {
            return Err(NetworkError::Http { status: 500, body: "boom".to_string() });
        }
        let project = ctx.project_id.clone().unwrap_or_default();
        self.by_project
            .get(&project)
            .and_then(|networks| networks.iter().find(|n| n.api_id() == Some(id)).cloned())
            .ok_or_else(|| NetworkError::NotFound(id.to_string()))
    }
}

pub struct TestServer {
    pub base_url: String,
    pub api: Arc<FakeNetworkApi>,
    pub state: AppState,
}

impl TestServer {
    /// Serve the application on a free port with the given fake backend
    pub async fn spawn(api: FakeNetworkApi, use_defaults: bool) -> Result<Self> {
        Self::spawn_with_policy(api, use_defaults, PolicyEnforcer::with_defaults()?).await
    }

    pub async fn spawn_with_policy(
        api: FakeNetworkApi,
        use_defaults: bool,
        policy: PolicyEnforcer,
    ) -> Result<Self> {
        let api = Arc::new(api);
        let state = AppState::new(
            api.clone(),
            DefaultNetworkSettings {
                enabled: use_defaults,
                project_id: DEFAULT_PROJECT.to_string(),
            },
            policy,
            TEST_SECRET,
        );

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            api,
            state,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn token(project: &str, roles: &[&str]) -> String {
    let claims = Claims::new(
        "alice".to_string(),
        Some(project.to_string()),
        roles.iter().map(|r| r.to_string()).collect(),
        1,
    );
    generate_jwt(&claims, TEST_SECRET).expect("failed to sign test token")
}
