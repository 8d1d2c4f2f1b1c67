use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

use tenant_networks_api::context::RequestContext;
use tenant_networks_api::network::{NetworkApi, NetworkError, NeutronClient};

const USER_TOKEN: &str = "user-token";
const SERVICE_TOKEN: &str = "service-token";

fn authorized(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        .filter(|t| *t == USER_TOKEN || *t == SERVICE_TOKEN)
}

async fn list_networks(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    let Some(token) = authorized(&headers) else {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    };

    // The service token must always arrive scoped to a project
    let networks = match (token, query.get("tenant_id").map(String::as_str)) {
        (SERVICE_TOKEN, Some("defaults")) => json!([{"id": "pub-1", "name": "public"}]),
        (SERVICE_TOKEN, _) => return (StatusCode::BAD_REQUEST, "unscoped service request").into_response(),
        _ => json!([
            {"id": "net-a", "name": "private", "status": "ACTIVE"},
            {"id": "net-b", "name": null}
        ]),
    };
    Json(json!({ "networks": networks })).into_response()
}

async fn show_network(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if authorized(&headers).is_none() {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    match id.as_str() {
        "net-a" => Json(json!({"network": {"id": "net-a", "name": "private"}})).into_response(),
        "explode" => (StatusCode::INTERNAL_SERVER_ERROR, "neutron fell over").into_response(),
        "garbled" => (StatusCode::OK, "<html>").into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"NeutronError": {"type": "NetworkNotFound"}}))).into_response(),
    }
}

async fn spawn_fake_neutron() -> Result<String> {
    let router = Router::new()
        .route("/v2.0/networks", get(list_networks))
        .route("/v2.0/networks/:id", get(show_network));

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

fn client(endpoint: &str, service_token: Option<&str>) -> Result<NeutronClient> {
    Ok(NeutronClient::new(
        endpoint,
        service_token.map(str::to_string),
        Duration::from_secs(5),
    )?)
}

fn user_context() -> RequestContext {
    RequestContext::new(Some("alice".into()), Some("p1".into()), vec!["member".into()])
        .with_auth_token(USER_TOKEN)
}

#[tokio::test]
async fn lists_networks_with_caller_token() -> Result<()> {
    let endpoint = spawn_fake_neutron().await?;
    let networks = client(&endpoint, None)?.get_all(&user_context()).await?;

    assert_eq!(networks.len(), 2);
    assert_eq!(networks[0].uuid.as_deref(), Some("net-a"));
    assert_eq!(networks[0].label.as_deref(), Some("private"));
    assert!(networks[0].cidr.is_none());
    assert!(networks[1].label.is_none());
    Ok(())
}

#[tokio::test]
async fn project_context_uses_scoped_service_token() -> Result<()> {
    let endpoint = spawn_fake_neutron().await?;
    let networks = client(&endpoint, Some(SERVICE_TOKEN))?
        .get_all(&RequestContext::for_project("defaults"))
        .await?;

    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].api_id(), Some("pub-1"));
    Ok(())
}

#[tokio::test]
async fn project_context_without_service_token_is_unauthorized() -> Result<()> {
    let endpoint = spawn_fake_neutron().await?;
    let err = client(&endpoint, None)?
        .get_all(&RequestContext::for_project("defaults"))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::Unauthorized(_)));
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_unauthorized() -> Result<()> {
    let endpoint = spawn_fake_neutron().await?;
    let ctx = RequestContext::for_project("p1").with_auth_token("stale");
    let err = client(&endpoint, None)?.get_all(&ctx).await.unwrap_err();
    assert!(matches!(err, NetworkError::Unauthorized(_)));
    Ok(())
}

#[tokio::test]
async fn show_maps_statuses() -> Result<()> {
    let endpoint = spawn_fake_neutron().await?;
    let neutron = client(&endpoint, None)?;
    let ctx = user_context();

    let found = neutron.get(&ctx, "net-a").await?;
    assert_eq!(found.api_id(), Some("net-a"));

    assert_eq!(
        neutron.get(&ctx, "missing").await.unwrap_err(),
        NetworkError::NotFound("missing".to_string())
    );
    assert!(matches!(
        neutron.get(&ctx, "explode").await.unwrap_err(),
        NetworkError::Http { status: 500, .. }
    ));
    assert!(matches!(
        neutron.get(&ctx, "garbled").await.unwrap_err(),
        NetworkError::Decode(_)
    ));
    Ok(())
}

#[tokio::test]
async fn unreachable_service_is_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let neutron = client(&format!("http://127.0.0.1:{}", port), None)?;
    let err = neutron.get_all(&user_context()).await.unwrap_err();
    assert!(matches!(err, NetworkError::Transport(_)));
    Ok(())
}
