// handlers/tenant_networks/list.rs - GET /v2.1/os-tenant-networks handler

use axum::{
    extract::{Extension, State},
    response::Json,
};

use super::{NetworkList, NetworkView};
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Networks visible to the caller, followed by the cached default networks
pub async fn index(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<NetworkList>, ApiError> {
    let mut networks = state.network_api.get_all(&ctx).await?;

    if state.defaults.enabled {
        let api = state.network_api.clone();
        let project_id = state.defaults.project_id.clone();
        let defaults = state
            .default_networks
            .get_or_refresh(|| async move {
                let default_ctx = RequestContext::for_project(project_id);
                api.get_all(&default_ctx).await
            })
            .await;
        networks.extend(defaults);
    }

    Ok(Json(NetworkList {
        networks: networks.iter().map(NetworkView::from).collect(),
    }))
}
