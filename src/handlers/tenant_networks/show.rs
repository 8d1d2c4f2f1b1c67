// handlers/tenant_networks/show.rs - GET /v2.1/os-tenant-networks/:id handler

use axum::{
    extract::{Extension, Path, State},
    response::Json,
};

use super::{NetworkPath, NetworkShow, NetworkView};
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::network::NetworkError;
use crate::state::AppState;

pub async fn show(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(path): Path<NetworkPath>,
) -> Result<Json<NetworkShow>, ApiError> {
    let network = state
        .network_api
        .get(&ctx, &path.id)
        .await
        .map_err(|e| match e {
            NetworkError::NotFound(_) => ApiError::not_found("Network not found"),
            other => ApiError::from(other),
        })?;

    Ok(Json(NetworkShow {
        network: NetworkView::from(&network),
    }))
}
