use axum::{
    extract::{RawPathParams, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::version::{ApiVersion, MIN_API_VERSION};
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::routes::RouteSpec;
use crate::state::AppState;

/// Statuses every API method may return regardless of its declared errors
const ALWAYS_EXPECTED: &[u16] = &[400, 401, 403];

/// Route spec plus application state, the state of `api_method_gate`
#[derive(Clone)]
pub struct RouteGate {
    pub spec: &'static RouteSpec,
    pub state: AppState,
}

/// Enforces a RouteSpec around its handler: microversion range, URL project
/// scoping, policy, and the set of error statuses the method may return.
pub async fn api_method_gate(
    State(gate): State<RouteGate>,
    params: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let spec = gate.spec;

    let version = request
        .extensions()
        .get::<ApiVersion>()
        .copied()
        .unwrap_or(MIN_API_VERSION);
    if !spec.supports(version) {
        tracing::debug!("{} is not available in microversion {}", spec.name, version);
        return ApiError::not_found("The resource could not be found.").into_response();
    }

    let context = request.extensions().get::<RequestContext>();

    let url_project = params
        .as_ref()
        .and_then(|params| params.iter().find(|(key, _)| *key == "project_id").map(|(_, v)| v.to_string()));
    if let (Some(url_project), Some(ctx)) = (&url_project, context) {
        if ctx.project_id.as_deref() != Some(url_project.as_str()) {
            return ApiError::bad_request(format!(
                "Malformed request URL: URL's project_id '{}' doesn't match Context's project_id '{}'",
                url_project,
                ctx.project_id.as_deref().unwrap_or("None")
            ))
            .into_response();
        }
    }

    if let Some(action) = spec.policy {
        let Some(ctx) = context else {
            return ApiError::unauthorized("Authentication required").into_response();
        };
        if let Err(e) = ctx.can(&gate.state.policy, action) {
            return ApiError::from(e).into_response();
        }
    }

    let response = next.run(request).await;

    let status = response.status().as_u16();
    if status < 400 || ALWAYS_EXPECTED.contains(&status) || spec.expects(status) {
        return response;
    }

    tracing::error!(
        route = spec.name,
        status,
        "Unexpected exception in API method"
    );
    ApiError::unexpected().into_response()
}
