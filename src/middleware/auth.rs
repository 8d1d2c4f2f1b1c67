use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{validate_jwt, Claims};
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-openstack-request-id";

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        RequestContext::new(Some(claims.sub), claims.project_id, claims.roles)
    }
}

/// JWT authentication middleware that validates tokens and injects the caller's
/// `RequestContext`. The bearer token is kept on the context so it can be
/// forwarded to the network service.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_jwt_from_headers(&headers) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match validate_jwt(&token, &state.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejecting bearer token: {}", e);
            return ApiError::unauthorized(e.to_string()).into_response();
        }
    };

    let context = RequestContext::from(claims).with_auth_token(token);
    let request_id = context.request_id.clone();
    tracing::debug!(
        request_id = %request_id,
        user_id = ?context.user_id,
        project_id = ?context.project_id,
        "Authenticated request"
    );
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
