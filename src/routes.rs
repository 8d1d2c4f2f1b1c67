// routes.rs - declarative route table for the compute API surface
//
// Every API method is described by a RouteSpec: the versions it exists in,
// the policy it requires and the error codes it is allowed to return. The
// gate middleware consumes the route entry; handlers only do the work.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, on, MethodFilter},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::version::{
    api_version_middleware, ApiVersion, MAX_API_VERSION, MAX_PROXY_API_SUPPORT_VERSION,
    MIN_API_VERSION,
};
use crate::handlers::{discovery, tenant_networks};
use crate::middleware::{api_method_gate, jwt_auth_middleware, RouteGate};
use crate::policy;
use crate::state::AppState;

pub const API_PREFIX: &str = "/v2.1";

#[derive(Debug)]
pub struct RouteSpec {
    pub name: &'static str,
    pub method: MethodFilter,
    /// Path below the API prefix
    pub path: &'static str,
    pub min_version: ApiVersion,
    pub max_version: ApiVersion,
    pub policy: Option<&'static str>,
    pub expected_errors: &'static [u16],
}

impl RouteSpec {
    pub fn supports(&self, version: ApiVersion) -> bool {
        version.matches(self.min_version, self.max_version)
    }

    pub fn expects(&self, status: u16) -> bool {
        self.expected_errors.contains(&status)
    }

    pub fn full_path(&self) -> String {
        format!("{}{}", API_PREFIX, self.path)
    }

    /// Legacy form carrying the project id in the URL
    pub fn project_scoped_path(&self) -> String {
        format!("{}/:project_id{}", API_PREFIX, self.path)
    }
}

pub static TENANT_NETWORKS_INDEX: RouteSpec = RouteSpec {
    name: "tenant_networks.index",
    method: MethodFilter::GET,
    path: "/os-tenant-networks",
    min_version: MIN_API_VERSION,
    max_version: MAX_PROXY_API_SUPPORT_VERSION,
    policy: Some(policy::TENANT_NETWORKS),
    expected_errors: &[],
};

pub static TENANT_NETWORKS_SHOW: RouteSpec = RouteSpec {
    name: "tenant_networks.show",
    method: MethodFilter::GET,
    path: "/os-tenant-networks/:id",
    min_version: MIN_API_VERSION,
    max_version: MAX_PROXY_API_SUPPORT_VERSION,
    policy: Some(policy::TENANT_NETWORKS),
    expected_errors: &[404],
};

pub static TENANT_NETWORKS_CREATE: RouteSpec = RouteSpec {
    name: "tenant_networks.create",
    method: MethodFilter::POST,
    path: "/os-tenant-networks",
    min_version: MIN_API_VERSION,
    max_version: MAX_API_VERSION,
    policy: None,
    expected_errors: &[410],
};

pub static TENANT_NETWORKS_DELETE: RouteSpec = RouteSpec {
    name: "tenant_networks.delete",
    method: MethodFilter::DELETE,
    path: "/os-tenant-networks/:id",
    min_version: MIN_API_VERSION,
    max_version: MAX_API_VERSION,
    policy: None,
    expected_errors: &[410],
};

pub fn app(state: AppState) -> Router {
    let api = tenant_network_routes(&state)
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(discovery::versions))
        .route("/health", get(discovery::health))
        // Authenticated compute API
        .merge(api)
        // Global middleware
        .layer(from_fn(api_version_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn tenant_network_routes(state: &AppState) -> Router<AppState> {
    let routes = [
        (&TENANT_NETWORKS_INDEX, on(TENANT_NETWORKS_INDEX.method, tenant_networks::index)),
        (&TENANT_NETWORKS_SHOW, on(TENANT_NETWORKS_SHOW.method, tenant_networks::show)),
        (&TENANT_NETWORKS_CREATE, on(TENANT_NETWORKS_CREATE.method, tenant_networks::create)),
        (&TENANT_NETWORKS_DELETE, on(TENANT_NETWORKS_DELETE.method, tenant_networks::delete)),
    ];

    let mut router = Router::new();
    for (spec, method_router) in routes {
        let gate = RouteGate { spec, state: state.clone() };
        let gated = method_router.route_layer(from_fn_with_state(gate, api_method_gate));
        // Same path with a different method merges into the existing route
        router = router
            .route(&spec.full_path(), gated.clone())
            .route(&spec.project_scoped_path(), gated);
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_routes_stop_at_proxy_ceiling() {
        assert!(TENANT_NETWORKS_INDEX.supports(ApiVersion::new(2, 35)));
        assert!(!TENANT_NETWORKS_INDEX.supports(ApiVersion::new(2, 36)));
        assert!(!TENANT_NETWORKS_SHOW.supports(MAX_API_VERSION));
    }

    #[test]
    fn decommissioned_routes_span_all_versions() {
        assert!(TENANT_NETWORKS_CREATE.supports(MIN_API_VERSION));
        assert!(TENANT_NETWORKS_DELETE.supports(MAX_API_VERSION));
        assert!(TENANT_NETWORKS_DELETE.expects(410));
        assert!(!TENANT_NETWORKS_INDEX.expects(404));
    }

    #[test]
    fn builds_both_path_forms() {
        assert_eq!(TENANT_NETWORKS_SHOW.full_path(), "/v2.1/os-tenant-networks/:id");
        assert_eq!(
            TENANT_NETWORKS_SHOW.project_scoped_path(),
            "/v2.1/:project_id/os-tenant-networks/:id"
        );
    }
}
