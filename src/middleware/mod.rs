pub mod auth;
pub mod gate;

pub use auth::{jwt_auth_middleware, REQUEST_ID_HEADER};
pub use gate::{api_method_gate, RouteGate};
