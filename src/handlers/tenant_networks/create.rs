// handlers/tenant_networks/create.rs - POST /v2.1/os-tenant-networks handler

use crate::error::ApiError;

/// Network creation was decommissioned; the body is never read
pub async fn create() -> ApiError {
    ApiError::gone()
}
