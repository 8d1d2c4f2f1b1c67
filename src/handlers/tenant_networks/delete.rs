// handlers/tenant_networks/delete.rs - DELETE /v2.1/os-tenant-networks/:id handler

use crate::error::ApiError;

pub async fn delete() -> ApiError {
    ApiError::gone()
}
