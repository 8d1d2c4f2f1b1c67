use axum::{
    extract::Request,
    http::{header::VARY, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ApiError;

pub const API_VERSION_HEADER: &str = "openstack-api-version";
pub const LEGACY_API_VERSION_HEADER: &str = "x-openstack-nova-api-version";
pub const SERVICE_TYPE: &str = "compute";

pub const MIN_API_VERSION: ApiVersion = ApiVersion::new(2, 1);
pub const MAX_API_VERSION: ApiVersion = ApiVersion::new(2, 96);
/// Last microversion that still serves the proxy APIs (network, image, volume)
pub const MAX_PROXY_API_SUPPORT_VERSION: ApiVersion = ApiVersion::new(2, 35);

/// Negotiated compute API microversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("API Version String {0} is of invalid format. Must be of format MajorNum.MinorNum.")]
    Invalid(String),

    #[error("Version {0} is not supported by the API. Minimum is {min} and maximum is {max}.", min = MIN_API_VERSION, max = MAX_API_VERSION)]
    Unsupported(ApiVersion),
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// True when `self` lies within `[min, max]`
    pub fn matches(&self, min: ApiVersion, max: ApiVersion) -> bool {
        min <= *self && *self <= max
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;

        // Major must be non-zero and neither part may carry leading zeros
        let well_formed = |part: &str| {
            !part.is_empty()
                && part.bytes().all(|b| b.is_ascii_digit())
                && (part == "0" || !part.starts_with('0'))
        };
        if !well_formed(major) || !well_formed(minor) || major == "0" {
            return Err(invalid());
        }

        Ok(ApiVersion::new(
            major.parse().map_err(|_| invalid())?,
            minor.parse().map_err(|_| invalid())?,
        ))
    }
}

/// Extract the requested version string for the compute service, if any.
///
/// `OpenStack-API-Version` may list several services (`compute 2.5, image 2.0`);
/// it wins over the legacy `X-OpenStack-Nova-API-Version` header.
fn requested_version(headers: &HeaderMap) -> Option<String> {
    let modern = headers
        .get_all(API_VERSION_HEADER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|entry| {
            let mut parts = entry.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(service), Some(version)) if service.eq_ignore_ascii_case(SERVICE_TYPE) => {
                    Some(version.to_string())
                }
                _ => None,
            }
        });

    modern.or_else(|| {
        headers
            .get(LEGACY_API_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
    })
}

/// Resolve the request's microversion from its headers
pub fn negotiate(headers: &HeaderMap) -> Result<ApiVersion, VersionError> {
    let version = match requested_version(headers) {
        None => return Ok(MIN_API_VERSION),
        Some(v) if v.eq_ignore_ascii_case("latest") => return Ok(MAX_API_VERSION),
        Some(v) => v.parse::<ApiVersion>()?,
    };

    if !version.matches(MIN_API_VERSION, MAX_API_VERSION) {
        return Err(VersionError::Unsupported(version));
    }
    Ok(version)
}

/// Middleware that negotiates the microversion, stores it in request extensions
/// and echoes it back on the response
pub async fn api_version_middleware(mut request: Request, next: Next) -> Response {
    let version = match negotiate(request.headers()) {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!("Rejecting request microversion: {}", e);
            return ApiError::from(e).into_response();
        }
    };

    request.extensions_mut().insert(version);
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format!("{} {}", SERVICE_TYPE, version)) {
        headers.insert(API_VERSION_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&version.to_string()) {
        headers.insert(LEGACY_API_VERSION_HEADER, value);
    }
    headers.append(VARY, HeaderValue::from_static("OpenStack-API-Version"));
    headers.append(VARY, HeaderValue::from_static("X-OpenStack-Nova-API-Version"));

    response
}
