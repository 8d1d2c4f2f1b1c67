pub mod version;

pub use version::{negotiate, ApiVersion, VersionError};
