//! Centralized error handling for the HLS relay
//!
//! Two layers of failure exist on the request path:
//!
//! - **Fetch errors**: the upstream origin could not be reached, timed out,
//!   or its body could not be read. These are never retried.
//! - **Relay errors**: everything `intercept` can fail with, including the
//!   wrapped fetch error.
//!
//! Manifest parsing and URL rewriting are total and have no error type.
//!
//! # Usage
//!
//! ```rust
//! use hls_relay::errors::{RelayError, RelayResult};
//!
//! fn resolve(path: &str) -> RelayResult<()> {
//!     if path.contains('\0') {
//!         return Err(RelayError::invalid_path(path, "embedded NUL"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using RelayError
pub type RelayResult<T> = Result<T, RelayError>;

/// Convenience type alias for upstream fetch Results
pub type FetchResult<T> = Result<T, FetchError>;
