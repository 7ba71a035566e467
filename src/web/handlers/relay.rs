//! Relay HTTP handlers
//!
//! The resource reference is taken from the raw request URI, path and query,
//! so percent-encoding and tokens reach the upstream exactly as the client
//! sent them.

use axum::{extract::State, http::Uri, response::Response};
use tracing::trace;

use crate::web::{AppState, responses::relay_response};

/// `GET /` and `GET /{*resource}`
pub async fn relay_resource(State(state): State<AppState>, uri: Uri) -> Response {
    let reference = relative_reference(&uri);
    trace!(resource = reference, "Relaying request");
    relay_response(state.interceptor.intercept(reference).await)
}

/// Request target without its leading `/`
fn relative_reference(uri: &Uri) -> &str {
    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    target.strip_prefix('/').unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference() {
        let cases = [
            ("/", ""),
            ("/?token=a", "?token=a"),
            ("/video.ts", "video.ts"),
            ("/live/v1.m3u8?token=a&b=1", "live/v1.m3u8?token=a&b=1"),
            ("/a%20b.ts", "a%20b.ts"),
        ];
        for (target, expected) in cases {
            let uri: Uri = target.parse().unwrap();
            assert_eq!(relative_reference(&uri), expected, "target: {target}");
        }
    }
}
