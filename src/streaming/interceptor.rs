/*!
 * Relay Interceptor
 * =================
 *
 * Single entry point per relayed request:
 *
 *   1. Resolve the relative resource path against the upstream base URL.
 *   2. Classify it (manifest / segment).
 *   3. Manifests only: ask the tracker whether this request is a track switch,
 *      using the state established by earlier requests.
 *   4. Emit `[IN]`, fetch upstream (the only await point), emit `[OUT]` with elapsed time.
 *   5. Manifests only: feed the body to the tracker, then rewrite absolute URLs.
 *   6. Build the outgoing response.
 *
 * A failed fetch emits no `[OUT]` line and surfaces as `RelayError::Fetch`.
 * Nothing is retried and no timeout is applied here; the fetcher owns both.
 */

use axum::http::{HeaderMap, HeaderName, StatusCode, header};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::{RelayError, RelayResult};
use crate::streaming::classification::{ResourceKind, classify};
use crate::streaming::events::{EventSink, RelayEvent};
use crate::streaming::rewriter::rewrite;
use crate::streaming::tracker::PlaylistTracker;
use crate::utils::http_client::{UpstreamFetcher, UpstreamResponse};
use crate::utils::url::UrlUtils;

/// Connection-scoped headers that never cross the relay
const HOP_BY_HOP_HEADERS: [HeaderName; 5] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Non-standard hop-by-hop headers still sent by some origins
const LEGACY_HOP_BY_HOP_HEADERS: [&str; 2] = ["keep-alive", "proxy-connection"];

/// A request after resolution; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub path: String,
    pub url: Url,
    pub kind: ResourceKind,
}

impl ResolvedRequest {
    /// Resolve a relative reference, which may carry a query string, against `base_url`.
    ///
    /// The kind is decided on the path alone, so `v1.m3u8?token=a` is still a manifest.
    pub fn resolve(base_url: &Url, relative_path: &str) -> RelayResult<Self> {
        let url = UrlUtils::join(base_url, relative_path)
            .map_err(|e| RelayError::invalid_path(relative_path, e.to_string()))?;
        let path_only = relative_path
            .split(['?', '#'])
            .next()
            .unwrap_or(relative_path);

        Ok(Self {
            path: relative_path.to_string(),
            url,
            kind: classify(path_only),
        })
    }
}

/// Response produced by the interceptor, independent of the server framework
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Host and port clients use to reach this relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAddress {
    pub host: String,
    pub port: u16,
}

impl PublicAddress {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Per-session relay orchestrator
pub struct StreamInterceptor {
    base_url: Url,
    public: PublicAddress,
    fetcher: Arc<dyn UpstreamFetcher>,
    events: Arc<dyn EventSink>,
    tracker: PlaylistTracker,
}

impl StreamInterceptor {
    pub fn new(
        base_url: Url,
        public: PublicAddress,
        fetcher: Arc<dyn UpstreamFetcher>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            base_url,
            public,
            fetcher,
            events,
            tracker: PlaylistTracker::new(),
        }
    }

    pub fn tracker(&self) -> &PlaylistTracker {
        &self.tracker
    }

    /// Relay one request for `relative_path`
    pub async fn intercept(&self, relative_path: &str) -> RelayResult<RelayResponse> {
        let request = ResolvedRequest::resolve(&self.base_url, relative_path)?;
        let display_url = UrlUtils::obfuscate_credentials(request.url.as_str());

        if request.kind.is_manifest() && self.tracker.detect_switch(&request.url) {
            info!(url = %display_url, "Track switch detected");
            self.events.record(RelayEvent::TrackSwitch);
        }

        self.events.record(RelayEvent::Incoming {
            kind: request.kind,
            url: &request.url,
        });

        let started = Instant::now();
        let upstream = match self.fetcher.fetch(&request.url).await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %display_url, kind = %request.kind, "Upstream fetch failed: {}", e);
                return Err(e.into());
            }
        };
        let elapsed = started.elapsed();

        self.events.record(RelayEvent::Outgoing {
            kind: request.kind,
            url: &request.url,
            elapsed,
        });
        debug!(
            url = %display_url,
            kind = %request.kind,
            status = upstream.status.as_u16(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Upstream fetch complete"
        );

        Ok(match request.kind {
            ResourceKind::Manifest => self.relay_manifest(&request, upstream),
            ResourceKind::Segment => relay_segment(upstream),
        })
    }

    fn relay_manifest(
        &self,
        request: &ResolvedRequest,
        upstream: UpstreamResponse,
    ) -> RelayResponse {
        let mut headers = forwardable_headers(&upstream.headers);

        // Undecodable bodies are relayed untouched
        let Ok(text) = std::str::from_utf8(&upstream.body) else {
            debug!(
                url = %UrlUtils::obfuscate_credentials(request.url.as_str()),
                "Manifest body is not valid UTF-8, relaying unmodified"
            );
            return RelayResponse {
                status: manifest_status(upstream.status),
                headers,
                body: upstream.body.clone(),
            };
        };

        self.tracker.observe_manifest(&request.url, text);
        let rewritten = rewrite(text, &self.public.host, self.public.port);
        headers.remove(header::CONTENT_LENGTH);

        RelayResponse {
            status: manifest_status(upstream.status),
            headers,
            body: Bytes::from(rewritten),
        }
    }
}

fn relay_segment(upstream: UpstreamResponse) -> RelayResponse {
    RelayResponse {
        status: upstream.status,
        headers: forwardable_headers(&upstream.headers),
        body: upstream.body,
    }
}

/// Rewritten manifests are answered with 200 when the origin succeeded;
/// error statuses are passed through so clients still see the failure
fn manifest_status(upstream: StatusCode) -> StatusCode {
    if upstream.is_success() {
        StatusCode::OK
    } else {
        upstream
    }
}

/// Upstream headers minus hop-by-hop headers, including those named in `Connection`
fn forwardable_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();

    let named_by_connection: Vec<HeaderName> = upstream
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named_by_connection {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    for name in LEGACY_HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }

    headers
}
