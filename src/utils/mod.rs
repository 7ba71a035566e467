pub mod http_client;
pub mod url;

pub use http_client::{HttpUpstreamFetcher, UpstreamFetcher, UpstreamResponse};
pub use url::UrlUtils;
