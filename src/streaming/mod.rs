/**
 * streaming/mod.rs
 * =================
 * Public module entrypoint for the HLS relay subsystem.
 *
 * Exposes:
 *   - classification: Suffix-based decision between manifest and segment resources.
 *   - tracker: Master playlist snapshot and quality track switch detection.
 *   - rewriter: Textual rewrite of absolute URLs in manifest bodies.
 *   - events: `[IN]` / `[OUT]` / `[TRACK SWITCH]` event lines and their sinks.
 *   - interceptor: Per-request orchestration tying the above to the upstream fetcher.
 */
pub mod classification;
pub mod events;
pub mod interceptor;
pub mod rewriter;
pub mod tracker;

pub use classification::{ResourceKind, classify};
pub use events::{EventSink, MemorySink, RelayEvent, WriterSink, sink_for};
pub use interceptor::{PublicAddress, RelayResponse, ResolvedRequest, StreamInterceptor};
pub use rewriter::rewrite;
pub use tracker::{MasterManifestSnapshot, PlaylistTracker, parse_master};
