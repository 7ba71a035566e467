//! Transparent HLS relay
//!
//! Sits between a player and an origin, forwards manifest and segment requests,
//! rewrites absolute URLs in manifests so playback stays on the relay, and logs
//! every request and quality track switch.

pub mod config;
pub mod errors;
pub mod streaming;
pub mod utils;
pub mod web;
