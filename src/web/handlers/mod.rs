//! HTTP request handlers

pub mod relay;
