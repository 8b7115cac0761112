//! Courier - Asynchronous HTTP GET Client
//!
//! One [`client::Client`] owns one worker thread; each request performs a
//! single HTTP/1.1 GET over its own TCP connection and reports the outcome
//! to a completion callback exactly once.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
