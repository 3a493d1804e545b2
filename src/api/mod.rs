//! API module for HTTP and WebSocket endpoints
//!
//! REST snapshot/mutation endpoints plus the real-time notification channel.

pub mod http;
pub mod rest;
pub mod websocket;
