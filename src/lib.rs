//! Google Maps MCP server.
//!
//! Exposes Google Maps services (place search, geocoding, directions,
//! distance matrix, elevation) as Model Context Protocol tools, reachable
//! over stdio, streamable HTTP, or the legacy SSE transport. The core is
//! the session-addressed request router in [`transport`]: one process
//! multiplexes many concurrent client sessions across heterogeneous
//! transports while keeping per-session state isolated in a single
//! registry.

pub mod config;
pub mod error;
pub mod maps;
pub mod protocol;
pub mod tools;
pub mod transport;
