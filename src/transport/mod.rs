//! Session-addressed transports.
//!
//! One logical server multiplexes many concurrent client sessions across
//! two HTTP transport generations plus stdio. The registry is the single
//! source of truth for session liveness; every transport is owned by its
//! registry entry and addressed only through it.

pub mod http;
pub mod session;
pub mod sse;
pub mod stdio;
pub mod streamable;

use std::fmt;

use crate::transport::sse::SseTransport;
use crate::transport::streamable::StreamableTransport;

/// Which wire convention a session uses. Fixed at creation; a session
/// never migrates between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Single-endpoint streamable HTTP (`POST/GET/DELETE /mcp`).
    Streamable,
    /// Legacy dual-endpoint event stream (`GET /sse` + `POST /messages`).
    Sse,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Streamable => f.write_str("streamable-http"),
            Self::Sse => f.write_str("sse"),
        }
    }
}

/// A live session's transport. Closed sum type so dispatch is exhaustive;
/// a third transport generation becomes a compile-time-checked change.
pub enum SessionTransport {
    Streamable(StreamableTransport),
    Sse(SseTransport),
}

impl SessionTransport {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Streamable(_) => TransportKind::Streamable,
            Self::Sse(_) => TransportKind::Sse,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Streamable(t) => t.id(),
            Self::Sse(t) => t.id(),
        }
    }

    /// Release the transport's streams. Best-effort; the registry entry
    /// is removed separately so a failure here never strands liveness.
    pub fn close(&self) {
        match self {
            Self::Streamable(t) => t.close(),
            Self::Sse(t) => t.close(),
        }
    }
}
