//! The session registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::transport::SessionTransport;

/// Live transports keyed by session id.
///
/// The registry is the only shared mutable state in the server and the
/// single source of truth for session liveness. Lookups hand out `Arc`
/// clones; the lock is never held across an await point.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionTransport>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport under a freshly minted id.
    ///
    /// Ids are server-generated UUIDs, so a collision means a bug; the
    /// existing entry wins and the new transport is dropped.
    pub fn register(&self, id: String, transport: Arc<SessionTransport>) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if sessions.contains_key(&id) {
            warn!(session_id = %id, "refusing to replace live session");
            return;
        }
        debug!(session_id = %id, kind = %transport.kind(), "session registered");
        sessions.insert(id, transport);
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<SessionTransport>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Remove and return the entry. Idempotent.
    pub fn remove(&self, id: &str) -> Option<Arc<SessionTransport>> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        if removed.is_some() {
            debug!(session_id = %id, "session removed");
        }
        removed
    }

    /// Take every entry, leaving the registry empty. Used at shutdown.
    pub fn drain(&self) -> Vec<(String, Arc<SessionTransport>)> {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::McpEngine;
    use crate::tools::ToolRegistry;
    use crate::transport::streamable::StreamableTransport;

    fn transport(id: &str) -> Arc<SessionTransport> {
        let engine = McpEngine::new(Arc::new(ToolRegistry::new()));
        Arc::new(SessionTransport::Streamable(StreamableTransport::new(
            id.to_string(),
            engine,
        )))
    }

    #[test]
    fn test_register_lookup_remove() {
        let registry = SessionRegistry::new();
        registry.register("a".to_string(), transport("a"));
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("b").is_none());
        assert!(registry.remove("a").is_some());
        assert!(registry.lookup("a").is_none());
        // Idempotent.
        assert!(registry.remove("a").is_none());
    }

    #[test]
    fn test_register_never_replaces_live_session() {
        let registry = SessionRegistry::new();
        registry.register("a".to_string(), transport("a"));
        let first = registry.lookup("a").expect("registered");
        registry.register("a".to_string(), transport("a2"));
        let second = registry.lookup("a").expect("still registered");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_access() {
        let registry = Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let id = format!("session-{i}");
                    registry.register(id.clone(), transport(&id));
                    assert!(registry.lookup(&id).is_some());
                    registry.remove(&id);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert!(registry.is_empty());
    }
}
