//! The three external collaborators of §6, modeled as traits with no-op
//! default implementations — the core compiles and runs standalone
//! without pulling in a database or HTTP crate, mirroring the teacher's
//! convention of keeping cross-cutting concerns behind a trait at the
//! crate boundary (e.g. the transport trait implemented by each concrete
//! transport).

use tracing::debug;

/// Opaque handle a `CallStore` hands back from `record_call_started` so
/// later calls can be correlated without the core knowing the store's
/// internal key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogHandle(pub u64);

pub trait CallStore: Send + Sync {
    fn record_call_started(&self, call_id: &str, from: &str, to: &str, direction: &str) -> DialogHandle;
    fn record_state_change(&self, handle: DialogHandle, new_state: &str);
    fn record_event(&self, handle: DialogHandle, event_type: &str, payload: &str);
}

/// Default no-op persistence: logs at DEBUG and hands back a handle
/// derived from nothing but a process-local counter, satisfying the
/// trait without a backing store.
#[derive(Default)]
pub struct NullCallStore {
    next: std::sync::atomic::AtomicU64,
}

impl CallStore for NullCallStore {
    fn record_call_started(&self, call_id: &str, from: &str, to: &str, direction: &str) -> DialogHandle {
        let id = self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        debug!(call_id, from, to, direction, "call started (no-op store)");
        DialogHandle(id)
    }

    fn record_state_change(&self, handle: DialogHandle, new_state: &str) {
        debug!(handle = handle.0, new_state, "state change (no-op store)");
    }

    fn record_event(&self, handle: DialogHandle, event_type: &str, payload: &str) {
        debug!(handle = handle.0, event_type, payload, "event (no-op store)");
    }
}

/// Fire-and-forget real-time fan-out; errors are logged only, never
/// propagated (§6 "Real-time fan-out").
pub trait EventSink: Send + Sync {
    fn publish(&self, call_id: &str, event: &str);
}

#[derive(Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, call_id: &str, event: &str) {
        debug!(call_id, event, "published (no-op sink)");
    }
}

/// A flat value bag with the recognized keys of §6: `server_host`,
/// `server_port`, `username`, `password`, `domain`, `local_ip`,
/// `local_port`, `realm`, `cors_origins`.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn server_host(&self) -> String {
        self.get("server_host").unwrap_or_else(|| "0.0.0.0".to_string())
    }
    fn server_port(&self) -> u16 {
        self.get("server_port").and_then(|v| v.parse().ok()).unwrap_or(5060)
    }
    fn domain(&self) -> String {
        self.get("domain").unwrap_or_else(|| "localhost".to_string())
    }
    fn realm(&self) -> String {
        self.get("realm").unwrap_or_else(|| self.domain())
    }
    fn local_ip(&self) -> String {
        self.get("local_ip").unwrap_or_else(|| "0.0.0.0".to_string())
    }
    fn local_port(&self) -> u16 {
        self.get("local_port").and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<String, String>);
    impl ConfigSource for MapConfig {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    #[test]
    fn missing_keys_fall_back_to_documented_defaults() {
        let config = MapConfig(HashMap::new());
        assert_eq!(config.server_port(), 5060);
        assert_eq!(config.local_ip(), "0.0.0.0");
        assert_eq!(config.realm(), config.domain());
    }

    #[test]
    fn realm_defaults_to_explicit_domain_when_set() {
        let mut map = HashMap::new();
        map.insert("domain".to_string(), "example.com".to_string());
        let config = MapConfig(map);
        assert_eq!(config.realm(), "example.com");
    }

    #[test]
    fn null_collaborators_do_not_panic() {
        let store = NullCallStore::default();
        let handle = store.record_call_started("cid", "a", "b", "inbound");
        store.record_state_change(handle, "CONNECTED");
        store.record_event(handle, "test", "{}");

        let sink = NullEventSink;
        sink.publish("cid", "connected");
    }
}
