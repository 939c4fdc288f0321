use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

/// `{username -> {contact_uri, source_address, expires_seconds, registered_at}}`
/// (§3 "Registration entry"). Added on first accepted REGISTER; overwritten
/// on re-REGISTER from the same username.
#[derive(Debug, Clone)]
pub struct RegistrationEntry {
    pub contact_uri: String,
    pub source_address: SocketAddr,
    pub expires_seconds: u32,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.registered_at + chrono::Duration::seconds(self.expires_seconds as i64)
    }
}

/// The server-side registrar table. REGISTER always succeeds in this core
/// (§4.6 — no authentication enforced); entries expire lazily on query and
/// can additionally be swept periodically via `sweep_expired`.
#[derive(Default)]
pub struct Registrar {
    entries: DashMap<String, RegistrationEntry>,
}

impl Registrar {
    pub fn new() -> Registrar {
        Registrar::default()
    }

    pub fn register(&self, username: &str, contact_uri: &str, source_address: SocketAddr, expires_seconds: u32) {
        self.entries.insert(
            username.to_string(),
            RegistrationEntry {
                contact_uri: contact_uri.to_string(),
                source_address,
                expires_seconds,
                registered_at: Utc::now(),
            },
        );
    }

    /// `expires_seconds == 0` is a de-registration per RFC 3261 REGISTER
    /// semantics; treated as an immediate removal rather than a zero-TTL
    /// entry that would just expire on the next lookup anyway.
    pub fn unregister(&self, username: &str) {
        self.entries.remove(username);
    }

    /// Lazy eviction: a lookup past expiry removes the entry and reports
    /// it as absent rather than returning stale data.
    pub fn lookup(&self, username: &str) -> Option<RegistrationEntry> {
        let now = Utc::now();
        let entry = self.entries.get(username)?;
        if entry.is_expired(now) {
            drop(entry);
            self.entries.remove(username);
            return None;
        }
        Some(entry.clone())
    }

    pub fn is_registered(&self, username: &str) -> bool {
        self.lookup(username).is_some()
    }

    /// Removes all entries expired as of now, beyond the lazy per-lookup
    /// eviction above; callers may run this on a periodic tick (mirroring
    /// the reference server's cleanup loop) but are not required to.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for username in &expired {
            self.entries.remove(username);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "swept expired registrations");
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:5060".parse().unwrap()
    }

    #[test]
    fn register_then_lookup_roundtrips() {
        let registrar = Registrar::new();
        registrar.register("alice", "sip:alice@1.2.3.4:5060", addr(), 3600);
        let entry = registrar.lookup("alice").unwrap();
        assert_eq!(entry.contact_uri, "sip:alice@1.2.3.4:5060");
    }

    #[test]
    fn re_register_overwrites_previous_contact() {
        let registrar = Registrar::new();
        registrar.register("alice", "sip:alice@1.2.3.4:5060", addr(), 3600);
        registrar.register("alice", "sip:alice@9.9.9.9:5060", addr(), 3600);
        assert_eq!(registrar.len(), 1);
        assert_eq!(registrar.lookup("alice").unwrap().contact_uri, "sip:alice@9.9.9.9:5060");
    }

    #[test]
    fn expired_entry_is_evicted_lazily_on_lookup() {
        let registrar = Registrar::new();
        registrar.entries.insert(
            "bob".to_string(),
            RegistrationEntry {
                contact_uri: "sip:bob@h".to_string(),
                source_address: addr(),
                expires_seconds: 0,
                registered_at: Utc::now() - chrono::Duration::seconds(5),
            },
        );
        assert!(registrar.lookup("bob").is_none());
        assert!(registrar.is_empty());
    }

    #[test]
    fn sweep_expired_removes_stale_entries_without_a_lookup() {
        let registrar = Registrar::new();
        registrar.entries.insert(
            "carol".to_string(),
            RegistrationEntry {
                contact_uri: "sip:carol@h".to_string(),
                source_address: addr(),
                expires_seconds: 0,
                registered_at: Utc::now() - chrono::Duration::seconds(5),
            },
        );
        registrar.register("dave", "sip:dave@h", addr(), 3600);

        let swept = registrar.sweep_expired();
        assert_eq!(swept, 1);
        assert_eq!(registrar.len(), 1);
        assert!(registrar.is_registered("dave"));
    }

    #[test]
    fn unregister_removes_entry_immediately() {
        let registrar = Registrar::new();
        registrar.register("alice", "sip:alice@h", addr(), 3600);
        registrar.unregister("alice");
        assert!(registrar.lookup("alice").is_none());
    }
}
