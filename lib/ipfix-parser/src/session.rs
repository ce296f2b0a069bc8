//! Per-exporter template state.
//!
//! A [`Session`] holds the templates one exporter announced for one
//! Observation Domain. The [`SessionRegistry`] owns every session and hands
//! out per-session locks, so decoding for one exporter never waits on
//! another.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use crate::template::{Template, TemplateKind};

/// Identity of an exporter. The source port is deliberately absent: exporters
/// may send from changing ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionKey {
    pub exporter: IpAddr,
    pub observation_domain: u32,
}

impl SessionKey {
    pub const fn new(exporter: IpAddr, observation_domain: u32) -> Self {
        Self {
            exporter,
            observation_domain,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    templates: HashMap<u16, Arc<Template>>,
    expected_sequence: Option<u32>,
    last_seen: Instant,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            templates: HashMap::new(),
            expected_sequence: None,
            last_seen: Instant::now(),
        }
    }

    pub const fn key(&self) -> SessionKey {
        self.key
    }

    pub fn template(&self, id: u16) -> Option<Arc<Template>> {
        self.templates.get(&id).cloned()
    }

    /// Installs a template, replacing any earlier one with the same id.
    pub fn install(&mut self, template: Template) -> Option<Arc<Template>> {
        self.templates.insert(template.id, Arc::new(template))
    }

    pub fn withdraw(&mut self, id: u16) -> bool {
        self.templates.remove(&id).is_some()
    }

    /// Removes every template of `kind`, returning how many were removed.
    pub fn withdraw_all(&mut self, kind: TemplateKind) -> usize {
        let before = self.templates.len();
        self.templates.retain(|_, template| template.kind != kind);
        before - self.templates.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub const fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Compares a message's sequence number with the one this session
    /// expects. Returns the expected value when they differ.
    pub fn check_sequence(&self, received: u32) -> Option<u32> {
        self.expected_sequence
            .filter(|expected| *expected != received)
    }

    /// Records that a message with `sequence` carried `records` Data Records.
    pub fn advance_sequence(&mut self, sequence: u32, records: usize) {
        // Sequence numbers count records modulo 2^32.
        self.expected_sequence = Some(sequence.wrapping_add(records as u32));
    }

    /// Stops checking until the next message re-establishes a baseline. Used
    /// when a message carried Data Records that could not be counted.
    pub fn reset_sequence(&mut self) {
        self.expected_sequence = None;
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Every session known to a collector.
///
/// The map is only locked long enough to find or create a session; all work
/// on a session happens under that session's own mutex.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionKey, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `key`, created on first use.
    pub fn session(&self, key: SessionKey) -> SessionHandle {
        Arc::clone(
            self.sessions
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(key))))
                .value(),
        )
    }

    pub fn get(&self, key: &SessionKey) -> Option<SessionHandle> {
        self.sessions.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn resolve_template(&self, key: &SessionKey, template_id: u16) -> Option<Arc<Template>> {
        let session = self.get(key)?;
        lock(&session).template(template_id)
    }

    pub fn install_template(&self, key: SessionKey, template: Template) {
        let session = self.session(key);
        let mut session = lock(&session);
        session.install(template);
        session.touch();
    }

    pub fn withdraw_template(&self, key: &SessionKey, template_id: u16) -> bool {
        self.get(key)
            .is_some_and(|session| lock(&session).withdraw(template_id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops sessions that have seen no traffic for at least `idle_timeout`.
    /// A session that is being decoded right now is never idle.
    pub fn expire_idle(&self, idle_timeout: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.last_seen().elapsed() < idle_timeout,
            Err(TryLockError::Poisoned(poisoned)) => {
                poisoned.into_inner().last_seen().elapsed() < idle_timeout
            }
            Err(TryLockError::WouldBlock) => true,
        });
        before.saturating_sub(self.sessions.len())
    }
}

/// A panic while holding the lock leaves templates and counters usable, so
/// poisoning is ignored.
pub(crate) fn lock(session: &SessionHandle) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::ie::InformationElementRegistry;
    use crate::template::FieldSpecifier;

    fn key(last: u8, domain: u32) -> SessionKey {
        SessionKey::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last)), domain)
    }

    fn template(id: u16, element: u16) -> Template {
        let elements = InformationElementRegistry::iana();
        Template::data(
            id,
            vec![FieldSpecifier::new(elements.resolve(0, element), 4)],
        )
    }

    #[test]
    fn sessions_are_created_lazily() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve_template(&key(1, 0), 256).is_none());
        assert!(registry.is_empty());

        registry.session(key(1, 0));
        registry.session(key(1, 0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn templates_are_scoped_by_exporter_and_domain() {
        let registry = SessionRegistry::new();
        registry.install_template(key(1, 0), template(256, 1));

        assert!(registry.resolve_template(&key(1, 0), 256).is_some());
        assert!(registry.resolve_template(&key(1, 1), 256).is_none());
        assert!(registry.resolve_template(&key(2, 0), 256).is_none());
    }

    #[test]
    fn retransmitted_template_replaces_previous() {
        let registry = SessionRegistry::new();
        registry.install_template(key(1, 0), template(256, 1));
        registry.install_template(key(1, 0), template(256, 2));

        let resolved = registry
            .resolve_template(&key(1, 0), 256)
            .expect("template installed");
        assert_eq!(resolved.fields[0].name(), "packetDeltaCount");
    }

    #[test]
    fn withdraws_templates() {
        let registry = SessionRegistry::new();
        registry.install_template(key(1, 0), template(256, 1));
        assert!(registry.withdraw_template(&key(1, 0), 256));
        assert!(!registry.withdraw_template(&key(1, 0), 256));
        assert!(registry.resolve_template(&key(1, 0), 256).is_none());
    }

    #[test]
    fn withdraw_all_only_touches_one_kind() {
        let mut session = Session::new(key(1, 0));
        session.install(template(256, 1));
        session.install(template(257, 2));
        session.install(Template::options(258, 1, template(0, 149).fields));

        assert_eq!(session.withdraw_all(TemplateKind::Data), 2);
        assert_eq!(session.template_count(), 1);
        assert!(session.template(258).is_some());
    }

    #[test]
    fn tracks_sequence_numbers() {
        let mut session = Session::new(key(1, 0));
        assert_eq!(session.check_sequence(10), None);

        session.advance_sequence(10, 3);
        assert_eq!(session.check_sequence(13), None);
        assert_eq!(session.check_sequence(20), Some(13));

        session.advance_sequence(u32::MAX, 2);
        assert_eq!(session.check_sequence(1), None);
    }

    #[test]
    fn reset_sequence_accepts_any_next_number() {
        let mut session = Session::new(key(1, 0));
        session.advance_sequence(10, 3);
        session.reset_sequence();
        assert_eq!(session.check_sequence(500), None);

        session.advance_sequence(500, 1);
        assert_eq!(session.check_sequence(502), Some(501));
    }

    #[test]
    fn sessions_stay_usable_after_a_panic_under_their_lock() {
        let registry = Arc::new(SessionRegistry::new());
        registry.install_template(key(1, 0), template(256, 1));

        let session = registry.session(key(1, 0));
        let result = std::thread::spawn(move || {
            let _guard = session.lock().unwrap();
            panic!("decoder crashed");
        })
        .join();
        assert!(result.is_err());
        assert!(registry.session(key(1, 0)).is_poisoned());

        assert!(registry.resolve_template(&key(1, 0), 256).is_some());
        registry.install_template(key(1, 0), template(257, 2));
        assert!(registry.resolve_template(&key(1, 0), 257).is_some());
        assert!(registry.withdraw_template(&key(1, 0), 256));
        assert_eq!(registry.expire_idle(Duration::ZERO), 1);
    }

    #[test]
    fn expires_idle_sessions() {
        let registry = SessionRegistry::new();
        registry.session(key(1, 0));
        registry.session(key(2, 0));

        assert_eq!(registry.expire_idle(Duration::from_secs(3600)), 0);
        assert_eq!(registry.len(), 2);

        let busy = registry.session(key(2, 0));
        let _guard = lock(&busy);
        assert_eq!(registry.expire_idle(Duration::ZERO), 1);
        assert!(registry.get(&key(1, 0)).is_none());
        assert!(registry.get(&key(2, 0)).is_some());
    }

    #[test]
    fn concurrent_installs_are_visible() {
        let registry = Arc::new(SessionRegistry::new());
        let handles = (0..8u16)
            .map(|n| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.install_template(key(1, 0), template(256 + n, 1));
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("installer thread panicked");
        }

        let session = registry.session(key(1, 0));
        assert_eq!(lock(&session).template_count(), 8);
    }
}
