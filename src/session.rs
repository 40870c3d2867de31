//! # Sessions — Per-Visitor Drill Tallies
//!
//! Each browser is identified by an opaque UUID carried in the `xword_session`
//! cookie. The server keeps one [`SessionTally`] per id in a mutex-guarded map;
//! the lock is only held for a single counter update and never across `.await`.
//!
//! Sessions idle for longer than the configured TTL are dropped by
//! [`SessionStore::prune_expired`], which the web server runs periodically.

use crate::lock_or_recover;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "xword_session";

/// Two weeks, the usual browser-session lifetime for this kind of app.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// Running counters for one visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTally {
    pub correct_answers: u64,
    pub total_drills: u64,
}

struct Session {
    tally: SessionTally,
    last_seen: Instant,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve the id a request presented. A known id is touched and returned;
    /// a missing, malformed, or expired one yields a fresh id that is not stored
    /// until a counter is first written. The flag reports a fresh id.
    pub fn resolve(&self, presented: Option<&str>) -> (SessionId, bool) {
        if let Some(id) = presented.and_then(|s| s.parse::<SessionId>().ok()) {
            if let Some(session) = lock_or_recover(&self.sessions).get_mut(&id) {
                session.last_seen = Instant::now();
                return (id, false);
            }
        }
        (SessionId::new(), true)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        lock_or_recover(&self.sessions).contains_key(&id)
    }

    /// Current counters; zeros for an unknown session. Never creates one.
    pub fn tally(&self, id: SessionId) -> SessionTally {
        lock_or_recover(&self.sessions)
            .get(&id)
            .map(|s| s.tally)
            .unwrap_or_default()
    }

    /// Count one drill display.
    pub fn record_drill(&self, id: SessionId) -> SessionTally {
        self.update(id, |t| t.total_drills += 1)
    }

    /// Count one correct answer.
    pub fn record_correct(&self, id: SessionId) -> SessionTally {
        self.update(id, |t| t.correct_answers += 1)
    }

    fn update(&self, id: SessionId, f: impl FnOnce(&mut SessionTally)) -> SessionTally {
        let mut sessions = lock_or_recover(&self.sessions);
        let session = sessions.entry(id).or_insert_with(|| Session {
            tally: SessionTally::default(),
            last_seen: Instant::now(),
        });
        f(&mut session.tally);
        session.last_seen = Instant::now();
        session.tally
    }

    /// Drop sessions idle longer than the TTL. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut sessions = lock_or_recover(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() <= ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        lock_or_recover(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

/// Extract the session cookie value from a `Cookie` request header.
pub fn session_id_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// `Set-Cookie` value for a newly issued session.
pub fn session_cookie(id: SessionId, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        id,
        ttl.as_secs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_mints_unstored_session_without_cookie() {
        let store = SessionStore::default();
        let (id, is_new) = store.resolve(None);
        assert!(is_new);
        assert_eq!(store.tally(id), SessionTally::default());
        assert!(store.is_empty());
        assert!(!store.contains(id));
    }

    #[test]
    fn first_write_stores_session() {
        let store = SessionStore::default();
        let (id, _) = store.resolve(None);
        store.record_drill(id);
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn resolve_reuses_known_session() {
        let store = SessionStore::default();
        let (id, _) = store.resolve(None);
        store.record_drill(id);
        let (again, is_new) = store.resolve(Some(&id.to_string()));
        assert!(!is_new);
        assert_eq!(again, id);
    }

    #[test]
    fn resolve_replaces_garbage_and_unknown_ids() {
        let store = SessionStore::default();
        let (_, is_new) = store.resolve(Some("not-a-uuid"));
        assert!(is_new);
        let stranger = SessionId::new().to_string();
        let (id, is_new) = store.resolve(Some(&stranger));
        assert!(is_new);
        assert_ne!(id.to_string(), stranger);
    }

    #[test]
    fn counters_are_per_session() {
        let store = SessionStore::default();
        let (a, _) = store.resolve(None);
        let (b, _) = store.resolve(None);
        store.record_drill(a);
        store.record_drill(a);
        store.record_correct(a);
        store.record_drill(b);
        assert_eq!(
            store.tally(a),
            SessionTally {
                correct_answers: 1,
                total_drills: 2
            }
        );
        assert_eq!(
            store.tally(b),
            SessionTally {
                correct_answers: 0,
                total_drills: 1
            }
        );
    }

    #[test]
    fn tally_of_unknown_session_is_zero_and_not_created() {
        let store = SessionStore::default();
        assert_eq!(store.tally(SessionId::new()), SessionTally::default());
        assert!(store.is_empty());
    }

    #[test]
    fn prune_expired_drops_idle_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.record_drill(SessionId::new());
        store.record_correct(SessionId::new());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.prune_expired(), 2);
        assert!(store.is_empty());

        let keep = SessionStore::default();
        keep.record_drill(SessionId::new());
        assert_eq!(keep.prune_expired(), 0);
    }

    #[test]
    fn cookie_header_parsing_finds_session() {
        let header = "theme=dark; xword_session=abc-123; other=1";
        assert_eq!(session_id_from_cookie_header(header), Some("abc-123"));
        assert_eq!(session_id_from_cookie_header("theme=dark"), None);
        assert_eq!(session_id_from_cookie_header(""), None);
    }

    #[test]
    fn session_cookie_is_http_only_with_max_age() {
        let id: SessionId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        let cookie = session_cookie(id, Duration::from_secs(60));
        assert_eq!(
            cookie,
            "xword_session=550e8400-e29b-41d4-a716-446655440000; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
    }
}
