//! Cookie-keyed session registry.
//!
//! Each session owns one [`ContextSlot`] behind its own mutex. Handlers
//! hold that mutex across the whole clear→extract→analyze→set window, so
//! a chat call racing an in-flight analyze on the same session can never
//! observe a cleared-but-not-yet-repopulated slot.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar};
use curasense_core::ContextSlot;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "curasense_session";

/// Upper bound on live sessions. Each slot can hold up to the chat
/// context cap of document text, so the registry cannot grow without
/// limit under cookieless traffic.
const MAX_SESSIONS: usize = 1024;

/// All live sessions, keyed by the session cookie value.
///
/// In-memory only, process lifetime. When the bound is reached the
/// oldest session (by first sight) is evicted; its cookie then behaves
/// like a fresh session with no document context.
pub struct SessionRegistry {
    max_sessions: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Arc<Mutex<ContextSlot>>>,
    order: VecDeque<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::bounded(MAX_SESSIONS)
    }

    pub fn bounded(max_sessions: usize) -> Self {
        Self {
            max_sessions,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Returns the slot of a session, creating it on first sight and
    /// evicting the oldest session once the bound is reached.
    pub async fn slot(&self, session_id: &str) -> Arc<Mutex<ContextSlot>> {
        let mut inner = self.inner.lock().await;
        if let Some(slot) = inner.slots.get(session_id) {
            return slot.clone();
        }

        while inner.slots.len() >= self.max_sessions {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.slots.remove(&oldest);
                    warn!(session = %oldest, "session evicted at capacity");
                }
                None => break,
            }
        }

        let slot = Arc::new(Mutex::new(ContextSlot::new()));
        inner.slots.insert(session_id.to_string(), slot.clone());
        inner.order.push_back(session_id.to_string());
        slot
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the session id from the cookie jar, minting a new id (and the
/// matching Set-Cookie) when the client has none yet.
pub fn session_id(jar: CookieJar) -> (String, CookieJar) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return (cookie.value().to_string(), jar);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .build();
    (id, jar.add(cookie))
}
