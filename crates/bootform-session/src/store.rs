//! Shared session handles and an in-memory session store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::debug;

use crate::error::{Result, SessionError};
use crate::session::Session;

/// Access to a session's flash-message queues.
///
/// `pop_flash` must read and clear a queue as one step so that two renders
/// never see the same message.
pub trait FlashQueue: Send + Sync {
    /// Queues a message.
    fn flash(&self, queue: &str, message: &str) -> Result<()>;

    /// Returns the pending messages without clearing them.
    fn peek_flash(&self, queue: &str) -> Result<Vec<String>>;

    /// Returns the pending messages and clears the queue.
    fn pop_flash(&self, queue: &str) -> Result<Vec<String>>;
}

/// A cloneable handle to one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    /// Wraps a session.
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Locks the session for exclusive access.
    pub fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.inner.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Returns the session key.
    pub fn key(&self) -> Result<String> {
        Ok(self.lock()?.session_key.clone())
    }

    /// Returns the CSRF token, creating one if needed.
    pub fn csrf_token(&self) -> Result<String> {
        Ok(self.lock()?.get_csrf_token())
    }
}

impl FlashQueue for SessionHandle {
    fn flash(&self, queue: &str, message: &str) -> Result<()> {
        self.lock()?.flash(queue, message);
        Ok(())
    }

    fn peek_flash(&self, queue: &str) -> Result<Vec<String>> {
        Ok(self.lock()?.peek_flash(queue))
    }

    fn pop_flash(&self, queue: &str) -> Result<Vec<String>> {
        let messages = self.lock()?.pop_flash(queue);
        debug!(queue, count = messages.len(), "drained flash queue");
        Ok(messages)
    }
}

/// In-memory session store keyed by session key.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and stores a new session.
    pub fn create(&self) -> Result<SessionHandle> {
        let session = Session::new();
        let key = session.session_key.clone();
        let handle = SessionHandle::new(session);
        self.sessions
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .insert(key, handle.clone());
        Ok(handle)
    }

    /// Finds a session by its key. Expired sessions are dropped.
    pub fn get(&self, session_key: &str) -> Result<SessionHandle> {
        let handle = self
            .sessions
            .read()
            .map_err(|_| SessionError::Poisoned)?
            .get(session_key)
            .cloned()
            .ok_or(SessionError::SessionNotFound)?;

        if handle.lock()?.is_expired() {
            self.remove(session_key)?;
            return Err(SessionError::Expired);
        }

        Ok(handle)
    }

    /// Removes a session.
    pub fn remove(&self, session_key: &str) -> Result<()> {
        self.sessions
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .remove(session_key);
        Ok(())
    }

    /// Deletes all expired sessions, returning how many were removed.
    pub fn clear_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Poisoned)?;
        let before = sessions.len();
        let mut expired = Vec::new();
        for (key, handle) in sessions.iter() {
            if handle.lock()?.is_expired() {
                expired.push(key.clone());
            }
        }
        for key in expired {
            sessions.remove(&key);
        }
        Ok(before - sessions.len())
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> Result<usize> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| SessionError::Poisoned)?
            .len())
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
