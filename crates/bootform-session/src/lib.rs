//! # bootform-session
//!
//! Request sessions for bootform: flash-message queues, the anti-CSRF token
//! and an in-memory store.
//!
//! ## Quick Start
//!
//! ```rust
//! use bootform_session::{FlashQueue, SessionStore};
//!
//! let store = SessionStore::new();
//! let session = store.create().expect("fresh store");
//!
//! session.flash("", "Your profile was saved").expect("session lock");
//!
//! // Popping drains the queue: messages are shown exactly once.
//! let messages = session.pop_flash("").expect("session lock");
//! assert_eq!(messages, vec!["Your profile was saved"]);
//! assert!(session.pop_flash("").expect("session lock").is_empty());
//! ```
//!
//! ## CSRF tokens
//!
//! [`Session::get_csrf_token`] lazily creates a 64 character token and
//! keeps returning it until [`Session::new_csrf_token`] rotates it.

mod error;
mod session;
mod store;

pub use error::{Result, SessionError};
pub use session::{Session, SessionData, DEFAULT_QUEUE};
pub use store::{FlashQueue, SessionHandle, SessionStore};
