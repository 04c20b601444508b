//! Identity collaborator.
//!
//! Owns email/password accounts and the single current session. Consumers
//! never read the session directly; they [`IdentityService::subscribe`] and
//! receive the current state followed by every change.

mod password;

use chrono::Utc;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::AuthError;
use crate::models::Principal;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    SignedIn(Principal),
    SignedOut,
}

impl SessionEvent {
    fn from_current(current: Option<&Principal>) -> Self {
        match current {
            Some(p) => Self::SignedIn(p.clone()),
            None => Self::SignedOut,
        }
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: Vec<(u64, Sender<SessionEvent>)>,
}

pub(crate) struct IdentityService {
    conn: Connection,
    email_re: Regex,
    current: Option<Principal>,
    listeners: Rc<RefCell<Listeners>>,
}

impl IdentityService {
    /// Restores any persisted session. Failure here means the identity
    /// service is unusable and the application should not start.
    pub(crate) fn new(conn: Connection) -> Result<Self, AuthError> {
        let email_re =
            Regex::new(EMAIL_PATTERN).map_err(|e| AuthError::Misconfigured(e.to_string()))?;
        let current = conn
            .query_row(
                "SELECT a.uid, a.email FROM session s JOIN accounts a ON a.uid = s.uid WHERE s.id = 1",
                [],
                |row| {
                    Ok(Principal {
                        uid: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?;
        log::info!(
            "event=identity_init status=ok restored_session={}",
            current.is_some()
        );
        Ok(Self {
            conn,
            email_re,
            current,
            listeners: Rc::new(RefCell::new(Listeners::default())),
        })
    }

    pub(crate) fn current(&self) -> Option<&Principal> {
        self.current.as_ref()
    }

    /// Create an account and sign it in.
    pub(crate) fn register(&mut self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = self.normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(AuthError::EmailInUse(email));
        }

        let principal = Principal {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            email,
        };
        let salt = password::new_salt();
        self.conn.execute(
            "INSERT INTO accounts (uid, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                principal.uid,
                principal.email,
                password::hash(password, &salt),
                salt,
                Utc::now().to_rfc3339(),
            ],
        )?;
        log::info!("event=register status=ok uid={}", principal.uid);

        self.start_session(principal.clone())?;
        Ok(principal)
    }

    pub(crate) fn sign_in(&mut self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = email.trim().to_lowercase();
        let row: Option<(String, String, String, String)> = self
            .conn
            .query_row(
                "SELECT uid, email, password_hash, salt FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((uid, email, hash, salt)) = row else {
            log::warn!("event=sign_in status=rejected reason=unknown_email");
            return Err(AuthError::InvalidCredentials);
        };
        if !password::verify(password, &salt, &hash) {
            log::warn!("event=sign_in status=rejected reason=bad_password uid={uid}");
            return Err(AuthError::InvalidCredentials);
        }

        let principal = Principal { uid, email };
        self.start_session(principal.clone())?;
        log::info!("event=sign_in status=ok uid={}", principal.uid);
        Ok(principal)
    }

    pub(crate) fn sign_out(&mut self) -> Result<(), AuthError> {
        self.conn.execute("DELETE FROM session", [])?;
        if let Some(p) = &self.current {
            log::info!("event=sign_out status=ok uid={}", p.uid);
        }
        self.set_current(None);
        Ok(())
    }

    /// Register a listener. It receives the current state immediately.
    pub(crate) fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(SessionEvent::from_current(self.current.as_ref()));

        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.senders.push((id, tx));
        log::debug!("event=subscribe id={id}");

        Subscription {
            id,
            events: rx,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().senders.len()
    }

    fn normalize_email(&self, email: &str) -> Result<String, AuthError> {
        let email = email.trim().to_lowercase();
        if !self.email_re.is_match(&email) {
            return Err(AuthError::InvalidEmail(email));
        }
        Ok(email)
    }

    fn start_session(&mut self, principal: Principal) -> Result<(), AuthError> {
        self.conn.execute(
            "INSERT INTO session (id, uid, signed_in_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET uid = excluded.uid, signed_in_at = excluded.signed_in_at",
            params![principal.uid, Utc::now().to_rfc3339()],
        )?;
        self.set_current(Some(principal));
        Ok(())
    }

    /// Listeners only hear about actual changes.
    fn set_current(&mut self, next: Option<Principal>) {
        if self.current == next {
            return;
        }
        self.current = next;
        let event = SessionEvent::from_current(self.current.as_ref());
        self.listeners
            .borrow_mut()
            .senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }
}

/// A live registration with the identity service. Dropping it unsubscribes.
pub(crate) struct Subscription {
    id: u64,
    events: Receiver<SessionEvent>,
    listeners: Weak<RefCell<Listeners>>,
}

impl Subscription {
    /// Pending events, oldest first.
    pub(crate) fn drain(&self) -> Vec<SessionEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .senders
                .retain(|(id, _)| *id != self.id);
            log::debug!("event=unsubscribe id={}", self.id);
        }
    }
}

#[cfg(test)]
mod tests;
