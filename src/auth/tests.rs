#![allow(clippy::unwrap_used)]

use super::*;

fn service() -> IdentityService {
    IdentityService::new(crate::db::open_in_memory().unwrap()).unwrap()
}

// ── Accounts ──────────────────────────────────────────────────

#[test]
fn test_register_signs_in() {
    let mut ids = service();
    let p = ids.register("  Ada@Example.com ", "secret1").unwrap();
    assert_eq!(p.email, "ada@example.com");
    assert!(!p.uid.is_empty());
    assert_eq!(ids.current(), Some(&p));
}

#[test]
fn test_register_rejects_bad_email() {
    let mut ids = service();
    for email in ["", "ada", "ada@", "@example.com", "ada@example", "a b@example.com"] {
        let err = ids.register(email, "secret1").unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)), "accepted {email:?}");
    }
    assert!(ids.current().is_none());
}

#[test]
fn test_register_rejects_short_password() {
    let mut ids = service();
    let err = ids.register("ada@example.com", "12345").unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(MIN_PASSWORD_LEN)));
    assert_eq!(format!("{err}"), "password should be at least 6 characters");
}

#[test]
fn test_register_rejects_duplicate_email_case_insensitive() {
    let mut ids = service();
    ids.register("ada@example.com", "secret1").unwrap();
    let err = ids.register("ADA@example.com", "another1").unwrap_err();
    assert!(matches!(err, AuthError::EmailInUse(_)));
}

#[test]
fn test_sign_in_checks_password() {
    let mut ids = service();
    let registered = ids.register("ada@example.com", "secret1").unwrap();
    ids.sign_out().unwrap();

    assert!(matches!(
        ids.sign_in("ada@example.com", "wrong-password"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        ids.sign_in("bob@example.com", "secret1"),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(ids.current().is_none());

    let p = ids.sign_in("Ada@Example.com", "secret1").unwrap();
    assert_eq!(p, registered);
}

#[test]
fn test_password_is_not_stored_in_clear() {
    let mut ids = service();
    ids.register("ada@example.com", "secret1").unwrap();
    let (hash, salt): (String, String) = ids
        .conn
        .query_row("SELECT password_hash, salt FROM accounts", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_ne!(hash, "secret1");
    assert_eq!(hash.len(), 64);
    assert!(password::verify("secret1", &salt, &hash));
    assert!(!password::verify("secret2", &salt, &hash));
}

#[test]
fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projcost.db");
    let registered = {
        let mut ids = IdentityService::new(crate::db::open(&path).unwrap()).unwrap();
        ids.register("ada@example.com", "secret1").unwrap()
    };

    let mut ids = IdentityService::new(crate::db::open(&path).unwrap()).unwrap();
    assert_eq!(ids.current(), Some(&registered));

    ids.sign_out().unwrap();
    let ids = IdentityService::new(crate::db::open(&path).unwrap()).unwrap();
    assert!(ids.current().is_none());
}

// ── Subscriptions ─────────────────────────────────────────────

#[test]
fn test_subscribe_delivers_current_state_first() {
    let mut ids = service();
    let sub = ids.subscribe();
    assert_eq!(sub.drain(), vec![SessionEvent::SignedOut]);

    let p = ids.register("ada@example.com", "secret1").unwrap();
    let late = ids.subscribe();
    assert_eq!(late.drain(), vec![SessionEvent::SignedIn(p.clone())]);
    assert_eq!(sub.drain(), vec![SessionEvent::SignedIn(p)]);
}

#[test]
fn test_events_follow_changes_in_order() {
    let mut ids = service();
    let sub = ids.subscribe();
    sub.drain();

    let ada = ids.register("ada@example.com", "secret1").unwrap();
    ids.sign_out().unwrap();
    // Signing out twice is not a change.
    ids.sign_out().unwrap();
    let bob = ids.register("bob@example.com", "secret2").unwrap();

    assert_eq!(
        sub.drain(),
        vec![
            SessionEvent::SignedIn(ada),
            SessionEvent::SignedOut,
            SessionEvent::SignedIn(bob),
        ]
    );
    assert!(sub.drain().is_empty());
}

#[test]
fn test_failed_sign_in_emits_nothing() {
    let mut ids = service();
    let sub = ids.subscribe();
    sub.drain();
    assert!(ids.sign_in("nobody@example.com", "secret1").is_err());
    assert!(sub.drain().is_empty());
}

#[test]
fn test_drop_unsubscribes() {
    let mut ids = service();
    let a = ids.subscribe();
    let b = ids.subscribe();
    assert_eq!(ids.listener_count(), 2);

    drop(a);
    assert_eq!(ids.listener_count(), 1);

    ids.register("ada@example.com", "secret1").unwrap();
    assert_eq!(b.drain().len(), 2);
    drop(b);
    assert_eq!(ids.listener_count(), 0);
}

#[test]
fn test_subscription_outliving_service_is_harmless() {
    let ids = service();
    let sub = ids.subscribe();
    drop(ids);
    assert_eq!(sub.drain(), vec![SessionEvent::SignedOut]);
    drop(sub);
}
