//! Tests for flash-queue drain semantics.

use std::thread;

use bootform_session::{FlashQueue, Session, SessionHandle, DEFAULT_QUEUE};

#[test]
fn drain_twice_yields_everything_then_nothing() {
    let handle = SessionHandle::new(Session::new());
    for msg in ["one", "two", "three"] {
        handle.flash(DEFAULT_QUEUE, msg).unwrap();
    }

    assert_eq!(
        handle.pop_flash(DEFAULT_QUEUE).unwrap(),
        vec!["one", "two", "three"]
    );
    assert!(handle.pop_flash(DEFAULT_QUEUE).unwrap().is_empty());
}

#[test]
fn peek_does_not_drain() {
    let handle = SessionHandle::new(Session::new());
    handle.flash("notice", "hello").unwrap();

    assert_eq!(handle.peek_flash("notice").unwrap(), vec!["hello"]);
    assert_eq!(handle.pop_flash("notice").unwrap(), vec!["hello"]);
}

#[test]
fn concurrent_pops_never_duplicate_messages() {
    let handle = SessionHandle::new(Session::new());
    for i in 0..100 {
        handle.flash(DEFAULT_QUEUE, &format!("msg-{i}")).unwrap();
    }

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || handle.pop_flash(DEFAULT_QUEUE).unwrap())
        })
        .collect();

    let mut seen: Vec<String> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), 100);
}
