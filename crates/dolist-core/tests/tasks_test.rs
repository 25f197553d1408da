mod common;

use chrono::{TimeZone, Utc};

use common::{Fixture, list, namespace, task, user};
use dolist_core::{Error, lists, sharing, tasks};
use dolist_types::api::{NewTask, TaskPatch};
use dolist_types::pagination::Page;
use dolist_types::rights::{Right, ShareTarget, Subject};

#[test]
fn test_done_false_reopens_task() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Chores");
    let t = task(&ctx, l.id, "Vacuum");
    assert!(!t.done);

    let done = tasks::update(&ctx, t.id, TaskPatch { done: Some(true), ..Default::default() }).unwrap();
    assert!(done.done);

    let reopened = tasks::update(&ctx, t.id, TaskPatch { done: Some(false), ..Default::default() }).unwrap();
    assert!(!reopened.done);
    assert!(!tasks::read_one(&ctx, t.id).unwrap().done);
}

#[test]
fn test_absent_fields_are_kept_and_null_clears() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Chores");

    let due = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    let t = tasks::create(
        &ctx,
        l.id,
        NewTask {
            text: "Vacuum".into(),
            description: "Living room".into(),
            due_date: Some(due),
            reminder: None,
        },
    )
    .unwrap();
    assert_eq!(t.due_date, Some(due));

    let patch: TaskPatch = serde_json::from_str(r#"{"text": "Vacuum upstairs"}"#).unwrap();
    let t = tasks::update(&ctx, t.id, patch).unwrap();
    assert_eq!(t.text, "Vacuum upstairs");
    assert_eq!(t.description, "Living room");
    assert_eq!(t.due_date, Some(due));

    let patch: TaskPatch = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
    let t = tasks::update(&ctx, t.id, patch).unwrap();
    assert_eq!(t.due_date, None);
}

#[test]
fn test_empty_text_is_rejected() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Chores");
    let t = task(&ctx, l.id, "Vacuum");

    let new = NewTask {
        text: String::new(),
        description: String::new(),
        due_date: None,
        reminder: None,
    };
    assert!(matches!(tasks::create(&ctx, l.id, new).unwrap_err(), Error::Validation { field: "text", .. }));

    let patch = TaskPatch { text: Some("  ".into()), ..Default::default() };
    assert!(matches!(tasks::update(&ctx, t.id, patch).unwrap_err(), Error::Validation { .. }));
    assert_eq!(tasks::read_one(&ctx, t.id).unwrap().text, "Vacuum");
}

#[test]
fn test_completion_by_someone_else_notifies_creator() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let as_alice = fx.ctx(&conn, &alice);
    let ns = namespace(&as_alice, "Home");
    let l = list(&as_alice, ns.id, "Chores");
    let t = task(&as_alice, l.id, "Vacuum");

    sharing::grant(&conn, Subject::User(bob.id), ShareTarget::List(l.id), Right::Write).unwrap();

    let as_bob = fx.ctx(&conn, &bob);
    tasks::update(&as_bob, t.id, TaskPatch { done: Some(true), ..Default::default() }).unwrap();

    // Task completion is a feed entry only.
    assert!(fx.mail.sent().is_empty());

    let feed = dolist_core::notifications::read_all(&conn, &alice, Page::default()).unwrap();
    assert_eq!(feed.total, 1);
    assert_eq!(feed.items[0].name, "task.done");
    assert_eq!(feed.items[0].subject_id, Some(t.id));
    assert_eq!(feed.items[0].notification["data"]["doer"], "bob");

    // Already done: no second entry.
    tasks::update(&as_bob, t.id, TaskPatch { done: Some(true), ..Default::default() }).unwrap();
    assert_eq!(dolist_core::notifications::read_all(&conn, &alice, Page::default()).unwrap().total, 1);
}

#[test]
fn test_completing_own_task_is_silent() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Chores");
    let t = task(&ctx, l.id, "Vacuum");

    tasks::update(&ctx, t.id, TaskPatch { done: Some(true), ..Default::default() }).unwrap();

    let feed = dolist_core::notifications::read_all(&conn, &alice, Page::default()).unwrap();
    assert_eq!(feed.total, 0);
}

#[test]
fn test_read_only_user_cannot_change_tasks() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let as_alice = fx.ctx(&conn, &alice);
    let ns = namespace(&as_alice, "Home");
    let l = list(&as_alice, ns.id, "Chores");
    let t = task(&as_alice, l.id, "Vacuum");

    sharing::grant(&conn, Subject::User(bob.id), ShareTarget::Namespace(ns.id), Right::Read).unwrap();
    let as_bob = fx.ctx(&conn, &bob);

    assert!(tasks::read_one(&as_bob, t.id).is_ok());
    let patch = TaskPatch { done: Some(true), ..Default::default() };
    assert!(tasks::update(&as_bob, t.id, patch).unwrap_err().is_forbidden());
    assert!(tasks::delete(&as_bob, t.id).unwrap_err().is_forbidden());

    let new = NewTask {
        text: "Dust".into(),
        description: String::new(),
        due_date: None,
        reminder: None,
    };
    assert!(tasks::create(&as_bob, l.id, new).unwrap_err().is_forbidden());
}

#[test]
fn test_read_all_searches_within_list() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let chores = list(&ctx, ns.id, "Chores");
    let shopping = list(&ctx, ns.id, "Shopping");

    task(&ctx, chores.id, "Clean kitchen");
    task(&ctx, chores.id, "Clean bathroom");
    task(&ctx, chores.id, "Water plants");
    task(&ctx, shopping.id, "Cleaning spray");

    let clean = tasks::read_all(&ctx, chores.id, "clean", Page::default()).unwrap();
    assert_eq!(clean.total, 2);
    assert_eq!(clean.items[0].text, "Clean kitchen");

    let all = tasks::read_all(&ctx, chores.id, "", Page::new(1, 2)).unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items.len(), 2);
}

#[test]
fn test_deleting_list_removes_tasks() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Chores");
    let t = task(&ctx, l.id, "Vacuum");

    lists::delete(&ctx, l.id).unwrap();

    assert!(tasks::read_one(&ctx, t.id).unwrap_err().is_not_found());
    assert!(lists::read_one(&ctx, l.id).unwrap_err().is_not_found());
}
