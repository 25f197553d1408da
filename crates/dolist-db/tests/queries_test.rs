//! Store-level behaviour that the domain layer relies on.

use dolist_db::{Database, lists, namespaces, rights, tasks, teams, users};
use dolist_types::models::Task;
use dolist_types::pagination::Page;
use dolist_types::rights::{Right, ShareTarget, Subject};
use rusqlite::Connection;

fn user(conn: &Connection, name: &str) -> i64 {
    users::insert(conn, name, &format!("{name}@example.com"), "hash").unwrap()
}

fn task(list_id: i64, created_by_id: i64, text: &str) -> Task {
    let now = chrono::Utc::now();
    Task {
        id: 0,
        text: text.into(),
        description: String::new(),
        done: false,
        due_date: None,
        reminder: None,
        list_id,
        created_by_id,
        created: now,
        updated: now,
    }
}

#[test]
fn test_upsert_keeps_one_row_per_pair() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ns = namespaces::insert(&conn, "Home", "", alice).unwrap();
    let target = ShareTarget::Namespace(ns);

    let a = rights::upsert(&conn, Subject::User(bob), target, Right::Read).unwrap();
    let b = rights::upsert(&conn, Subject::User(bob), target, Right::Write).unwrap();
    assert_eq!(a, b);

    let grants = rights::for_target(&conn, target).unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].right, Right::Write);
    assert_eq!(rights::user_grant(&conn, bob, target).unwrap(), Some(Right::Write));
}

#[test]
fn test_best_team_grant_picks_highest() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ns = namespaces::insert(&conn, "Home", "", alice).unwrap();
    let target = ShareTarget::Namespace(ns);

    let low = teams::insert(&conn, "Low", "", alice).unwrap();
    let high = teams::insert(&conn, "High", "", alice).unwrap();
    teams::insert_member(&conn, low, bob, false).unwrap();
    teams::insert_member(&conn, high, bob, false).unwrap();
    rights::upsert(&conn, Subject::Team(low), target, Right::Read).unwrap();
    rights::upsert(&conn, Subject::Team(high), target, Right::Admin).unwrap();

    assert_eq!(rights::best_team_grant(&conn, bob, target).unwrap(), Some(Right::Admin));
    assert_eq!(rights::best_team_grant(&conn, alice, target).unwrap(), None);
}

#[test]
fn test_namespace_delete_cascades() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");

    let ns = namespaces::insert(&conn, "Home", "", alice).unwrap();
    let keep = namespaces::insert(&conn, "Work", "", alice).unwrap();
    let list = lists::insert(&conn, "Chores", "", ns, alice).unwrap();
    let other = lists::insert(&conn, "Reports", "", keep, alice).unwrap();
    let t = tasks::insert(&conn, &task(list, alice, "Vacuum")).unwrap();
    let kept_task = tasks::insert(&conn, &task(other, alice, "Write report")).unwrap();
    rights::upsert(&conn, Subject::User(bob), ShareTarget::List(list), Right::Read).unwrap();
    rights::upsert(&conn, Subject::User(bob), ShareTarget::Namespace(ns), Right::Read).unwrap();
    rights::upsert(&conn, Subject::User(bob), ShareTarget::List(other), Right::Read).unwrap();

    assert_eq!(namespaces::delete(&conn, ns).unwrap(), 1);

    assert!(namespaces::get(&conn, ns).unwrap().is_none());
    assert!(lists::get(&conn, list).unwrap().is_none());
    assert!(tasks::get(&conn, t).unwrap().is_none());
    assert!(tasks::get(&conn, kept_task).unwrap().is_some());
    assert_eq!(rights::count_for_subject(&conn, Subject::User(bob)).unwrap(), 1);
}

#[test]
fn test_accessible_namespaces_include_team_grants() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");

    let shared = namespaces::insert(&conn, "Shared", "", alice).unwrap();
    namespaces::insert(&conn, "Private", "", alice).unwrap();
    let team = teams::insert(&conn, "Team", "", alice).unwrap();
    teams::insert_member(&conn, team, bob, false).unwrap();
    rights::upsert(&conn, Subject::Team(team), ShareTarget::Namespace(shared), Right::Read).unwrap();

    let (items, total) = namespaces::list_accessible(&conn, bob, "", Page::default()).unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, shared);
}

#[test]
fn test_reset_token_is_single_use() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");

    users::insert_reset_token(&conn, alice, "abc123").unwrap();
    assert_eq!(users::take_reset_token(&conn, "abc123").unwrap(), Some(alice));
    assert_eq!(users::take_reset_token(&conn, "abc123").unwrap(), None);
}

#[test]
fn test_team_delete_removes_memberships() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.lock().unwrap();
    let alice = user(&conn, "alice");

    let team = teams::insert(&conn, "Team", "", alice).unwrap();
    teams::insert_member(&conn, team, alice, true).unwrap();
    assert_eq!(teams::member_count(&conn, team).unwrap(), 1);

    teams::delete(&conn, team).unwrap();
    assert!(!teams::exists(&conn, team).unwrap());
    assert_eq!(teams::membership(&conn, team, alice).unwrap(), None);
}
