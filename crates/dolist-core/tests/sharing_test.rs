mod common;

use common::{Fixture, list, namespace, user};
use dolist_core::{Error, sharing, teams};
use dolist_types::api::NewTeam;
use dolist_types::pagination::Page;
use dolist_types::rights::{Right, ShareTarget, Subject};

#[test]
fn test_repeated_grant_replaces_right() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ns = namespace(&fx.ctx(&conn, &alice), "Home");
    let target = ShareTarget::Namespace(ns.id);

    let first = sharing::grant(&conn, Subject::User(bob.id), target, Right::Read).unwrap();
    let second = sharing::grant(&conn, Subject::User(bob.id), target, Right::Admin).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.right, Right::Admin);

    let grants = sharing::list_grants(&conn, target).unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].right, Right::Admin);
}

#[test]
fn test_grant_requires_existing_subject_and_target() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ns = namespace(&fx.ctx(&conn, &alice), "Home");

    let err = sharing::grant(&conn, Subject::User(77), ShareTarget::Namespace(ns.id), Right::Read).unwrap_err();
    assert!(err.is_not_found());

    let err = sharing::grant(&conn, Subject::Team(77), ShareTarget::Namespace(ns.id), Right::Read).unwrap_err();
    assert!(err.is_not_found());

    let err = sharing::grant(&conn, Subject::User(alice.id), ShareTarget::List(77), Right::Read).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_revoke_unknown_grant_is_not_found() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ns = namespace(&fx.ctx(&conn, &alice), "Home");

    let err = sharing::revoke(&conn, Subject::User(bob.id), ShareTarget::Namespace(ns.id)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_share_needs_admin() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let carol = user(&conn, "carol");
    let ns = namespace(&fx.ctx(&conn, &alice), "Home");
    let target = ShareTarget::Namespace(ns.id);

    sharing::grant(&conn, Subject::User(bob.id), target, Right::Write).unwrap();

    let as_bob = fx.ctx(&conn, &bob);
    let err = sharing::share(&as_bob, Subject::User(carol.id), target, Right::Read).unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
    let err = sharing::unshare(&as_bob, Subject::User(bob.id), target).unwrap_err();
    assert!(err.is_forbidden());

    sharing::grant(&conn, Subject::User(bob.id), target, Right::Admin).unwrap();
    sharing::share(&as_bob, Subject::User(carol.id), target, Right::Read).unwrap();
    assert_eq!(sharing::list_grants(&conn, target).unwrap().len(), 2);
}

#[test]
fn test_share_notifies_user() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Groceries");

    sharing::share(&ctx, Subject::User(bob.id), ShareTarget::List(l.id), Right::Write).unwrap();

    let sent = fx.mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bob@example.com");
    assert_eq!(sent[0].subject, "alice shared the list Groceries with you");
    assert!(sent[0].body.contains("write access"));

    let feed = dolist_core::notifications::read_all(&conn, &bob, Page::default()).unwrap();
    assert_eq!(feed.total, 1);
    assert_eq!(feed.items[0].name, "list.shared");
    assert_eq!(feed.items[0].subject_id, Some(l.id));
}

#[test]
fn test_share_with_team_sends_nothing() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let team = teams::create(&ctx, NewTeam { name: "Household".into(), description: String::new() }).unwrap();

    sharing::share(&ctx, Subject::Team(team.id), ShareTarget::Namespace(ns.id), Right::Read).unwrap();
    assert!(fx.mail.sent().is_empty());
}

#[test]
fn test_users_with_access_search_and_pages() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let target = ShareTarget::Namespace(ns.id);

    for (name, right) in [("bob", Right::Read), ("carol", Right::Write), ("bobby", Right::Admin)] {
        let u = user(&conn, name);
        sharing::grant(&conn, Subject::User(u.id), target, right).unwrap();
    }

    let all = sharing::read_users(&ctx, target, "", Page::default()).unwrap();
    let names: Vec<_> = all.iter().map(|u| u.user.username.as_str()).collect();
    assert_eq!(names, ["bob", "carol", "bobby"]);

    let bobs = sharing::read_users(&ctx, target, "bob", Page::default()).unwrap();
    assert_eq!(bobs.len(), 2);

    let page_two = sharing::read_users(&ctx, target, "bob", Page::new(2, 1)).unwrap();
    assert_eq!(page_two.len(), 1);
    assert_eq!(page_two[0].user.username, "bobby");
    assert_eq!(page_two[0].right, Right::Admin);
}

#[test]
fn test_teams_with_access() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let target = ShareTarget::Namespace(ns.id);

    let family = teams::create(&ctx, NewTeam { name: "Family".into(), description: String::new() }).unwrap();
    let friends = teams::create(&ctx, NewTeam { name: "Friends".into(), description: String::new() }).unwrap();
    sharing::grant(&conn, Subject::Team(family.id), target, Right::Write).unwrap();
    sharing::grant(&conn, Subject::Team(friends.id), target, Right::Read).unwrap();

    let teams = sharing::read_teams(&ctx, target, "fam", Page::default()).unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].team.id, family.id);
    assert_eq!(teams[0].right, Right::Write);
    assert_eq!(teams[0].team.members.len(), 1);
}

#[test]
fn test_read_users_needs_read() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ns = namespace(&fx.ctx(&conn, &alice), "Home");

    let err = sharing::read_users(&fx.ctx(&conn, &bob), ShareTarget::Namespace(ns.id), "", Page::default())
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[test]
fn test_grants_for_subject_paginate() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let ctx = fx.ctx(&conn, &alice);

    let ns = namespace(&ctx, "Home");
    let lists: Vec<_> = ["A", "B", "C"].iter().map(|t| list(&ctx, ns.id, t)).collect();
    for l in &lists {
        sharing::grant(&conn, Subject::User(bob.id), ShareTarget::List(l.id), Right::Read).unwrap();
    }

    let page = sharing::list_grants_for_subject(&conn, Subject::User(bob.id), Page::new(2, 2)).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].target, ShareTarget::List(lists[2].id));
}

#[test]
fn test_search_wildcards_match_literally() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let target = ShareTarget::Namespace(ns.id);

    for name in ["bob", "carol", "dave_x"] {
        let u = user(&conn, name);
        sharing::grant(&conn, Subject::User(u.id), target, Right::Read).unwrap();
    }

    let underscore = sharing::read_users(&ctx, target, "_", Page::default()).unwrap();
    let names: Vec<_> = underscore.iter().map(|u| u.user.username.as_str()).collect();
    assert_eq!(names, ["dave_x"]);

    let percent = sharing::read_users(&ctx, target, "%", Page::default()).unwrap();
    assert!(percent.is_empty());
}

#[test]
fn test_share_keeps_grant_when_notification_fails() {
    let fx = Fixture::new();
    let conn = fx.db.lock().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let carol = user(&conn, "carol");
    let ctx = fx.ctx(&conn, &alice);
    let ns = namespace(&ctx, "Home");
    let l = list(&ctx, ns.id, "Groceries");

    fx.mail.set_failing(true);
    let grant = sharing::share(&ctx, Subject::User(bob.id), ShareTarget::Namespace(ns.id), Right::Read).unwrap();
    assert_eq!(grant.right, Right::Read);
    assert_eq!(sharing::list_grants(&conn, ShareTarget::Namespace(ns.id)).unwrap().len(), 1);

    fx.mail.set_failing(false);
    conn.execute("UPDATE users SET email = '' WHERE id = ?1", [carol.id]).unwrap();
    sharing::share(&ctx, Subject::User(carol.id), ShareTarget::List(l.id), Right::Write).unwrap();
    assert_eq!(sharing::list_grants(&conn, ShareTarget::List(l.id)).unwrap().len(), 1);

    assert!(fx.mail.sent().is_empty());
    for u in [&bob, &carol] {
        let feed = dolist_core::notifications::read_all(&conn, u, Page::default()).unwrap();
        assert_eq!(feed.total, 0);
    }
}
