//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use roster_core::{
  contact::{Category, ContactPatch, NewContact},
  query::ContactQuery,
  store::{ContactStore, UserStore},
  user::{NewUser, Session, UserId},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, username: &str) -> UserId {
  s.create_user(NewUser {
    username:      username.into(),
    email:         format!("{username}@example.com"),
    first_name:    String::new(),
    password_hash: "$argon2id$placeholder".into(),
  })
  .await
  .unwrap()
  .user_id
}

fn is_not_found(err: &Error) -> bool {
  matches!(err, Error::Core(roster_core::Error::ContactNotFound(_)))
}

fn jane() -> NewContact { NewContact::new("Jane Doe", "555-1234") }

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_applies_defaults() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let c = s.create(owner, jane()).await.unwrap();
  assert_eq!(c.owner_id, owner);
  assert_eq!(c.name, "Jane Doe");
  assert_eq!(c.phone, "555-1234");
  assert_eq!(c.category, Category::Other);
  assert!(!c.is_favorite);
  assert_eq!(c.email, None);
}

#[tokio::test]
async fn create_then_get_round_trips() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let input = NewContact {
    name:        "John Smith".into(),
    phone:       "+1 555 0100".into(),
    email:       Some("john@example.com".into()),
    address:     Some("1 Main St\nSpringfield".into()),
    category:    Category::Work,
    is_favorite: true,
  };
  let created = s.create(owner, input.clone()).await.unwrap();
  let fetched = s.get(owner, created.contact_id).await.unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.name, input.name);
  assert_eq!(fetched.email, input.email);
  assert_eq!(fetched.address, input.address);
  assert_eq!(fetched.category, Category::Work);
  assert!(fetched.is_favorite);
}

#[tokio::test]
async fn create_with_bad_email_persists_nothing() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let mut input = jane();
  input.email = Some("not-an-email".into());
  let err = s.create(owner, input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::Validation(ref e)) if e.has("email")
  ));

  assert_eq!(s.count(owner, &ContactQuery::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn create_rejects_missing_and_oversized_fields() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let err = s.create(owner, NewContact::new("", "555")).await.unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::Validation(ref e)) if e.has("name")));

  let err = s
    .create(owner, NewContact::new("x".repeat(101), "555"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::Validation(ref e)) if e.has("name")));

  let err = s
    .create(owner, NewContact::new("Jane", "5".repeat(21)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::Validation(ref e)) if e.has("phone")));
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let s = store().await;
  let owner = user(&s, "u1").await;
  let err = s.get(owner, Uuid::new_v4()).await.unwrap_err();
  assert!(is_not_found(&err));
}

// ─── Ownership isolation ─────────────────────────────────────────────────────

#[tokio::test]
async fn other_owner_cannot_touch_contact() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let c = s.create(alice, jane()).await.unwrap();
  let id = c.contact_id;

  assert!(is_not_found(&s.get(bob, id).await.unwrap_err()));
  assert!(is_not_found(
    &s.update(bob, id, ContactPatch { name: Some("Mallory".into()), ..Default::default() })
      .await
      .unwrap_err()
  ));
  assert!(is_not_found(&s.toggle_favorite(bob, id).await.unwrap_err()));
  assert!(is_not_found(&s.delete(bob, id).await.unwrap_err()));

  // Alice's record is untouched by all of the above.
  assert_eq!(s.get(alice, id).await.unwrap(), c);
}

#[tokio::test]
async fn list_only_returns_own_contacts() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.create(alice, NewContact::new("A1", "1")).await.unwrap();
  s.create(alice, NewContact::new("A2", "2")).await.unwrap();
  s.create(bob, NewContact::new("B1", "3")).await.unwrap();

  let mine = s.list(alice, &ContactQuery::default()).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|c| c.owner_id == alice));
  assert_eq!(s.count(bob, &ContactQuery::default()).await.unwrap(), 1);
}

// ─── List ordering and filters ───────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let first = s.create(owner, NewContact::new("First", "1")).await.unwrap();
  let second = s.create(owner, NewContact::new("Second", "2")).await.unwrap();
  let third = s.create(owner, NewContact::new("Third", "3")).await.unwrap();

  let ids: Vec<_> = s
    .list(owner, &ContactQuery::default())
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.contact_id)
    .collect();
  assert_eq!(ids, [third.contact_id, second.contact_id, first.contact_id]);
}

#[tokio::test]
async fn equal_timestamps_list_newest_insert_first() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let first = s.create(owner, NewContact::new("First", "1")).await.unwrap();
  let second = s.create(owner, NewContact::new("Second", "2")).await.unwrap();
  let third = s.create(owner, NewContact::new("Third", "3")).await.unwrap();

  s.conn
    .call(|conn| {
      Ok(conn.execute(
        "UPDATE contacts SET created_at = (SELECT MIN(created_at) FROM contacts)",
        [],
      )?)
    })
    .await
    .unwrap();

  let listed = s.list(owner, &ContactQuery::default()).await.unwrap();
  assert!(listed.iter().all(|c| c.created_at == listed[0].created_at));
  let ids: Vec<_> = listed.into_iter().map(|c| c.contact_id).collect();
  assert_eq!(ids, [third.contact_id, second.contact_id, first.contact_id]);

  let page2 = s.list(owner, &ContactQuery::default().page(2, 2)).await.unwrap();
  assert_eq!(page2.len(), 1);
  assert_eq!(page2[0].contact_id, first.contact_id);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let elise = s.create(owner, NewContact::new("Élise Dupont", "1")).await.unwrap();
  let bjorn = s.create(owner, NewContact::new("BJÖRN ÖSTBERG", "2")).await.unwrap();

  for term in ["élise", "ÉLISE", "dupont"] {
    let q = ContactQuery { search: Some(term.into()), ..Default::default() };
    let hits = s.list(owner, &q).await.unwrap();
    assert_eq!(hits.len(), 1, "{term}");
    assert_eq!(hits[0].contact_id, elise.contact_id);
  }

  let q = ContactQuery { search: Some("östberg".into()), ..Default::default() };
  assert_eq!(s.count(owner, &q).await.unwrap(), 1);
  assert_eq!(s.list(owner, &q).await.unwrap()[0].contact_id, bjorn.contact_id);
}

#[tokio::test]
async fn search_matches_name_email_or_phone_case_insensitively() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let by_name = s.create(owner, NewContact::new("John SMITH", "100")).await.unwrap();
  let mut e = NewContact::new("Jo", "200");
  e.email = Some("jo.smith@example.com".into());
  let by_email = s.create(owner, e).await.unwrap();
  let by_phone = s.create(owner, NewContact::new("Pat", "555-SMITH")).await.unwrap();
  let neither = s.create(owner, NewContact::new("Jane Doe", "300")).await.unwrap();

  let q = ContactQuery { search: Some("smith".into()), ..Default::default() };
  let ids: Vec<_> = s
    .list(owner, &q)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.contact_id)
    .collect();

  assert!(ids.contains(&by_name.contact_id));
  assert!(ids.contains(&by_email.contact_id));
  assert!(ids.contains(&by_phone.contact_id));
  assert!(!ids.contains(&neither.contact_id));
  assert_eq!(s.count(owner, &q).await.unwrap(), 3);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  s.create(owner, NewContact::new("100% Plumbing", "1")).await.unwrap();
  s.create(owner, NewContact::new("1000 Roofing", "2")).await.unwrap();

  let q = ContactQuery { search: Some("0%".into()), ..Default::default() };
  let hits = s.list(owner, &q).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "100% Plumbing");
}

#[tokio::test]
async fn category_and_favorite_filters_combine() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let mut work_fav = NewContact::new("Boss", "1");
  work_fav.category = Category::Work;
  work_fav.is_favorite = true;
  let work_fav = s.create(owner, work_fav).await.unwrap();

  let mut work = NewContact::new("Colleague", "2");
  work.category = Category::Work;
  s.create(owner, work).await.unwrap();

  let mut family_fav = NewContact::new("Mum", "3");
  family_fav.category = Category::Family;
  family_fav.is_favorite = true;
  s.create(owner, family_fav).await.unwrap();

  let work_only = ContactQuery { category: Some(Category::Work), ..Default::default() };
  assert_eq!(s.count(owner, &work_only).await.unwrap(), 2);

  assert_eq!(s.count(owner, &ContactQuery::favorites()).await.unwrap(), 2);

  let both = ContactQuery {
    category: Some(Category::Work),
    favorites_only: true,
    ..Default::default()
  };
  let hits = s.list(owner, &both).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].contact_id, work_fav.contact_id);
}

#[tokio::test]
async fn list_pages_through_results() {
  let s = store().await;
  let owner = user(&s, "u1").await;
  for i in 0..5 {
    s.create(owner, NewContact::new(format!("C{i}"), "1")).await.unwrap();
  }

  let page1 = s.list(owner, &ContactQuery::default().page(1, 2)).await.unwrap();
  let page3 = s.list(owner, &ContactQuery::default().page(3, 2)).await.unwrap();
  assert_eq!(page1.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["C4", "C3"]);
  assert_eq!(page3.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["C0"]);
  assert_eq!(s.count(owner, &ContactQuery::default().page(3, 2)).await.unwrap(), 5);
}

// ─── Scenario ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn jane_doe_lifecycle() {
  let s = store().await;
  let u1 = user(&s, "u1").await;

  let c = s.create(u1, jane()).await.unwrap();
  assert_eq!(c.category, Category::Other);
  assert!(!c.is_favorite);

  let other = ContactQuery::from_params(None, Some("Other"), None).unwrap();
  let work = ContactQuery::from_params(None, Some("Work"), None).unwrap();
  assert!(s.list(u1, &other).await.unwrap().iter().any(|x| x.contact_id == c.contact_id));
  assert!(s.list(u1, &work).await.unwrap().is_empty());

  s.delete(u1, c.contact_id).await.unwrap();
  assert!(is_not_found(&s.get(u1, c.contact_id).await.unwrap_err()));
  assert!(is_not_found(&s.delete(u1, c.contact_id).await.unwrap_err()));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_is_partial() {
  let s = store().await;
  let owner = user(&s, "u1").await;

  let mut input = jane();
  input.email = Some("jane@example.com".into());
  let c = s.create(owner, input).await.unwrap();

  let updated = s
    .update(
      owner,
      c.contact_id,
      ContactPatch { phone: Some("555-9999".into()), ..Default::default() },
    )
    .await
    .unwrap();

  assert_eq!(updated.phone, "555-9999");
  assert_eq!(updated.name, c.name);
  assert_eq!(updated.email, c.email);
  assert_eq!(updated.created_at, c.created_at);
  assert_eq!(s.get(owner, c.contact_id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_rejects_invalid_values_without_writing() {
  let s = store().await;
  let owner = user(&s, "u1").await;
  let c = s.create(owner, jane()).await.unwrap();

  let err = s
    .update(
      owner,
      c.contact_id,
      ContactPatch {
        name: Some("Janet".into()),
        email: Some("nope".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::Validation(_))));
  assert_eq!(s.get(owner, c.contact_id).await.unwrap().name, "Jane Doe");
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_favorite_twice_restores_state() {
  let s = store().await;
  let owner = user(&s, "u1").await;
  let c = s.create(owner, jane()).await.unwrap();

  assert!(s.toggle_favorite(owner, c.contact_id).await.unwrap());
  assert!(s.get(owner, c.contact_id).await.unwrap().is_favorite);
  assert!(!s.toggle_favorite(owner, c.contact_id).await.unwrap());
  assert!(!s.get(owner, c.contact_id).await.unwrap().is_favorite);
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_username_and_email_are_rejected() {
  let s = store().await;
  user(&s, "jane").await;

  let err = s
    .create_user(NewUser {
      username:      "jane".into(),
      email:         "other@example.com".into(),
      first_name:    String::new(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::UsernameTaken(_))));

  let err = s
    .create_user(NewUser {
      username:      "janet".into(),
      email:         "JANE@example.com".into(),
      first_name:    String::new(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::EmailTaken(_))));
}

#[tokio::test]
async fn find_user_by_username_is_exact() {
  let s = store().await;
  let id = user(&s, "jane").await;

  let found = s.find_user_by_username("jane").await.unwrap().unwrap();
  assert_eq!(found.user_id, id);
  assert_eq!(found.password_hash, "$argon2id$placeholder");
  assert!(s.find_user_by_username("Jane").await.unwrap().is_none());
}

#[tokio::test]
async fn sessions_resolve_until_expiry() {
  let s = store().await;
  let id = user(&s, "jane").await;
  let now = Utc::now();

  s.create_session(Session {
    token_hash: "live".into(),
    user_id:    id,
    created_at: now,
    expires_at: now + Duration::hours(1),
  })
  .await
  .unwrap();
  s.create_session(Session {
    token_hash: "stale".into(),
    user_id:    id,
    created_at: now - Duration::hours(2),
    expires_at: now - Duration::hours(1),
  })
  .await
  .unwrap();

  assert_eq!(s.session_user("live", now).await.unwrap().unwrap().user_id, id);
  assert!(s.session_user("stale", now).await.unwrap().is_none());
  assert!(s.session_user("unknown", now).await.unwrap().is_none());

  assert_eq!(s.purge_expired_sessions(now).await.unwrap(), 1);

  s.delete_session("live").await.unwrap();
  assert!(s.session_user("live", now).await.unwrap().is_none());
  // Deleting again is fine.
  s.delete_session("live").await.unwrap();
}
