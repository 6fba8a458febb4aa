//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Days, Duration, NaiveDate, Utc};
use routine_core::{
  addiction::{Addiction, Color, NewAddiction},
  check_in::NewCheckIn,
  identity::Identity,
  store::{RecoveryStore, SortOrder},
  streak::{current_streak, longest_streak},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> Identity {
  s.create_user(email, "$argon2id$placeholder")
    .await
    .unwrap()
    .expect("email is free")
}

async fn addiction(s: &SqliteStore, owner: &Identity, name: &str) -> Addiction {
  s.add_addiction(
    NewAddiction::new(owner.user_id, name, None, Color::default()).unwrap(),
  )
  .await
  .unwrap()
}

fn day(s: &str) -> NaiveDate { s.parse().unwrap() }

// ─── Users & sessions ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let created = s
    .create_user("  Alice@Example.com", "hash-a")
    .await
    .unwrap()
    .expect("email is free");
  assert_eq!(created.email, "alice@example.com");

  let (found, hash) = s
    .find_user_by_email("ALICE@example.com ")
    .await
    .unwrap()
    .expect("user present");
  assert_eq!(found, created);
  assert_eq!(hash, "hash-a");
}

#[tokio::test]
async fn find_missing_user_returns_none() {
  let s = store().await;
  assert!(s.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "bob@example.com").await;
  assert!(s.create_user("BOB@example.com", "other").await.unwrap().is_none());

  // The original account is untouched.
  let (_, hash) = s.find_user_by_email("bob@example.com").await.unwrap().unwrap();
  assert_eq!(hash, "$argon2id$placeholder");
}

#[tokio::test]
async fn session_lifecycle() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let now = Utc::now();

  s.create_session(alice.user_id, "digest-1", now + Duration::hours(1))
    .await
    .unwrap();

  let resolved = s.session_user("digest-1", now).await.unwrap();
  assert_eq!(resolved, Some(alice.clone()));
  assert!(s.session_user("digest-2", now).await.unwrap().is_none());

  assert!(s.delete_session("digest-1").await.unwrap());
  assert!(!s.delete_session("digest-1").await.unwrap());
  assert!(s.session_user("digest-1", now).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_does_not_resolve() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let now = Utc::now();

  s.create_session(alice.user_id, "old", now - Duration::seconds(1))
    .await
    .unwrap();
  assert!(s.session_user("old", now).await.unwrap().is_none());
}

// ─── Addictions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_addiction() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let input = NewAddiction::new(
    alice.user_id,
    " Smoking ",
    Some("for my lungs"),
    Color::Blue,
  )
  .unwrap();
  let created = s.add_addiction(input).await.unwrap();
  assert_eq!(created.name, "Smoking");
  assert_eq!(created.user_id, alice.user_id);

  let fetched = s.get_addiction(created.id).await.unwrap().expect("present");
  assert_eq!(fetched, created);
  assert_eq!(fetched.color.hex(), "#3b82f6");
  assert_eq!(fetched.description.as_deref(), Some("for my lungs"));
}

#[tokio::test]
async fn get_addiction_missing_returns_none() {
  let s = store().await;
  assert!(s.get_addiction(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_addiction_rechecks_name() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let input = NewAddiction {
    user_id:     alice.user_id,
    name:        "   ".into(),
    description: None,
    color:       Color::Red,
  };
  let err = s.add_addiction(input).await.unwrap_err();
  assert!(matches!(err, Error::Core(routine_core::Error::EmptyName)));
}

#[tokio::test]
async fn list_addictions_is_scoped_and_ordered() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  let first = addiction(&s, &alice, "Smoking").await;
  let second = addiction(&s, &alice, "Drinking").await;
  addiction(&s, &bob, "Gambling").await;

  let desc = s.list_addictions(alice.user_id, SortOrder::Desc).await.unwrap();
  assert_eq!(
    desc.iter().map(|a| a.id).collect::<Vec<_>>(),
    vec![second.id, first.id]
  );

  let asc = s.list_addictions(alice.user_id, SortOrder::Asc).await.unwrap();
  assert_eq!(
    asc.iter().map(|a| a.id).collect::<Vec<_>>(),
    vec![first.id, second.id]
  );
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_same_key_keeps_one_row_with_latest_value() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let smoking = addiction(&s, &alice, "Smoking").await;
  let today = day("2024-05-01");

  let first = s
    .upsert_check_in(NewCheckIn::new(alice.user_id, smoking.id, today, true))
    .await
    .unwrap();
  assert!(first.is_clean);

  let mut second_input = NewCheckIn::new(alice.user_id, smoking.id, today, false);
  second_input.notes = Some("rough day".into());
  let second = s.upsert_check_in(second_input).await.unwrap();
  assert_eq!(second.id, first.id, "overwrite keeps the original row id");
  assert!(!second.is_clean);

  let all = s
    .list_check_ins(alice.user_id, Some(smoking.id), SortOrder::Desc)
    .await
    .unwrap();
  assert_eq!(all.len(), 1);
  assert!(!all[0].is_clean);
  assert_eq!(all[0].notes.as_deref(), Some("rough day"));
}

#[tokio::test]
async fn upsert_for_unknown_addiction_fails() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let missing = Uuid::new_v4();

  let err = s
    .upsert_check_in(NewCheckIn::new(alice.user_id, missing, day("2024-05-01"), true))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AddictionNotFound(id) if id == missing));
}

#[tokio::test]
async fn list_check_ins_filters_and_orders() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let smoking = addiction(&s, &alice, "Smoking").await;
  let drinking = addiction(&s, &alice, "Drinking").await;
  let gambling = addiction(&s, &bob, "Gambling").await;

  for d in ["2024-05-02", "2024-05-01", "2024-05-03"] {
    s.upsert_check_in(NewCheckIn::new(alice.user_id, smoking.id, day(d), true))
      .await
      .unwrap();
  }
  s.upsert_check_in(NewCheckIn::new(alice.user_id, drinking.id, day("2024-05-01"), false))
    .await
    .unwrap();
  s.upsert_check_in(NewCheckIn::new(bob.user_id, gambling.id, day("2024-05-01"), true))
    .await
    .unwrap();

  let all = s.list_check_ins(alice.user_id, None, SortOrder::Desc).await.unwrap();
  assert_eq!(all.len(), 4);
  assert!(all.iter().all(|c| c.user_id == alice.user_id));
  assert!(all.windows(2).all(|w| w[0].check_in_date >= w[1].check_in_date));

  let smoking_only = s
    .list_check_ins(alice.user_id, Some(smoking.id), SortOrder::Asc)
    .await
    .unwrap();
  assert_eq!(
    smoking_only.iter().map(|c| c.check_in_date).collect::<Vec<_>>(),
    vec![day("2024-05-01"), day("2024-05-02"), day("2024-05-03")]
  );
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn four_clean_days_then_a_fifth() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let smoking = s
    .add_addiction(
      NewAddiction::new(alice.user_id, "Smoking", None, Color::parse("#3b82f6").unwrap())
        .unwrap(),
    )
    .await
    .unwrap();

  let today = day("2024-05-10");
  let yesterday = today - Days::new(1);
  for back in 1..=4 {
    s.upsert_check_in(NewCheckIn::new(
      alice.user_id,
      smoking.id,
      today - Days::new(back),
      true,
    ))
    .await
    .unwrap();
  }

  let records = s
    .list_check_ins(alice.user_id, None, SortOrder::Desc)
    .await
    .unwrap();
  assert_eq!(current_streak(&records, smoking.id, yesterday), 4);
  assert_eq!(longest_streak(&records, smoking.id), 4);
  // Before today's check-in the newest record is a day old.
  assert_eq!(current_streak(&records, smoking.id, today), 0);

  s.upsert_check_in(NewCheckIn::new(alice.user_id, smoking.id, today, true))
    .await
    .unwrap();
  let records = s
    .list_check_ins(alice.user_id, None, SortOrder::Desc)
    .await
    .unwrap();
  assert_eq!(current_streak(&records, smoking.id, today), 5);
  assert_eq!(longest_streak(&records, smoking.id), 5);
}
