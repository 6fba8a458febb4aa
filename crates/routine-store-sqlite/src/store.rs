//! [`SqliteStore`] — the SQLite implementation of [`RecoveryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use routine_core::{
  addiction::{Addiction, NewAddiction},
  check_in::{CheckIn, NewCheckIn},
  identity::{Identity, normalize_email},
  store::{RecoveryStore, SortOrder},
};

use crate::{
  encode::{
    RawAddiction, RawCheckIn, RawIdentity, decode_dt, encode_date, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reset Routine store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecoveryStore impl ──────────────────────────────────────────────────────

impl RecoveryStore for SqliteStore {
  type Error = Error;

  // ── Users & sessions ──────────────────────────────────────────────────────

  async fn create_user(&self, email: &str, password_hash: &str) -> Result<Option<Identity>> {
    let identity = Identity {
      user_id:    Uuid::new_v4(),
      email:      normalize_email(email),
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(identity.user_id);
    let email_str = identity.email.clone();
    let hash_str  = password_hash.to_owned();
    let at_str    = encode_dt(identity.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_str, hash_str, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      tracing::debug!(email = %identity.email, "email already registered");
      return Ok(None);
    }
    tracing::debug!(user_id = %identity.user_id, "created user");
    Ok(Some(identity))
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<(Identity, String)>> {
    let email_str = normalize_email(email);

    let raw: Option<(RawIdentity, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, email, created_at, password_hash
             FROM users WHERE email = ?1",
            rusqlite::params![email_str],
            |row| {
              Ok((
                RawIdentity {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  created_at: row.get(2)?,
                },
                row.get(3)?,
              ))
            },
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(raw, hash)| Ok((raw.into_identity()?, hash)))
      .transpose()
  }

  async fn create_session(
    &self,
    user_id:    Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
  ) -> Result<()> {
    let hash_str    = token_hash.to_owned();
    let user_str    = encode_uuid(user_id);
    let created_str = encode_dt(Utc::now());
    let expires_str = encode_dt(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash_str, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_user(
    &self,
    token_hash: &str,
    now:        DateTime<Utc>,
  ) -> Result<Option<Identity>> {
    let hash_str = token_hash.to_owned();

    let raw: Option<(RawIdentity, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.user_id, u.email, u.created_at, s.expires_at
             FROM sessions s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.token_hash = ?1",
            rusqlite::params![hash_str],
            |row| {
              Ok((
                RawIdentity {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  created_at: row.get(2)?,
                },
                row.get(3)?,
              ))
            },
          )
          .optional()?)
      })
      .await?;

    let Some((raw, expires_at)) = raw else {
      return Ok(None);
    };
    if decode_dt(&expires_at)? <= now {
      return Ok(None);
    }
    raw.into_identity().map(Some)
  }

  async fn delete_session(&self, token_hash: &str) -> Result<bool> {
    let hash_str = token_hash.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![hash_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  // ── Addictions ────────────────────────────────────────────────────────────

  async fn add_addiction(&self, input: NewAddiction) -> Result<Addiction> {
    input.validate()?;

    let addiction = Addiction {
      id:          Uuid::new_v4(),
      user_id:     input.user_id,
      name:        input.name.trim().to_owned(),
      description: input.description,
      color:       input.color,
      start_date:  Utc::now(),
    };

    let id_str      = encode_uuid(addiction.id);
    let user_str    = encode_uuid(addiction.user_id);
    let name        = addiction.name.clone();
    let description = addiction.description.clone();
    let color_str   = addiction.color.hex();
    let start_str   = encode_dt(addiction.start_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO addictions (id, user_id, name, description, color, start_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_str, name, description, color_str, start_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(addiction)
  }

  async fn get_addiction(&self, id: Uuid) -> Result<Option<Addiction>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAddiction> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM addictions WHERE id = ?1", RawAddiction::COLUMNS),
            rusqlite::params![id_str],
            RawAddiction::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAddiction::into_addiction).transpose()
  }

  async fn list_addictions(&self, user_id: Uuid, order: SortOrder) -> Result<Vec<Addiction>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawAddiction> = self
      .conn
      .call(move |conn| {
        // rowid breaks ties between addictions created in the same instant.
        let sql = format!(
          "SELECT {} FROM addictions WHERE user_id = ?1
           ORDER BY start_date {dir}, rowid {dir}",
          RawAddiction::COLUMNS,
          dir = order.as_sql(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawAddiction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAddiction::into_addiction).collect()
  }

  // ── Check-ins ─────────────────────────────────────────────────────────────

  async fn upsert_check_in(&self, input: NewCheckIn) -> Result<CheckIn> {
    let addiction_id = input.addiction_id;
    let id_str       = encode_uuid(Uuid::new_v4());
    let add_str      = encode_uuid(input.addiction_id);
    let user_str     = encode_uuid(input.user_id);
    let date_str     = encode_date(input.check_in_date);
    let is_clean     = input.is_clean;
    let notes        = input.notes;

    let raw: Option<RawCheckIn> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM addictions WHERE id = ?1",
            rusqlite::params![add_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let row = conn.query_row(
          &format!(
            "INSERT INTO check_ins
               (id, addiction_id, user_id, check_in_date, is_clean, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (addiction_id, check_in_date) DO UPDATE SET
               is_clean = excluded.is_clean,
               notes    = excluded.notes
             RETURNING {}",
            RawCheckIn::COLUMNS,
          ),
          rusqlite::params![id_str, add_str, user_str, date_str, is_clean, notes],
          RawCheckIn::from_row,
        )?;
        Ok(Some(row))
      })
      .await?;

    let check_in = raw
      .ok_or(Error::AddictionNotFound(addiction_id))?
      .into_check_in()?;
    tracing::debug!(
      addiction_id = %check_in.addiction_id,
      date = %check_in.check_in_date,
      is_clean = check_in.is_clean,
      "upserted check-in"
    );
    Ok(check_in)
  }

  async fn list_check_ins(
    &self,
    user_id:      Uuid,
    addiction_id: Option<Uuid>,
    order:        SortOrder,
  ) -> Result<Vec<CheckIn>> {
    let user_str = encode_uuid(user_id);
    let add_str  = addiction_id.map(encode_uuid);

    let raws: Vec<RawCheckIn> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM check_ins
           WHERE user_id = ?1 AND (?2 IS NULL OR addiction_id = ?2)
           ORDER BY check_in_date {dir}",
          RawCheckIn::COLUMNS,
          dir = order.as_sql(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, add_str], RawCheckIn::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckIn::into_check_in).collect()
  }
}
