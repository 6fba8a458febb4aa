//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! colours as their palette hex string. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use routine_core::{
  addiction::{Addiction, Color},
  check_in::CheckIn,
  identity::Identity,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawIdentity {
  pub user_id:    String,
  pub email:      String,
  pub created_at: String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `addictions` row.
pub struct RawAddiction {
  pub id:          String,
  pub user_id:     String,
  pub name:        String,
  pub description: Option<String>,
  pub color:       String,
  pub start_date:  String,
}

impl RawAddiction {
  pub const COLUMNS: &'static str =
    "id, user_id, name, description, color, start_date";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      color:       row.get(4)?,
      start_date:  row.get(5)?,
    })
  }

  pub fn into_addiction(self) -> Result<Addiction> {
    Ok(Addiction {
      id:          decode_uuid(&self.id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      description: self.description,
      color:       Color::parse(&self.color)?,
      start_date:  decode_dt(&self.start_date)?,
    })
  }
}

/// Raw values read directly from a `check_ins` row.
pub struct RawCheckIn {
  pub id:            String,
  pub addiction_id:  String,
  pub user_id:       String,
  pub check_in_date: String,
  pub is_clean:      bool,
  pub notes:         Option<String>,
}

impl RawCheckIn {
  pub const COLUMNS: &'static str =
    "id, addiction_id, user_id, check_in_date, is_clean, notes";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      addiction_id:  row.get(1)?,
      user_id:       row.get(2)?,
      check_in_date: row.get(3)?,
      is_clean:      row.get(4)?,
      notes:         row.get(5)?,
    })
  }

  pub fn into_check_in(self) -> Result<CheckIn> {
    Ok(CheckIn {
      id:            decode_uuid(&self.id)?,
      addiction_id:  decode_uuid(&self.addiction_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      check_in_date: decode_date(&self.check_in_date)?,
      is_clean:      self.is_clean,
      notes:         self.notes,
    })
  }
}
