//! Daily check-ins.
//!
//! A check-in is one user's self-report for one addiction on one calendar
//! day. The pair `(addiction_id, check_in_date)` is unique; writing the same
//! pair again replaces the outcome (last write wins).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
  pub id:            Uuid,
  pub addiction_id:  Uuid,
  /// Owning identity, denormalised from the addiction.
  pub user_id:       Uuid,
  pub check_in_date: NaiveDate,
  pub is_clean:      bool,
  pub notes:         Option<String>,
}

/// Input to [`crate::store::RecoveryStore::upsert_check_in`].
#[derive(Debug, Clone)]
pub struct NewCheckIn {
  pub addiction_id:  Uuid,
  pub user_id:       Uuid,
  pub check_in_date: NaiveDate,
  pub is_clean:      bool,
  pub notes:         Option<String>,
}

impl NewCheckIn {
  /// Convenience constructor with no notes.
  pub fn new(
    user_id: Uuid,
    addiction_id: Uuid,
    check_in_date: NaiveDate,
    is_clean: bool,
  ) -> Self {
    Self { addiction_id, user_id, check_in_date, is_clean, notes: None }
  }
}
