//! Streak engine.
//!
//! Pure functions over an in-memory list of check-ins. The list may hold
//! records for several addictions; each function filters to the one it is
//! asked about.
//!
//! The two streak measures are deliberately different algorithms:
//!
//! - [`current_streak`] is gap-sensitive. Walking back from the newest
//!   record, a record counts only while its distance from `today` in days is
//!   at most the number of records counted so far.
//! - [`longest_streak`] ignores dates entirely beyond their order and
//!   measures the longest run of clean flags.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{addiction::Addiction, check_in::CheckIn};

fn for_addiction(check_ins: &[CheckIn], addiction_id: Uuid) -> Vec<&CheckIn> {
  check_ins
    .iter()
    .filter(|c| c.addiction_id == addiction_id)
    .collect()
}

/// Consecutive clean days ending at `today`.
///
/// A relapse stops the count, and so does a record whose gap from `today`
/// exceeds the count so far. An addiction with no records has a streak of 0.
pub fn current_streak(
  check_ins: &[CheckIn],
  addiction_id: Uuid,
  today: NaiveDate,
) -> u32 {
  let mut records = for_addiction(check_ins, addiction_id);
  records.sort_by_key(|c| Reverse(c.check_in_date));

  let mut streak: u32 = 0;
  for record in records {
    let gap = (today - record.check_in_date).num_days();
    if gap <= i64::from(streak) && record.is_clean {
      streak += 1;
    } else {
      break;
    }
  }
  streak
}

/// The longest run of clean records, in date order, ignoring gaps.
pub fn longest_streak(check_ins: &[CheckIn], addiction_id: Uuid) -> u32 {
  let mut records = for_addiction(check_ins, addiction_id);
  records.sort_by_key(|c| c.check_in_date);

  let mut longest: u32 = 0;
  let mut current: u32 = 0;
  for record in records {
    if record.is_clean {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  longest
}

/// The check-in recorded for `addiction_id` on `today`, if any.
pub fn today_check_in(
  check_ins: &[CheckIn],
  addiction_id: Uuid,
  today: NaiveDate,
) -> Option<&CheckIn> {
  check_ins
    .iter()
    .find(|c| c.addiction_id == addiction_id && c.check_in_date == today)
}

// ─── Dashboard summary ───────────────────────────────────────────────────────

/// One dashboard card: an addiction with its computed statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddictionProgress {
  pub addiction:      Addiction,
  pub current_streak: u32,
  pub longest_streak: u32,
  /// Today's check-in, if one has been recorded.
  pub today:          Option<CheckIn>,
}

/// Compute progress for every addiction, preserving their order.
pub fn summarize(
  addictions: &[Addiction],
  check_ins: &[CheckIn],
  today: NaiveDate,
) -> Vec<AddictionProgress> {
  addictions
    .iter()
    .map(|a| AddictionProgress {
      addiction:      a.clone(),
      current_streak: current_streak(check_ins, a.id, today),
      longest_streak: longest_streak(check_ins, a.id),
      today:          today_check_in(check_ins, a.id, today).cloned(),
    })
    .collect()
}

/// `"1 day"` / `"N days"`.
pub fn days_label(n: u32) -> String {
  if n == 1 { "1 day".to_owned() } else { format!("{n} days") }
}
