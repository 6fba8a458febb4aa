//! Source of "today".
//!
//! Nothing in the streak engine reads a global clock; callers resolve the
//! calendar day through a [`Clock`] (or pass it explicitly) and hand it in.

use chrono::{NaiveDate, Utc};

pub trait Clock: Send + Sync {
  /// The current calendar day.
  fn today(&self) -> NaiveDate;
}

/// Wall clock, UTC calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Utc::now().date_naive() }
}

/// A clock pinned to a single day. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.0 }
}
