//! Addictions — the recovery targets a user tracks.
//!
//! An addiction is created once and never edited. Its check-ins are stored
//! separately (see [`crate::check_in`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Colour palette ──────────────────────────────────────────────────────────

/// The fixed palette an addiction's accent colour is chosen from.
///
/// Serialised (JSON and database) as the lowercase hex string.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Color {
  #[strum(serialize = "#ef4444")]
  Red,
  #[strum(serialize = "#f97316")]
  Orange,
  #[strum(serialize = "#eab308")]
  Yellow,
  #[default]
  #[strum(serialize = "#22c55e")]
  Green,
  #[strum(serialize = "#3b82f6")]
  Blue,
  #[strum(serialize = "#8b5cf6")]
  Purple,
  #[strum(serialize = "#ec4899")]
  Pink,
  #[strum(serialize = "#06b6d4")]
  Cyan,
}

impl Color {
  /// All palette entries in display order.
  pub fn palette() -> impl Iterator<Item = Color> { Color::iter() }

  /// The `#rrggbb` form stored in the database.
  pub fn hex(self) -> &'static str { self.into() }

  /// Parse a hex string; case and surrounding whitespace are ignored.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .to_ascii_lowercase()
      .parse()
      .map_err(|_| Error::UnknownColor(s.to_owned()))
  }

  /// Human-readable name, for pickers.
  pub fn name(self) -> &'static str {
    match self {
      Self::Red => "red",
      Self::Orange => "orange",
      Self::Yellow => "yellow",
      Self::Green => "green",
      Self::Blue => "blue",
      Self::Purple => "purple",
      Self::Pink => "pink",
      Self::Cyan => "cyan",
    }
  }

  pub fn rgb(self) -> (u8, u8, u8) {
    match self {
      Self::Red => (0xef, 0x44, 0x44),
      Self::Orange => (0xf9, 0x73, 0x16),
      Self::Yellow => (0xea, 0xb3, 0x08),
      Self::Green => (0x22, 0xc5, 0x5e),
      Self::Blue => (0x3b, 0x82, 0xf6),
      Self::Purple => (0x8b, 0x5c, 0xf6),
      Self::Pink => (0xec, 0x48, 0x99),
      Self::Cyan => (0x06, 0xb6, 0xd4),
    }
  }
}

impl TryFrom<String> for Color {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

// ─── Addiction ───────────────────────────────────────────────────────────────

/// A tracked recovery target owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addiction {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Color,
  /// Store-assigned creation timestamp; never changes.
  pub start_date:  DateTime<Utc>,
}

// ─── NewAddiction ────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecoveryStore::add_addiction`].
/// `id` and `start_date` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAddiction {
  pub user_id:     Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Color,
}

impl NewAddiction {
  /// Build a validated input. The name and description are trimmed; a blank
  /// description becomes `None`.
  pub fn new(
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
    color: Color,
  ) -> Result<Self> {
    let input = Self {
      user_id,
      name: name.trim().to_owned(),
      description: description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned),
      color,
    };
    input.validate()?;
    Ok(input)
  }

  /// Check the name invariant. Stores call this again before writing, since
  /// the fields are public.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn palette_has_eight_entries_defaulting_to_green() {
    assert_eq!(Color::palette().count(), 8);
    assert_eq!(Color::default(), Color::Green);
    assert_eq!(Color::default().hex(), "#22c55e");
  }

  #[test]
  fn color_parses_case_insensitively() {
    assert_eq!(Color::parse("#3B82F6").unwrap(), Color::Blue);
    assert_eq!(Color::parse(" #ec4899 ").unwrap(), Color::Pink);
    assert!(matches!(
      Color::parse("#000000"),
      Err(Error::UnknownColor(s)) if s == "#000000"
    ));
  }

  #[test]
  fn color_serialises_as_hex_string() {
    let json = serde_json::to_string(&Color::Blue).unwrap();
    assert_eq!(json, "\"#3b82f6\"");
    let back: Color = serde_json::from_str("\"#06b6d4\"").unwrap();
    assert_eq!(back, Color::Cyan);
    assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
  }

  #[test]
  fn new_addiction_trims_fields() {
    let input = NewAddiction::new(
      Uuid::new_v4(),
      "  Smoking ",
      Some("   "),
      Color::Blue,
    )
    .unwrap();
    assert_eq!(input.name, "Smoking");
    assert_eq!(input.description, None);

    let input =
      NewAddiction::new(Uuid::new_v4(), "Social media", Some(" sleep more "), Color::Red)
        .unwrap();
    assert_eq!(input.description.as_deref(), Some("sleep more"));
  }

  #[test]
  fn new_addiction_rejects_blank_name() {
    let err = NewAddiction::new(Uuid::new_v4(), " \t ", None, Color::Green);
    assert!(matches!(err, Err(Error::EmptyName)));
  }
}
