//! Identities and the session context handed to signed-in callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Password material never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id:    Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// An authenticated session: the bearer token plus the identity it resolves
/// to. Returned by sign-up and sign-in; the token is only ever shown once.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  Identity,
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("token", &"<redacted>")
      .field("user", &self.user)
      .finish()
  }
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_debug_hides_the_token() {
    let session = Session {
      token: "s3cr3t-bearer".into(),
      user:  Identity {
        user_id:    Uuid::nil(),
        email:      "alice@example.com".into(),
        created_at: Utc::now(),
      },
    };
    let shown = format!("{session:?}");
    assert!(!shown.contains("s3cr3t-bearer"));
    assert!(shown.contains("alice@example.com"));
  }

  #[test]
  fn email_is_trimmed_and_lowercased() {
    assert_eq!(normalize_email("  Alice@Example.COM \n"), "alice@example.com");
  }
}
