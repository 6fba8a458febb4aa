//! Application state machine and event dispatcher.

use std::{
  fmt,
  future::Future,
  sync::Arc,
  time::{Duration, Instant},
};

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use routine_core::{
  addiction::{Addiction, Color},
  check_in::CheckIn,
  identity::Session,
  streak::{AddictionProgress, summarize, today_check_in},
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::client::ApiClient;

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 3;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Sign in / sign up.
  Auth,
  /// Addictions with their streaks.
  Dashboard,
  /// The new-addiction form.
  AddAddiction,
}

// ─── Toasts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Info,
  Destructive,
}

/// A transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
  pub title:       String,
  pub description: String,
  pub kind:        ToastKind,
  pub shown_at:    Instant,
}

// ─── Forms ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
  #[default]
  Email,
  Password,
}

#[derive(Clone, Default)]
pub struct AuthForm {
  pub email:    String,
  pub password: String,
  pub focus:    AuthField,
}

impl fmt::Debug for AuthForm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthForm")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .field("focus", &self.focus)
      .finish()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddField {
  #[default]
  Name,
  Description,
  Color,
}

impl AddField {
  fn next(self) -> Self {
    match self {
      Self::Name => Self::Description,
      Self::Description => Self::Color,
      Self::Color => Self::Name,
    }
  }

  fn prev(self) -> Self {
    match self {
      Self::Name => Self::Color,
      Self::Description => Self::Name,
      Self::Color => Self::Description,
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct AddForm {
  pub name:        String,
  pub description: String,
  pub color:       Color,
  pub focus:       AddField,
}

impl AddForm {
  /// Submission is disabled while the trimmed name is empty.
  pub fn can_submit(&self) -> bool { !self.name.trim().is_empty() }

  /// Move the colour selection by `step` positions, wrapping around.
  pub fn cycle_color(&mut self, step: isize) {
    let palette: Vec<Color> = Color::palette().collect();
    let len = palette.len() as isize;
    let idx = palette.iter().position(|c| *c == self.color).unwrap_or(0) as isize;
    self.color = palette[(idx + step).rem_euclid(len) as usize];
  }

  fn field_mut(&mut self) -> Option<&mut String> {
    match self.focus {
      AddField::Name => Some(&mut self.name),
      AddField::Description => Some(&mut self.description),
      AddField::Color => None,
    }
  }
}

// ─── Fetch sequencing ─────────────────────────────────────────────────────────

/// Monotonic counter that tags each snapshot fetch. Only the response for
/// the most recently issued number may be applied, so a slow reply can't
/// overwrite newer state.
#[derive(Debug, Default)]
pub struct RequestSeq {
  latest: u64,
}

impl RequestSeq {
  /// Issue a new sequence number; every earlier one becomes stale.
  pub fn issue(&mut self) -> u64 {
    self.latest += 1;
    self.latest
  }

  pub fn is_current(&self, seq: u64) -> bool { seq == self.latest }
}

/// The user's records as of one fetch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub addictions: Vec<Addiction>,
  pub check_ins:  Vec<CheckIn>,
}

/// Results delivered to the event loop by background tasks.
#[derive(Debug)]
pub enum Message {
  Snapshot { seq: u64, result: Result<Snapshot, String> },
  Authenticated { register: bool, result: Result<Session, String> },
  CheckedIn { is_clean: bool, result: Result<(), String> },
  AddictionAdded { name: String, result: Result<(), String> },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// Present while signed in. Created by sign-in, dropped by sign-out.
  pub session: Option<Session>,

  /// The last applied snapshot.
  pub addictions: Vec<Addiction>,
  pub check_ins:  Vec<CheckIn>,

  /// A snapshot fetch is in flight.
  pub loading: bool,

  /// A write (sign-in, check-in, add) is in flight.
  pub busy: bool,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* addiction list.
  pub list_cursor: usize,

  pub auth_form: AuthForm,
  pub add_form:  AddForm,
  pub toasts:    Vec<Toast>,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,

  fetch_seq: RequestSeq,
  tx:        UnboundedSender<Message>,
  rx:        UnboundedReceiver<Message>,
}

impl App {
  /// Create a signed-out [`App`] on the auth screen.
  pub fn new(client: ApiClient) -> Self {
    let (tx, rx) = unbounded_channel();
    Self {
      screen: Screen::Auth,
      session: None,
      addictions: Vec::new(),
      check_ins: Vec::new(),
      loading: false,
      busy: false,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      auth_form: AuthForm::default(),
      add_form: AddForm::default(),
      toasts: Vec::new(),
      client: Arc::new(client),
      fetch_seq: RequestSeq::default(),
      tx,
      rx,
    }
  }

  /// The user's local calendar day.
  pub fn today(&self) -> NaiveDate { Local::now().date_naive() }

  // ── Toasts ────────────────────────────────────────────────────────────────

  pub fn toast(&mut self, kind: ToastKind, title: impl Into<String>, description: impl Into<String>) {
    self.toasts.push(Toast {
      title: title.into(),
      description: description.into(),
      kind,
      shown_at: Instant::now(),
    });
    if self.toasts.len() > MAX_TOASTS {
      self.toasts.remove(0);
    }
  }

  fn error_toast(&mut self, title: &str, err: &anyhow::Error) {
    self.toast(ToastKind::Destructive, title, format!("{err:#}"));
  }

  /// Drop toasts older than [`TOAST_TTL`].
  pub fn expire_toasts(&mut self, now: Instant) {
    self
      .toasts
      .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_TTL);
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Submit the auth form, registering first if `register` is set. The
  /// outcome arrives as a [`Message::Authenticated`].
  pub fn authenticate(&mut self, register: bool) {
    let email = self.auth_form.email.trim().to_owned();
    let password = self.auth_form.password.clone();
    if self.busy || email.is_empty() || password.is_empty() {
      return;
    }

    self.spawn_write(move |client| async move {
      let result = if register {
        client.sign_up(&email, &password).await
      } else {
        client.sign_in(&email, &password).await
      };
      Message::Authenticated { register, result: result.map_err(|e| format!("{e:#}")) }
    });
  }

  /// Install `session` and load its data.
  pub fn start_session(&mut self, session: Session) {
    self.session = Some(session);
    self.screen = Screen::Dashboard;
    self.fetch_data();
  }

  /// Tear down the session: tell the server, forget local state, and
  /// invalidate any fetch still in flight.
  pub async fn sign_out(&mut self) {
    let Some(session) = self.session.take() else {
      return;
    };
    if let Err(e) = self.client.sign_out(&session).await {
      self.error_toast("Error signing out", &e);
    }
    self.clear_session_state();
  }

  fn clear_session_state(&mut self) {
    self.session = None;
    self.fetch_seq.issue();
    self.loading = false;
    self.addictions.clear();
    self.check_ins.clear();
    self.filter.clear();
    self.filter_active = false;
    self.list_cursor = 0;
    self.add_form = AddForm::default();
    self.screen = Screen::Auth;
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Start a background fetch of addictions and check-ins. The result
  /// arrives as a [`Message::Snapshot`] through [`App::poll_messages`].
  pub fn fetch_data(&mut self) {
    let Some(session) = self.session.clone() else {
      return;
    };
    let seq = self.fetch_seq.issue();
    self.loading = true;

    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = tokio::try_join!(
        client.list_addictions(&session),
        client.list_check_ins(&session),
      )
      .map(|(addictions, check_ins)| Snapshot { addictions, check_ins })
      .map_err(|e| format!("{e:#}"));
      // The receiver lives as long as the app; a send error means we're
      // shutting down.
      let _ = tx.send(Message::Snapshot { seq, result });
    });
  }

  /// Run a write in the background and mark the app busy until its
  /// [`Message`] is applied.
  fn spawn_write<F, Fut>(&mut self, write: F)
  where
    F: FnOnce(Arc<ApiClient>) -> Fut,
    Fut: Future<Output = Message> + Send + 'static,
  {
    self.busy = true;
    let tx = self.tx.clone();
    let fut = write(Arc::clone(&self.client));
    tokio::spawn(async move {
      let _ = tx.send(fut.await);
    });
  }

  /// Apply every message that has arrived since the last call.
  pub fn poll_messages(&mut self) {
    while let Ok(msg) = self.rx.try_recv() {
      self.apply(msg);
    }
  }

  /// Apply one background result. Snapshots are discarded if a newer fetch
  /// has been issued since.
  pub fn apply(&mut self, msg: Message) {
    match msg {
      Message::Snapshot { seq, result } => {
        if !self.fetch_seq.is_current(seq) {
          tracing::debug!(seq, "discarding stale snapshot");
          return;
        }
        self.loading = false;
        match result {
          Ok(snapshot) => {
            self.addictions = snapshot.addictions;
            self.check_ins = snapshot.check_ins;
            let len = self.filtered_addictions().len();
            self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
          }
          Err(message) => {
            self.toast(ToastKind::Destructive, "Error fetching data", message);
          }
        }
      }

      Message::Authenticated { register, result } => {
        self.busy = false;
        match result {
          Ok(session) => {
            self.auth_form = AuthForm::default();
            self.start_session(session);
          }
          Err(message) => {
            let title = if register { "Error signing up" } else { "Error signing in" };
            self.toast(ToastKind::Destructive, title, message);
          }
        }
      }

      Message::CheckedIn { is_clean, result } => {
        self.busy = false;
        match result {
          Ok(()) if is_clean => self.toast(
            ToastKind::Info,
            "Great job!",
            "Keep up the good work on your recovery journey!",
          ),
          Ok(()) => self.toast(
            ToastKind::Info,
            "Tomorrow is a new day",
            "Every setback is a setup for a comeback.",
          ),
          Err(message) => {
            self.toast(ToastKind::Destructive, "Error updating check-in", message);
            return;
          }
        }
        self.fetch_data();
      }

      Message::AddictionAdded { name, result } => {
        self.busy = false;
        match result {
          Ok(()) => {
            self.toast(
              ToastKind::Info,
              "Addiction added successfully",
              format!("Started tracking your journey to overcome {name}"),
            );
            self.add_form = AddForm::default();
            if self.screen == Screen::AddAddiction {
              self.screen = Screen::Dashboard;
            }
            self.fetch_data();
          }
          Err(message) => {
            self.toast(ToastKind::Destructive, "Error adding addiction", message);
          }
        }
      }
    }
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  /// Addictions that match the current filter query.
  pub fn filtered_addictions(&self) -> Vec<&Addiction> {
    if self.filter.is_empty() {
      return self.addictions.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .addictions
      .iter()
      .filter(|a| matcher.fuzzy_match(&a.name, &self.filter).is_some())
      .collect()
  }

  /// Dashboard cards for the filtered list, computed for `today`.
  pub fn progress(&self, today: NaiveDate) -> Vec<AddictionProgress> {
    let visible: Vec<Addiction> =
      self.filtered_addictions().into_iter().cloned().collect();
    summarize(&visible, &self.check_ins, today)
  }

  /// The addiction under the list cursor in the filtered view, if any.
  pub fn cursor_addiction(&self) -> Option<&Addiction> {
    self.filtered_addictions().get(self.list_cursor).copied()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Record today's outcome for the addiction under the cursor. The result
  /// arrives as a [`Message::CheckedIn`], which triggers a refresh.
  fn check_in(&mut self, is_clean: bool) {
    let Some(session) = self.session.clone() else {
      return;
    };
    let Some(addiction_id) = self.cursor_addiction().map(|a| a.id) else {
      return;
    };
    let today = self.today();
    // The actions are only offered until today's status is recorded.
    if self.busy || today_check_in(&self.check_ins, addiction_id, today).is_some() {
      return;
    }

    self.spawn_write(move |client| async move {
      let result = client
        .check_in(&session, addiction_id, today, is_clean)
        .await
        .map(drop)
        .map_err(|e| format!("{e:#}"));
      Message::CheckedIn { is_clean, result }
    });
  }

  /// Submit the add-addiction form.
  fn submit_addiction(&mut self) {
    let Some(session) = self.session.clone() else {
      return;
    };
    if !self.add_form.can_submit() || self.busy {
      return;
    }

    let name = self.add_form.name.trim().to_owned();
    let description = self.add_form.description.trim().to_owned();
    let description = (!description.is_empty()).then_some(description);
    let color = self.add_form.color;

    self.spawn_write(move |client| async move {
      let result = client
        .add_addiction(&session, &name, description.as_deref(), color)
        .await
        .map(drop)
        .map_err(|e| format!("{e:#}"));
      Message::AddictionAdded { name, result }
    });
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::Auth => Ok(self.handle_auth_key(key)),
      Screen::Dashboard if self.filter_active => Ok(self.handle_filter_key(key)),
      Screen::Dashboard => self.handle_dashboard_key(key).await,
      Screen::AddAddiction => Ok(self.handle_add_key(key)),
    }
  }

  fn handle_auth_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => return false,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.auth_form.focus = match self.auth_form.focus {
          AuthField::Email => AuthField::Password,
          AuthField::Password => AuthField::Email,
        };
      }
      KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.authenticate(true);
      }
      KeyCode::Enter => self.authenticate(false),
      KeyCode::Backspace => {
        let form = &mut self.auth_form;
        match form.focus {
          AuthField::Email => form.email.pop(),
          AuthField::Password => form.password.pop(),
        };
      }
      KeyCode::Char(c) => {
        let form = &mut self.auth_form;
        match form.focus {
          AuthField::Email => form.email.push(c),
          AuthField::Password => form.password.push(c),
        }
      }
      _ => {}
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_addictions().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('c') => self.check_in(true),
      KeyCode::Char('x') => self.check_in(false),

      KeyCode::Char('a') => {
        self.add_form = AddForm::default();
        self.screen = Screen::AddAddiction;
      }
      KeyCode::Char('r') => self.fetch_data(),
      KeyCode::Char('s') => self.sign_out().await,

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      _ => {}
    }
    Ok(true)
  }

  fn handle_add_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => self.screen = Screen::Dashboard,
      KeyCode::Tab | KeyCode::Down => self.add_form.focus = self.add_form.focus.next(),
      KeyCode::BackTab | KeyCode::Up => self.add_form.focus = self.add_form.focus.prev(),
      KeyCode::Enter => self.submit_addiction(),
      KeyCode::Left if self.add_form.focus == AddField::Color => self.add_form.cycle_color(-1),
      KeyCode::Right if self.add_form.focus == AddField::Color => self.add_form.cycle_color(1),
      KeyCode::Backspace => {
        if let Some(field) = self.add_form.field_mut() {
          field.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(field) = self.add_form.field_mut() {
          field.push(c);
        }
      }
      _ => {}
    }
    true
  }
}
