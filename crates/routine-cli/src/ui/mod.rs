//! TUI rendering — orchestrates all panes.

pub mod dashboard;
pub mod forms;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Screen, ToastKind};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
  draw_toasts(f, rows[1], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%A, %B %-d, %Y").to_string();

  let left = Span::styled(
    " Reset Routine",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = match &app.session {
    Some(s) => format!("Welcome, {}  {date} ", s.user.email),
    None => format!("{date} "),
  };
  let right = Span::styled(right, Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.screen {
    Screen::Auth => forms::draw_auth(f, area, app),
    Screen::Dashboard => dashboard::draw(f, area, app),
    Screen::AddAddiction => {
      dashboard::draw(f, area, app);
      forms::draw_add(f, area, app);
    }
  }
}

// ─── Toasts ───────────────────────────────────────────────────────────────────

/// Stack toasts in the bottom-right corner of `area`, newest lowest.
fn draw_toasts(f: &mut Frame, area: Rect, app: &App) {
  const WIDTH: u16 = 48;
  const HEIGHT: u16 = 4;

  let width = WIDTH.min(area.width);
  let mut bottom = area.y + area.height;
  for toast in app.toasts.iter().rev() {
    if bottom < area.y + HEIGHT {
      break;
    }
    bottom -= HEIGHT;
    let rect = Rect {
      x:      area.x + area.width - width,
      y:      bottom,
      width,
      height: HEIGHT,
    };

    let color = match toast.kind {
      ToastKind::Info => Color::Green,
      ToastKind::Destructive => Color::Red,
    };
    let block = Block::default()
      .title(Span::styled(
        format!(" {} ", toast.title),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
      ))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color));
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);
    f.render_widget(
      Paragraph::new(toast.description.as_str()).wrap(Wrap { trim: true }),
      inner,
    );
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    Screen::Auth => ("SIGN IN", "Tab switch field  Enter sign in  Ctrl-R sign up  Esc quit"),
    Screen::Dashboard if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter keep",
    ),
    Screen::Dashboard => (
      "NORMAL",
      "↑↓/jk navigate  c clean  x relapsed  a add  / search  r refresh  s sign out  q quit",
    ),
    Screen::AddAddiction => ("ADD", "Tab next field  ←→ colour  Enter add  Esc cancel"),
  };

  let status = if app.busy {
    "Saving…".to_string()
  } else if app.loading {
    "Loading…".to_string()
  } else {
    hints.to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
