//! Sign-in and add-addiction forms.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};
use routine_core::addiction::Color as Accent;

use crate::app::{AddField, App, AuthField};

/// A centred box of at most `width` × `height`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

/// One labelled input line; the focused field gets a cursor and highlight.
fn field<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
  let label_style = if focused {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  let value = if focused { format!("{value}_") } else { value };
  Line::from(vec![
    Span::styled(format!("{label:<13}"), label_style),
    Span::raw(value),
  ])
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

pub fn draw_auth(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.auth_form;
  let rect = centered(area, 56, 10);

  let block = Block::default()
    .title(" Sign in to Reset Routine ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(rect);
  f.render_widget(Clear, rect);
  f.render_widget(block, rect);

  let masked = "•".repeat(form.password.chars().count());
  let lines = vec![
    Line::from(Span::styled(
      "Track your recovery, one day at a time.",
      Style::default().fg(Color::DarkGray),
    )),
    Line::from(""),
    field("Email", form.email.clone(), form.focus == AuthField::Email),
    field("Password", masked, form.focus == AuthField::Password),
    Line::from(""),
    Line::from(if app.busy {
      Span::styled("Working…", Style::default().fg(Color::Yellow))
    } else {
      Span::styled(
        "Enter sign in  Ctrl-R create account",
        Style::default().fg(Color::DarkGray),
      )
    }),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Add addiction ────────────────────────────────────────────────────────────

pub fn draw_add(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.add_form;
  let rect = centered(area, 64, 12);

  let block = Block::default()
    .title(" Add New Addiction ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(rect);
  f.render_widget(Clear, rect);
  f.render_widget(block, rect);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // name
      Constraint::Length(1), // description
      Constraint::Length(1), // spacer
      Constraint::Length(1), // colour
      Constraint::Length(1), // spacer
      Constraint::Min(0),    // hints
    ])
    .split(inner);

  f.render_widget(
    Paragraph::new(field("Name", form.name.clone(), form.focus == AddField::Name)),
    rows[0],
  );
  f.render_widget(
    Paragraph::new(field(
      "Description",
      form.description.clone(),
      form.focus == AddField::Description,
    )),
    rows[1],
  );
  f.render_widget(Paragraph::new(color_picker(form.color, form.focus == AddField::Color)), rows[3]);

  let hint = if form.can_submit() {
    Span::styled(
      "Tab next field  ←→ colour  Enter add  Esc cancel",
      Style::default().fg(Color::DarkGray),
    )
  } else {
    Span::styled("A name is required.", Style::default().fg(Color::DarkGray))
  };
  f.render_widget(Paragraph::new(Line::from(hint)), rows[5]);
}

fn color_picker(selected: Accent, focused: bool) -> Line<'static> {
  let label_style = if focused {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  let mut spans = vec![Span::styled(format!("{:<13}", "Color"), label_style)];
  for c in Accent::palette() {
    let (r, g, b) = c.rgb();
    let swatch = if c == selected { "[●]" } else { " ● " };
    spans.push(Span::styled(swatch, Style::default().fg(Color::Rgb(r, g, b))));
  }
  spans.push(Span::styled(
    format!(" {}", selected.name()),
    Style::default().fg(Color::DarkGray),
  ));
  Line::from(spans)
}
