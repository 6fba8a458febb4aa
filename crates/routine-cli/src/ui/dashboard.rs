//! Dashboard — addiction list on the left, progress card on the right.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use routine_core::streak::{AddictionProgress, days_label};

use crate::app::App;

const REMINDER: &str = "\"Progress is impossible without change, and those who cannot \
                        change their minds cannot change anything.\" - George Bernard Shaw";

fn accent(color: routine_core::addiction::Color) -> Color {
  let (r, g, b) = color.rgb();
  Color::Rgb(r, g, b)
}

/// Render the dashboard into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  if app.addictions.is_empty() && !app.loading {
    draw_empty(f, area);
    return;
  }

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  let progress = app.progress(app.today());
  draw_list(f, cols[0], app, &progress);

  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(5)])
    .split(cols[1]);

  match progress.get(app.list_cursor) {
    Some(p) => draw_card(f, right[0], p),
    None => draw_placeholder(f, right[0], app.loading),
  }
  draw_reminder(f, right[1]);
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn draw_list(f: &mut Frame, area: Rect, app: &App, progress: &[AddictionProgress]) {
  let total = app.addictions.len();
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Addictions ({}/{}) ", progress.len(), total)
  } else {
    format!(" Addictions ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = progress
    .iter()
    .map(|p| {
      let status = match &p.today {
        Some(c) if c.is_clean => Span::styled(" ✓", Style::default().fg(Color::Green)),
        Some(_) => Span::styled(" ✗", Style::default().fg(Color::Red)),
        None => Span::raw(""),
      };
      ListItem::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(accent(p.addiction.color))),
        Span::raw(p.addiction.name.clone()),
        Span::styled(
          format!("  {}", p.current_streak),
          Style::default().fg(Color::DarkGray),
        ),
        status,
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select((!progress.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

// ─── Progress card ────────────────────────────────────────────────────────────

fn draw_card(f: &mut Frame, area: Rect, p: &AddictionProgress) {
  let color = accent(p.addiction.color);
  let block = Block::default()
    .title(Span::styled(
      format!(" {} ", p.addiction.name),
      Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let mut lines = Vec::new();

  if let Some(description) = &p.addiction.description {
    lines.push(Line::from(Span::styled(
      description.clone(),
      Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(""));
  }

  lines.push(Line::from(vec![
    Span::styled(format!("{:<16}", "Current streak"), label),
    Span::styled(
      days_label(p.current_streak),
      Style::default().add_modifier(Modifier::BOLD),
    ),
  ]));
  lines.push(Line::from(vec![
    Span::styled(format!("{:<16}", "Best streak"), label),
    Span::raw(days_label(p.longest_streak)),
  ]));
  lines.push(Line::from(vec![
    Span::styled(format!("{:<16}", "Tracking since"), label),
    Span::raw(p.addiction.start_date.format("%Y-%m-%d").to_string()),
  ]));
  lines.push(Line::from(""));

  match &p.today {
    Some(c) if c.is_clean => lines.push(Line::from(Span::styled(
      " Clean Today ",
      Style::default()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD),
    ))),
    Some(_) => lines.push(Line::from(Span::styled(
      " Relapsed Today ",
      Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD),
    ))),
    None => {
      lines.push(Line::from("How did today go?"));
      lines.push(Line::from(vec![
        Span::styled("[c]", Style::default().fg(Color::Green)),
        Span::raw(" I stayed clean   "),
        Span::styled("[x]", Style::default().fg(Color::Red)),
        Span::raw(" I relapsed"),
      ]));
    }
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_placeholder(f: &mut Frame, area: Rect, loading: bool) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  let text = if loading { "Loading…" } else { "No addiction matches the filter." };
  f.render_widget(
    Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

fn draw_reminder(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Daily Reminder ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Span::styled(
      REMINDER,
      Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC),
    ))
    .wrap(Wrap { trim: true }),
    inner,
  );
}

// ─── Empty state ──────────────────────────────────────────────────────────────

fn draw_empty(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      "Start Your Journey",
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled(
      "Add your first addiction to begin tracking your recovery progress. Press [a].",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(
    Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
    inner,
  );
}
