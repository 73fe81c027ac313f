use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Style `text` as spans, emphasizing the first occurrence of the query.
fn highlighted_spans<'a>(text: &'a str, query: &str, base: Style, emphasis: Style) -> Vec<Span<'a>> {
  match crate::filter::match_range(text, query) {
    Some((start, end)) => vec![
      Span::styled(&text[..start], base),
      Span::styled(&text[start..end], emphasis),
      Span::styled(&text[end..], base),
    ],
    None => vec![Span::styled(text, base)],
  }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let playing_height = if app.player.is_playing() { 1 } else { 0 };
  let [header_area, main_area, playing_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(playing_height),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_main(frame, app, main_area);
  render_now_playing(frame, app, playing_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ streamdex ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.collection.records.is_empty() {
    render_welcome(frame, app.theme(), area);
  } else if app.expanded {
    let [records_area, chapters_area] =
      Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
    render_records(frame, app, records_area);
    render_chapters(frame, app, chapters_area);
  } else {
    render_records(frame, app, area);
  }
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  streamdex", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Search archived streams. Jump to chapters.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Type a query below, ^r reloads the archive.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_records(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let query = app.input.clone();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .filtered_indices
    .iter()
    .enumerate()
    .filter_map(|(i, &idx)| app.collection.records.get(idx).map(|r| (i, r)))
    .map(|(i, record)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let chapters = record.timestamps.len();
      let right = if chapters > 0 { format!("{}  {} ch", record.date, chapters) } else { record.date.clone() };
      let right_w = right.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&record.title, title_max);
      let title_w = title.chars().count();
      let gap = inner_w.saturating_sub(title_w + right_w);

      let emphasis = Style::default().fg(if is_selected { theme.highlight_fg } else { theme.accent })
        .add_modifier(Modifier::BOLD);
      let mut spans = Vec::new();
      // Highlight is computed on the truncated title; a match cut off by
      // truncation simply isn't emphasized.
      spans.extend(
        highlighted_spans(&title, &query, Style::default().fg(fg), emphasis)
          .into_iter()
          .map(|s| Span::styled(s.content.to_string(), s.style)),
      );
      spans.push(Span::raw(" ".repeat(gap)));
      spans.push(Span::styled(right, Style::default().fg(theme.muted)));

      ListItem::new(Line::from(spans)).bg(bg)
    })
    .collect();

  let title = if query.trim().is_empty() {
    format!(" Streams — {} ", app.filtered_indices.len())
  } else {
    format!(" Streams — {} of {} ", app.filtered_indices.len(), app.collection.records.len())
  };

  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_chapters(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let query = app.input.clone();
  let focused = app.mode == AppMode::Chapters;

  let Some(record) = app.selected_record() else { return };
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = record
    .timestamps
    .iter()
    .map(|ts| {
      let time = format!("{:>8}  ", ts.time);
      let desc_max = inner_w.saturating_sub(time.chars().count());
      let desc = truncate_str(&ts.description, desc_max);
      let emphasis = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
      let mut spans = vec![Span::styled(time, Style::default().fg(theme.muted))];
      spans.extend(
        highlighted_spans(&desc, &query, Style::default().fg(theme.fg), emphasis)
          .into_iter()
          .map(|s| Span::styled(s.content.to_string(), s.style)),
      );
      ListItem::new(Line::from(spans))
    })
    .collect();

  let border_color = if focused { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(" Chapters ")
        .title_style(Style::default().fg(border_color))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(border_color)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.chapter_state);
}

fn render_now_playing(frame: &mut Frame, app: &App, area: Rect) {
  if area.height == 0 {
    return;
  }
  let theme = app.theme();
  if let Some(now) = &app.player.current {
    let pause_marker = if app.player.paused { " ⏸" } else { "" };
    let line = Line::from(vec![
      Span::styled(" ♪ ", Style::default().fg(theme.accent)),
      Span::styled(now.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
      Span::styled(format!("  {}{}", now.date, pause_marker), Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(line, area);
  }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else {
    let mpv_status = app.player.get_last_mpv_status();
    match mpv_status {
      Some(status) => (format!(" ♪ {}", status), Style::default().fg(theme.status)),
      None => (" Ready".to_string(), Style::default().fg(theme.muted)),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Search { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search streams ")
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.mode == AppMode::Search {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_results = !app.filtered_indices.is_empty();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Search => {
      let mut k = vec![("Enter", "Results"), ("^r", "Reload"), ("^t", "Theme")];
      if is_playing {
        k.push(("^s", "Stop"));
      }
      if has_results {
        k.push(("↓", "Results"));
      }
      k.push(("Esc", "Quit"));
      k
    }
    AppMode::Results => {
      let mut k = vec![("Enter", "Play"), ("Tab", "Chapters"), ("j/k", "Navigate")];
      if is_playing {
        let pause_label = if app.player.paused { "Resume" } else { "Pause" };
        k.push(("Space", pause_label));
        k.push(("^s", "Stop"));
      }
      k.push(("Esc", "Search"));
      k
    }
    AppMode::Chapters => {
      let mut k = vec![("Enter", "Seek"), ("j/k", "Navigate")];
      if is_playing {
        k.push(("^s", "Stop"));
      }
      k.push(("Esc", "Back"));
      k
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
