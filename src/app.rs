use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::filter::matches_query;
use crate::loader::{LoadError, Loader};
use crate::model::{StreamRecord, sort_by_date};
use crate::player::{NowPlaying, StreamPlayer};
use crate::theme::THEMES;
use crate::video::{extract_video_id, seconds_from_time_text};

// --- Types ---

pub type LoadResult = Result<Vec<StreamRecord>, LoadError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Typing in the search box.
  Search,
  /// Navigating the record list.
  Results,
  /// Navigating the expanded chapter list of the selected record.
  Chapters,
}

/// The aggregated collection for one load-cycle epoch.
///
/// Loaded once at startup and on explicit refresh; searches filter this cache
/// without re-fetching. A failed refresh leaves the previous epoch untouched.
#[derive(Default)]
pub struct Collection {
  pub epoch: u64,
  pub records: Vec<StreamRecord>,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) load_rx: Option<oneshot::Receiver<LoadResult>>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub theme_index: usize,
  pub base_url: String,
  pub collection: Collection,
  /// Indices into `collection.records` that match the current query.
  /// When the query is empty, contains all indices.
  pub filtered_indices: Vec<usize>,
  pub list_state: ListState,
  pub chapter_state: ListState,
  /// Whether the selected record's chapter list is expanded.
  pub expanded: bool,
  pub player: StreamPlayer,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  pub(crate) tasks: AsyncTasks,
  /// When the last error was set — used for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(base_url: String) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };

    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Search,
      theme_index,
      base_url,
      collection: Collection::default(),
      filtered_indices: Vec::new(),
      list_state: ListState::default(),
      chapter_state: ListState::default(),
      expanded: false,
      player: StreamPlayer::new(),
      last_error: None,
      status_message: None,
      should_quit: false,
      tasks: AsyncTasks::default(),
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // theme_index stays in bounds: modular arithmetic in next_theme(), clamped at init.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    let config = Config { theme_name: Some(self.theme().name.to_string()), base_url: Some(self.base_url.clone()) };
    config.save();
  }

  // --- Errors ---

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after the dismiss window.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  // --- Filtering ---

  /// Rebuild `filtered_indices` from the cached collection and the current
  /// query. Filtering preserves collection order (date ascending). Clamps the
  /// list selection and collapses the chapter pane when the selection moves.
  pub fn recompute_filter(&mut self) {
    let query = self.input.as_str();
    if query.trim().is_empty() {
      self.filtered_indices = (0..self.collection.records.len()).collect();
    } else {
      self.filtered_indices = self
        .collection
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_query(record, query))
        .map(|(i, _)| i)
        .collect();
    }
    // Clamp selection to the new filtered range
    if self.filtered_indices.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      if sel >= self.filtered_indices.len() {
        self.list_state.select(Some(self.filtered_indices.len().saturating_sub(1)));
      } else if self.list_state.selected().is_none() {
        self.list_state.select(Some(0));
      }
    }
    self.collapse_chapters();
  }

  /// The record currently selected in the filtered list.
  pub fn selected_record(&self) -> Option<&StreamRecord> {
    let sel = self.list_state.selected()?;
    let idx = *self.filtered_indices.get(sel)?;
    self.collection.records.get(idx)
  }

  // --- Chapter pane ---

  /// Expand the selected record's chapter list, or collapse it if open.
  pub fn toggle_chapters(&mut self) {
    if self.expanded {
      self.collapse_chapters();
      return;
    }
    let Some(record) = self.selected_record() else { return };
    if record.timestamps.is_empty() {
      self.set_error("No chapters for this stream.".to_string());
      return;
    }
    self.expanded = true;
    self.chapter_state.select(Some(0));
  }

  pub fn collapse_chapters(&mut self) {
    self.expanded = false;
    self.chapter_state.select(None);
    if self.mode == AppMode::Chapters {
      self.mode = AppMode::Results;
    }
  }

  // --- Load cycle ---

  /// Kick off a load cycle in the background: manifest fetch, concurrent
  /// data-file fetches, one flat collection. Results arrive via `check_pending`.
  pub fn trigger_refresh(&mut self) {
    self.clear_error();
    self.status_message = Some("Loading streams…".to_string());

    let base_url = self.base_url.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = match Loader::new(&base_url) {
        Ok(loader) => loader.load_cycle().await,
        Err(e) => Err(LoadError::ResourceUnavailable { resource: base_url, reason: format!("{:#}", e) }),
      };
      let _ = tx.send(result);
    });
    self.tasks.load_rx = Some(rx);
  }

  /// Apply a finished load cycle. On success the collection is sorted by date
  /// and the epoch bumped; on failure the previous epoch stays visible and the
  /// error is surfaced in the status line.
  pub(crate) fn apply_load_result(&mut self, result: LoadResult) {
    self.status_message = None;
    match result {
      Ok(mut records) => {
        sort_by_date(&mut records);
        self.collection.epoch += 1;
        info!(epoch = self.collection.epoch, records = records.len(), "collection refreshed");
        self.collection.records = records;
        self.list_state.select(None);
        self.recompute_filter();
      }
      Err(e) => {
        warn!(err = %e, "load cycle failed");
        self.set_error(format!("Load failed: {}", e));
      }
    }
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.load_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.apply_load_result(result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.load_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Load task failed.".to_string());
        }
      }
    }
  }

  // --- Playback ---

  /// Play the selected record, optionally from one of its chapters.
  pub async fn play_selected(&mut self, chapter: Option<usize>) {
    let Some(record) = self.selected_record().cloned() else { return };

    let start_secs = match chapter {
      Some(i) => {
        let Some(ts) = record.timestamps.get(i) else { return };
        match seconds_from_time_text(&ts.time) {
          Some(secs) => Some(secs),
          None => {
            self.set_error(format!("Unparsable timestamp: {}", ts.time));
            return;
          }
        }
      }
      None => None,
    };

    let video_id = extract_video_id(&record.link);
    let now = NowPlaying { title: record.title, date: record.date, link: record.link, video_id };
    self.clear_error();

    if let Err(e) = self.player.play(now, start_secs).await {
      self.set_error(format!("Playback error: {}", e));
      let _ = self.player.stop().await;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Chapter;

  fn make_record(title: &str, date: &str, descriptions: &[&str]) -> StreamRecord {
    StreamRecord {
      title: title.to_string(),
      date: date.to_string(),
      link: String::new(),
      timestamps: descriptions
        .iter()
        .map(|d| Chapter { time: "1:00".to_string(), description: d.to_string() })
        .collect(),
    }
  }

  fn app_with(records: Vec<StreamRecord>) -> App {
    let mut app = App::new("http://localhost".to_string());
    app.apply_load_result(Ok(records));
    app
  }

  #[test]
  fn load_result_sorts_by_date_and_bumps_epoch() {
    let app = app_with(vec![
      make_record("late", "2023-06-01", &[]),
      make_record("early", "2022-12-01", &[]),
      make_record("mid", "2023-01-05", &[]),
    ]);
    let titles: Vec<&str> = app.collection.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["early", "mid", "late"]);
    assert_eq!(app.collection.epoch, 1);
  }

  #[test]
  fn failed_load_keeps_previous_collection() {
    let mut app = app_with(vec![make_record("kept", "2023-01-01", &[])]);
    app.apply_load_result(Err(LoadError::ResourceUnavailable {
      resource: "streams/manifest.json".to_string(),
      reason: "status 404".to_string(),
    }));
    assert_eq!(app.collection.epoch, 1);
    assert_eq!(app.collection.records.len(), 1);
    assert!(app.last_error.as_deref().unwrap_or("").contains("streams/manifest.json"));
  }

  #[test]
  fn empty_query_matches_all_in_order() {
    let mut app = app_with(vec![
      make_record("a", "2023-01-01", &[]),
      make_record("b", "2023-01-02", &[]),
      make_record("c", "2023-01-03", &[]),
    ]);
    app.input = "   ".to_string();
    app.recompute_filter();
    assert_eq!(app.filtered_indices, vec![0, 1, 2]);
  }

  #[test]
  fn query_filters_titles_and_chapter_descriptions() {
    let mut app = app_with(vec![
      make_record("Intro", "2023-01-01", &["hello world"]),
      make_record("Outro", "2023-01-02", &[]),
    ]);
    app.input = "hello".to_string();
    app.recompute_filter();
    assert_eq!(app.filtered_indices.len(), 1);
    assert_eq!(app.selected_record().unwrap().title, "Intro");
  }

  #[test]
  fn filter_clamps_selection() {
    let mut app = app_with(vec![
      make_record("aaa", "2023-01-01", &[]),
      make_record("aab", "2023-01-02", &[]),
      make_record("bbb", "2023-01-03", &[]),
    ]);
    app.list_state.select(Some(2));
    app.input = "aa".to_string();
    app.recompute_filter();
    assert_eq!(app.list_state.selected(), Some(1));

    app.input = "zzz".to_string();
    app.recompute_filter();
    assert_eq!(app.list_state.selected(), None);
    assert!(app.selected_record().is_none());
  }

  #[test]
  fn toggle_chapters_requires_chapters() {
    let mut app = app_with(vec![make_record("bare", "2023-01-01", &[])]);
    app.list_state.select(Some(0));
    app.toggle_chapters();
    assert!(!app.expanded);
    assert!(app.last_error.is_some());

    let mut app = app_with(vec![make_record("chaptered", "2023-01-01", &["one", "two"])]);
    app.list_state.select(Some(0));
    app.toggle_chapters();
    assert!(app.expanded);
    assert_eq!(app.chapter_state.selected(), Some(0));
    app.toggle_chapters();
    assert!(!app.expanded);
  }
}
