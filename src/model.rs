use chrono::NaiveDate;
use serde::Deserialize;

// --- Data model ---

/// A named timestamp within a stream recording, used for display and seek navigation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
  /// Timestamp text in `minutes:seconds` form (or plain seconds).
  pub time: String,
  pub description: String,
}

/// One recorded stream: metadata plus its chapter list.
///
/// `timestamps` may be empty — a stream with no chapter annotations is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
  pub title: String,
  /// Calendar date in textual form, expected `YYYY-MM-DD`.
  pub date: String,
  /// URI of the external video resource.
  pub link: String,
  pub timestamps: Vec<Chapter>,
}

/// The wire shape of one data file: either a flat array of records or an
/// array of arrays nested one level. The loader flattens exactly one level.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DataFile {
  Records(Vec<StreamRecord>),
  Nested(Vec<Vec<StreamRecord>>),
}

impl DataFile {
  pub fn into_records(self) -> Vec<StreamRecord> {
    match self {
      DataFile::Records(records) => records,
      DataFile::Nested(groups) => groups.into_iter().flatten().collect(),
    }
  }
}

// --- Ordering ---

/// Parse a record date as `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Sort records by date ascending. Unparsable dates sort after all parsable
/// ones, keeping their aggregation order among themselves (stable sort).
pub fn sort_by_date(records: &mut [StreamRecord]) {
  records.sort_by_key(|r| match parse_date(&r.date) {
    Some(date) => (0u8, date),
    None => (1u8, NaiveDate::MAX),
  });
}
