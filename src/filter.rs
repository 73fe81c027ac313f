use crate::model::StreamRecord;

/// Check whether a record matches the given free-text query.
///
/// Matches case-insensitively against the title and every chapter description.
/// An empty or whitespace-only query matches everything. A single substring
/// test — no ranking, no tokenization.
pub fn matches_query(record: &StreamRecord, query: &str) -> bool {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return true;
  }
  if record.title.to_lowercase().contains(&needle) {
    return true;
  }
  record.timestamps.iter().any(|ts| ts.description.to_lowercase().contains(&needle))
}

/// Byte range of the first case-insensitive occurrence of `query` in `text`,
/// for highlighting the match in the UI. Only returned when the range falls on
/// char boundaries of the original text (lowercasing can shift byte offsets
/// for some scripts).
pub fn match_range(text: &str, query: &str) -> Option<(usize, usize)> {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return None;
  }
  let haystack = text.to_lowercase();
  let start = haystack.find(&needle)?;
  let end = start + needle.len();
  if text.is_char_boundary(start) && text.is_char_boundary(end) { Some((start, end)) } else { None }
}
