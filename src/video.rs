/// Length of a YouTube video identifier.
const VIDEO_ID_LEN: usize = 11;

fn is_id_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Take a video id from the front of `rest`, if the next 11 chars form one.
fn take_id(rest: &str) -> Option<String> {
  let id: String = rest.chars().take_while(|c| is_id_char(*c)).take(VIDEO_ID_LEN).collect();
  if id.len() == VIDEO_ID_LEN { Some(id) } else { None }
}

/// Extract the 11-char video id from a known video-hosting URL shape.
///
/// Recognized forms (with or without scheme and `www.`):
/// - watch page: `youtube.com/watch?v=ID` (v may appear after other params)
/// - short link: `youtu.be/ID`
/// - embed link: `youtube.com/embed/ID`
/// - legacy: `youtube.com/v/ID`
pub fn extract_video_id(link: &str) -> Option<String> {
  let rest = link.trim();
  let rest = rest.strip_prefix("https://").or_else(|| rest.strip_prefix("http://")).unwrap_or(rest);
  let rest = rest.strip_prefix("www.").unwrap_or(rest);

  if let Some(path) = rest.strip_prefix("youtu.be/") {
    return take_id(path);
  }

  if let Some(path) = rest.strip_prefix("youtube.com/") {
    for prefix in ["embed/", "v/", "e/"] {
      if let Some(tail) = path.strip_prefix(prefix) {
        return take_id(tail);
      }
    }
    // Watch page: the id lives in the `v` query parameter.
    if let Some(query) = path.split_once('?').map(|(_, q)| q) {
      for param in query.split('&') {
        if let Some(value) = param.strip_prefix("v=") {
          return take_id(value);
        }
      }
    }
  }

  None
}

/// Parse timestamp text into total seconds.
///
/// Accepts `M:SS`, `H:MM:SS`, or plain seconds. Returns `None` for anything
/// that doesn't parse as a sequence of `:`-separated numbers.
pub fn seconds_from_time_text(text: &str) -> Option<u32> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }
  let mut total: u32 = 0;
  for part in trimmed.split(':') {
    let value: u32 = part.trim().parse().ok()?;
    total = total.checked_mul(60)?.checked_add(value)?;
  }
  Some(total)
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- extract_video_id ---

  #[test]
  fn watch_page_url() {
    assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    assert_eq!(extract_video_id("http://youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    assert_eq!(
      extract_video_id("https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=10"),
      Some("dQw4w9WgXcQ".to_string())
    );
  }

  #[test]
  fn short_link_url() {
    assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    assert_eq!(extract_video_id("youtu.be/dQw4w9WgXcQ?t=42"), Some("dQw4w9WgXcQ".to_string()));
  }

  #[test]
  fn embed_and_legacy_urls() {
    assert_eq!(extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    assert_eq!(extract_video_id("https://youtube.com/v/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
  }

  #[test]
  fn unrecognized_urls() {
    assert_eq!(extract_video_id("https://vimeo.com/123456"), None);
    assert_eq!(extract_video_id("https://youtube.com/watch?list=PL123"), None);
    assert_eq!(extract_video_id("https://youtu.be/short"), None); // id too short
    assert_eq!(extract_video_id(""), None);
  }

  // --- seconds_from_time_text ---

  #[test]
  fn minutes_seconds() {
    assert_eq!(seconds_from_time_text("2:30"), Some(150));
    assert_eq!(seconds_from_time_text("0:09"), Some(9));
  }

  #[test]
  fn hours_minutes_seconds() {
    assert_eq!(seconds_from_time_text("1:02:03"), Some(3723));
  }

  #[test]
  fn plain_seconds() {
    assert_eq!(seconds_from_time_text("90"), Some(90));
    assert_eq!(seconds_from_time_text(" 7 "), Some(7));
  }

  #[test]
  fn invalid_time_text() {
    assert_eq!(seconds_from_time_text(""), None);
    assert_eq!(seconds_from_time_text("abc"), None);
    assert_eq!(seconds_from_time_text("1:xx"), None);
    assert_eq!(seconds_from_time_text("-1:30"), None);
  }
}
