use anyhow::{Context, Result};
use futures::future;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::constants::constants;
use crate::model::{DataFile, StreamRecord};

// --- Error taxonomy ---

/// Load-cycle failures. A cycle is all-or-nothing: any single failure aborts
/// the whole cycle and no partial collection is produced.
#[derive(Debug, Error)]
pub enum LoadError {
  /// Manifest or data-file fetch failed — non-success status or transport failure.
  #[error("failed to fetch {resource}: {reason}")]
  ResourceUnavailable { resource: String, reason: String },

  /// The manifest body is not a JSON array of file names.
  #[error("malformed manifest: {reason}")]
  MalformedManifest { reason: String },

  /// A data file's content does not match the stream record shape.
  #[error("malformed data file {resource}: {reason}")]
  MalformedRecord { resource: String, reason: String },
}

// --- Parsing ---

/// Parse a manifest body as an ordered sequence of file identifiers.
pub fn parse_manifest(body: &str) -> Result<Vec<String>, LoadError> {
  serde_json::from_str::<Vec<String>>(body).map_err(|e| LoadError::MalformedManifest { reason: e.to_string() })
}

/// Parse a data file body, flattening exactly one nesting level.
pub fn parse_data_file(resource: &str, body: &str) -> Result<Vec<StreamRecord>, LoadError> {
  let file: DataFile = serde_json::from_str(body)
    .map_err(|e| LoadError::MalformedRecord { resource: resource.to_string(), reason: e.to_string() })?;
  Ok(file.into_records())
}

// --- Loader ---

/// Fetches the manifest and its referenced data files over HTTP and combines
/// them into one flat collection.
pub struct Loader {
  client: Client,
  base_url: String,
}

impl Loader {
  /// Build a loader for the given base URL. The client carries a request
  /// timeout so a hung retrieval cannot stall a load cycle indefinitely.
  pub fn new(base_url: &str) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(constants().fetch_timeout_secs))
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  /// GET a resource relative to the base URL, returning its body text.
  /// Non-success status and transport failures both map to `ResourceUnavailable`
  /// naming the resource that failed.
  async fn get_text(&self, resource: &str) -> Result<String, LoadError> {
    let url = format!("{}/{}", self.base_url, resource);
    let unavailable = |reason: String| LoadError::ResourceUnavailable { resource: resource.to_string(), reason };

    let response = self.client.get(&url).send().await.map_err(|e| unavailable(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
      return Err(unavailable(format!("status {}", status)));
    }
    response.text().await.map_err(|e| unavailable(e.to_string()))
  }

  pub async fn fetch_manifest(&self) -> Result<Vec<String>, LoadError> {
    let body = self.get_text(&constants().manifest_path).await?;
    parse_manifest(&body)
  }

  pub async fn fetch_data_file(&self, name: &str) -> Result<Vec<StreamRecord>, LoadError> {
    let resource = format!("{}/{}", constants().streams_dir, name);
    let body = self.get_text(&resource).await?;
    parse_data_file(&resource, &body)
  }

  /// Run one full load cycle: fetch the manifest, fetch every referenced data
  /// file concurrently, and concatenate the results in manifest order.
  ///
  /// The join is all-or-nothing — the first failure aborts the cycle and the
  /// error names the resource that failed.
  pub async fn load_cycle(&self) -> Result<Vec<StreamRecord>, LoadError> {
    let names = self.fetch_manifest().await?;
    info!(files = names.len(), "manifest fetched");

    let fetches = names.iter().map(|name| self.fetch_data_file(name));
    let files = future::try_join_all(fetches).await?;

    let records: Vec<StreamRecord> = files.into_iter().flatten().collect();
    info!(records = records.len(), "load cycle complete");
    Ok(records)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::matches_query;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  // --- parsing ---

  #[test]
  fn parse_manifest_array_of_strings() {
    assert_eq!(parse_manifest(r#"["a.json","b.json"]"#).unwrap(), vec!["a.json", "b.json"]);
    assert_eq!(parse_manifest("[]").unwrap(), Vec::<String>::new());
  }

  #[test]
  fn parse_manifest_wrong_shape() {
    assert!(matches!(parse_manifest(r#"{"files":[]}"#), Err(LoadError::MalformedManifest { .. })));
    assert!(matches!(parse_manifest(r#"[1,2,3]"#), Err(LoadError::MalformedManifest { .. })));
    assert!(matches!(parse_manifest("not json"), Err(LoadError::MalformedManifest { .. })));
  }

  #[test]
  fn parse_data_file_wrong_shape_names_resource() {
    let err = parse_data_file("streams/a.json", r#"{"oops":true}"#).unwrap_err();
    match err {
      LoadError::MalformedRecord { resource, .. } => assert_eq!(resource, "streams/a.json"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn aggregation_concatenates_in_file_order() {
    let a = parse_data_file(
      "streams/a.json",
      r#"[{"title":"A","date":"2023-01-01","link":"","timestamps":[]},
          {"title":"B","date":"2023-01-02","link":"","timestamps":[]}]"#,
    )
    .unwrap();
    let b = parse_data_file("streams/b.json", r#"[{"title":"C","date":"2023-01-03","link":"","timestamps":[]}]"#)
      .unwrap();
    let titles: Vec<String> = [a, b].into_iter().flatten().map(|r| r.title).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
  }

  #[test]
  fn end_to_end_example_filters_to_intro() {
    let a = parse_data_file(
      "streams/a.json",
      r#"[{"title":"Intro","date":"2023-01-01","link":"https://youtu.be/XXXXXXXXXXX",
          "timestamps":[{"time":"0:10","description":"hello world"}]}]"#,
    )
    .unwrap();
    let b = parse_data_file(
      "streams/b.json",
      r#"[{"title":"Outro","date":"2023-01-02","link":"https://youtu.be/YYYYYYYYYYY","timestamps":[]}]"#,
    )
    .unwrap();
    let all: Vec<StreamRecord> = [a, b].into_iter().flatten().collect();
    let hits: Vec<&StreamRecord> = all.iter().filter(|r| matches_query(r, "hello")).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Intro");
  }

  // --- fetch failures ---

  /// Minimal one-shot HTTP server for exercising the loader against real
  /// sockets: serves fixed bodies by path, 404 for anything else.
  async fn serve_fixture(routes: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      loop {
        let Ok((mut stream, _)) = listener.accept().await else { break };
        let routes = routes.clone();
        tokio::spawn(async move {
          // Read until the end of the request headers.
          let mut buf = Vec::new();
          let mut chunk = [0u8; 1024];
          loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
              break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
              break;
            }
          }
          let request = String::from_utf8_lossy(&buf).to_string();
          let path = request.split_whitespace().nth(1).unwrap_or("").to_string();
          let response = match routes.iter().find(|(p, _)| *p == path) {
            Some((_, body)) => format!(
              "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
              body.len(),
              body
            ),
            None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
          };
          let _ = stream.write_all(response.as_bytes()).await;
          let _ = stream.shutdown().await;
        });
      }
    });
    format!("http://{}", addr)
  }

  #[tokio::test]
  async fn transport_failure_is_resource_unavailable() {
    // Nothing listens on this port; connection is refused immediately.
    let loader = Loader::new("http://127.0.0.1:1").unwrap();
    let err = loader.load_cycle().await.unwrap_err();
    match err {
      LoadError::ResourceUnavailable { resource, .. } => assert_eq!(resource, "streams/manifest.json"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn manifest_non_success_status_fails_cycle() {
    let base = serve_fixture(vec![("/other.json", "[]".to_string())]).await;
    let loader = Loader::new(&base).unwrap();
    let err = loader.load_cycle().await.unwrap_err();
    match err {
      LoadError::ResourceUnavailable { resource, reason } => {
        assert_eq!(resource, "streams/manifest.json");
        assert!(reason.contains("404"), "reason: {reason}");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn one_failed_data_file_fails_whole_cycle() {
    let base = serve_fixture(vec![
      ("/streams/manifest.json", r#"["a.json","missing.json"]"#.to_string()),
      ("/streams/a.json", r#"[{"title":"A","date":"2023-01-01","link":"","timestamps":[]}]"#.to_string()),
    ])
    .await;
    let loader = Loader::new(&base).unwrap();
    let err = loader.load_cycle().await.unwrap_err();
    match err {
      LoadError::ResourceUnavailable { resource, .. } => assert_eq!(resource, "streams/missing.json"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn full_cycle_flattens_across_files() {
    let base = serve_fixture(vec![
      ("/streams/manifest.json", r#"["a.json","b.json"]"#.to_string()),
      (
        "/streams/a.json",
        r#"[[{"title":"A","date":"2023-01-01","link":"","timestamps":[]}],
            [{"title":"B","date":"2023-01-02","link":"","timestamps":[]}]]"#
          .to_string(),
      ),
      ("/streams/b.json", r#"[{"title":"C","date":"2023-01-03","link":"","timestamps":[]}]"#.to_string()),
    ])
    .await;
    let loader = Loader::new(&base).unwrap();
    let records = loader.load_cycle().await.unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
  }
}
