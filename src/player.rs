use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::{
  io::AsyncBufReadExt,
  io::BufReader as TokioBufReader,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::info;

use crate::constants::constants;

/// What is currently loaded into the player.
#[derive(Debug, Clone)]
pub struct NowPlaying {
  pub title: String,
  pub date: String,
  pub link: String,
  /// Extracted video id, when the link matches a known hosting URL shape.
  /// Used to decide seek-in-place vs. respawn.
  pub video_id: Option<String>,
}

/// Embedded mpv playback with chapter seeking.
///
/// mpv is spawned per stream; seeking within the playing stream goes through
/// mpv's JSON IPC socket instead of respawning. Status line text is read from
/// mpv stdout through a bounded channel and polled by the event loop.
pub struct StreamPlayer {
  pub(crate) current_process: Option<TokioChild>,
  pub current: Option<NowPlaying>,
  mpv_monitor_handle: Option<JoinHandle<()>>,
  mpv_status_rx: Option<mpsc::Receiver<String>>,
  last_mpv_status: Option<String>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl StreamPlayer {
  pub fn new() -> Self {
    Self {
      current_process: None,
      current: None,
      mpv_monitor_handle: None,
      mpv_status_rx: None,
      last_mpv_status: None,
      ipc_socket_path: None,
      paused: false,
    }
  }

  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  pub fn check_mpv_status(&mut self) {
    if let Some(rx) = &mut self.mpv_status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_mpv_status = Some(status);
      }
    }
  }

  pub fn get_last_mpv_status(&self) -> Option<String> {
    self.last_mpv_status.clone()
  }

  /// Start playback of a stream, optionally from a chapter offset in seconds.
  ///
  /// If the same video is already playing, seeks in place over IPC rather than
  /// respawning mpv.
  pub async fn play(&mut self, now: NowPlaying, start_secs: Option<u32>) -> Result<()> {
    if let Some(secs) = start_secs
      && self.current_process.is_some()
      && self.current.as_ref().is_some_and(|c| c.video_id.is_some() && c.video_id == now.video_id)
    {
      info!(secs, "seeking within current stream");
      return self.seek(secs).await;
    }

    self.stop().await.context("Failed to stop previous playback")?;
    self.paused = false;

    let socket_path = std::env::temp_dir().join(format!("streamdex-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--term-status-msg=Time: ${time-pos/full} / ${duration/full} | Title: ${media-title} | ${pause} ${percent-pos}%",
      &format!("--input-ipc-server={}", socket_path_str),
    ]);
    if let Some(secs) = start_secs {
      cmd.arg(format!("--start={}", secs));
    }
    cmd.arg(&now.link);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null — if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(constants().status_channel_capacity);
    self.mpv_status_rx = Some(rx);

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    info!(link = %now.link, start = ?start_secs, "mpv spawned");
    self.current = Some(now);
    self.current_process = Some(child);
    self.mpv_monitor_handle = Some(monitor_handle);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  /// Seek the playing stream to an absolute position via mpv IPC.
  pub async fn seek(&mut self, secs: u32) -> Result<()> {
    let cmd = format!("{{\"command\":[\"seek\",{},\"absolute\"]}}\n", secs);
    self.send_ipc(cmd.as_bytes()).await
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    self.send_ipc(b"{\"command\":[\"cycle\",\"pause\"]}\n").await?;
    self.paused = !self.paused;
    Ok(())
  }

  async fn send_ipc(&self, cmd: &[u8]) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let written = stream.try_write(cmd).context("Failed to send command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.mpv_monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.mpv_status_rx = None;
    self.last_mpv_status = None;

    if let Some(mut child) = self.current_process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }

    self.current = None;
    self.paused = false;

    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
    Ok(())
  }
}
