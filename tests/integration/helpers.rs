//! Test helpers for integration tests

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A scratch directory holding advisory-rail.toml
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Empty workspace with no configuration
  pub fn empty() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Workspace configured for the 3.9 stream against `services_url`
  pub fn new(services_url: &str) -> Result<Self> {
    Self::with_extra_config(services_url, "")
  }

  /// Same as `new`, with `extra` appended to the config (e.g. a `[retry]` table)
  pub fn with_extra_config(services_url: &str, extra: &str) -> Result<Self> {
    let ws = Self::empty()?;
    ws.write_config(&format!(
      r#"[group]
name = "openshift-3.9"
branch = "rhaos-3.9-rhel-7"
non_release = ["openshift-enterprise-base"]
images = ["router", "openshift-enterprise-base"]

[services]
build_system_url = "{url}"
advisory_url = "{url}"
timeout_secs = 5
workers = 2
{extra}"#,
      url = services_url,
      extra = extra
    ))?;
    Ok(ws)
  }

  pub fn write_config(&self, content: &str) -> Result<()> {
    std::fs::write(self.path.join("advisory-rail.toml"), content)?;
    Ok(())
  }
}

/// Run advisory-rail and require success
pub fn run_advisory_rail(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_advisory_rail_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "advisory-rail command failed: advisory-rail {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run advisory-rail and return its output whatever the exit status
pub fn run_advisory_rail_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_advisory-rail");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env("ADVISORY_RAIL_TOKEN", "test-token")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run advisory-rail")
}

/// One canned response
#[derive(Clone)]
pub struct Route {
  method: Method,
  path: String,
  body_contains: Option<String>,
  remaining: Option<Arc<AtomicUsize>>,
  status: u16,
  body: String,
}

impl Route {
  pub fn get(path: &str, status: u16, body: &str) -> Self {
    Self {
      method: Method::GET,
      path: path.to_string(),
      body_contains: None,
      remaining: None,
      status,
      body: body.to_string(),
    }
  }

  pub fn post(path: &str, status: u16, body: &str) -> Self {
    Self {
      method: Method::POST,
      ..Self::get(path, status, body)
    }
  }

  /// Only match requests whose body contains `needle`
  pub fn when_body_contains(mut self, needle: &str) -> Self {
    self.body_contains = Some(needle.to_string());
    self
  }

  /// Answer at most `n` requests, then let later routes match
  pub fn times(mut self, n: usize) -> Self {
    self.remaining = Some(Arc::new(AtomicUsize::new(n)));
    self
  }

  fn matches(&self, method: &Method, path: &str, body: &str) -> bool {
    self.method == *method
      && self.path == path
      && self.body_contains.as_deref().is_none_or(|needle| body.contains(needle))
  }

  /// Use up one answer; false once a `times` route is exhausted
  fn take(&self) -> bool {
    match &self.remaining {
      None => true,
      Some(remaining) => remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok(),
    }
  }
}

struct Routes {
  table: Vec<Route>,
  requests: Mutex<Vec<String>>,
}

/// HTTP server answering from a fixed route table
///
/// The first matching route wins; anything else gets a 404. The server runs on
/// its own tokio runtime thread until the test process exits.
pub struct FakeServer {
  addr: SocketAddr,
  routes: Arc<Routes>,
}

impl FakeServer {
  pub fn start(table: Vec<Route>) -> Result<Self> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;

    let routes = Arc::new(Routes {
      table,
      requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(respond).with_state(Arc::clone(&routes));

    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context("Failed to build tokio runtime")?;
    std::thread::spawn(move || {
      runtime.block_on(async move {
        let listener = tokio::net::TcpListener::from_std(listener)?;
        axum::serve(listener, app).await
      })
    });

    Ok(Self { addr, routes })
  }

  pub fn url(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// `"METHOD /path"` for every request seen so far, query strings dropped
  pub fn requests(&self) -> Vec<String> {
    self.routes.requests.lock().unwrap().clone()
  }

  /// How many times `"METHOD /path"` was requested
  pub fn count(&self, request: &str) -> usize {
    self.requests().iter().filter(|r| *r == request).count()
  }
}

async fn respond(State(routes): State<Arc<Routes>>, method: Method, uri: Uri, body: String) -> impl IntoResponse {
  let path = uri.path().to_string();
  routes.requests.lock().unwrap().push(format!("{} {}", method, path));

  let (status, response_body) = routes
    .table
    .iter()
    .find(|r| r.matches(&method, &path, &body) && r.take())
    .map(|r| (r.status, r.body.clone()))
    .unwrap_or((404, r#"{"error": "not found"}"#.to_string()));

  (
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    [(header::CONTENT_TYPE, "application/json")],
    response_body,
  )
}
