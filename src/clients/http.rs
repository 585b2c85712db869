//! Shared HTTP session used by both service clients
//!
//! One `reqwest::blocking::Client` is built per invocation and cloned into each
//! service client; clones share the connection pool, so every enrichment
//! worker reuses the same connections.

use super::retry::RetryPolicy;
use crate::core::config::ServicesConfig;
use crate::core::error::{RailError, RailResult, RemoteError, Service};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the per-invocation HTTP client
pub fn build_client(services: &ServicesConfig) -> RailResult<Client> {
  Client::builder()
    .timeout(Duration::from_secs(services.timeout_secs))
    .user_agent(concat!("advisory-rail/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(|e| RailError::message(format!("Failed to build HTTP client: {}", e)))
}

/// A base URL plus credentials and retry policy on top of a shared client
#[derive(Clone)]
pub struct HttpSession {
  client: Client,
  base_url: String,
  token: Option<String>,
  retry: RetryPolicy,
  service: Service,
}

impl HttpSession {
  pub fn new(client: Client, base_url: &str, token: Option<String>, retry: RetryPolicy, service: Service) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
      retry,
      service,
    }
  }

  /// Base URL extended by `segments`, each percent-encoded as a single path segment
  fn url(&self, segments: &[&str]) -> RailResult<Url> {
    let mut url = Url::parse(&self.base_url)
      .map_err(|e| RailError::message(format!("Invalid {} URL '{}': {}", self.service, self.base_url, e)))?;
    url
      .path_segments_mut()
      .map_err(|()| RailError::message(format!("{} URL cannot carry a path: {}", self.service, self.base_url)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// Send a request and map non-2xx statuses to `RemoteError`
  ///
  /// Only idempotent requests go through the retry policy; a POST is sent once.
  fn send(
    &self,
    segments: &[&str],
    idempotent: bool,
    build: impl Fn(&Client, Url) -> RequestBuilder,
  ) -> RailResult<Response> {
    let url = self.url(segments)?;
    let path = segments.join("/");
    let attempt = || {
      let mut request = build(&self.client, url.clone());
      if let Some(token) = &self.token {
        request = request.bearer_auth(token);
      }

      tracing::debug!(service = %self.service, %url, "request");
      let response = request.send().map_err(|e| RemoteError::Unavailable {
        service: self.service,
        status: None,
        reason: e.to_string(),
      })?;

      check_status(self.service, &path, response)
    };

    if idempotent {
      self.retry.run(url.as_str(), attempt)
    } else {
      attempt()
    }
  }

  /// GET and decode a JSON body
  pub fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> RailResult<T> {
    let response = self.send(segments, true, |client, url| client.get(url).query(query))?;
    self.decode(segments, response)
  }

  /// GET and decode a JSON body, mapping 404 to `None`
  pub fn get_json_optional<T: DeserializeOwned>(
    &self,
    segments: &[&str],
    query: &[(&str, &str)],
  ) -> RailResult<Option<T>> {
    match self.get_json(segments, query) {
      Ok(value) => Ok(Some(value)),
      Err(RailError::Remote(RemoteError::NotFound { .. })) => Ok(None),
      Err(err) => Err(err),
    }
  }

  /// POST a JSON body and decode the JSON response
  pub fn post_json<B, T>(&self, segments: &[&str], body: &B) -> RailResult<T>
  where
    B: serde::Serialize,
    T: DeserializeOwned,
  {
    let response = self.send(segments, false, |client, url| client.post(url).json(body))?;
    self.decode(segments, response)
  }

  /// POST a JSON body, ignoring the response body
  pub fn post(&self, segments: &[&str], body: &impl serde::Serialize) -> RailResult<()> {
    self.send(segments, false, |client, url| client.post(url).json(body))?;
    Ok(())
  }

  fn decode<T: DeserializeOwned>(&self, segments: &[&str], response: Response) -> RailResult<T> {
    response.json().map_err(|e| {
      RailError::Remote(RemoteError::Unavailable {
        service: self.service,
        status: None,
        reason: format!("malformed response from {}: {}", segments.join("/"), e),
      })
    })
  }
}

fn check_status(service: Service, path: &str, response: Response) -> RailResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().unwrap_or_default();
  let err = match status {
    StatusCode::UNAUTHORIZED => RemoteError::Authentication { service },
    StatusCode::FORBIDDEN => RemoteError::Authorization {
      service,
      detail: body.trim().to_string(),
    },
    StatusCode::NOT_FOUND => RemoteError::NotFound {
      service,
      resource: path.to_string(),
    },
    _ => RemoteError::Unavailable {
      service,
      status: Some(status.as_u16()),
      reason: body.trim().to_string(),
    },
  };

  Err(RailError::Remote(err))
}
