//! reqwest-backed [`CallProvider`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
  CallProvider, Error, Result,
  types::{CallRequest, CallResponse, RemoteAssistant, RemotePhoneNumber},
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.bolcho.ai/v1";

/// Connection settings for the provider API.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: Duration::from_secs(30) }
  }
}

/// Async HTTP client for the provider API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Requests are
/// never retried.
#[derive(Clone)]
pub struct ProviderClient {
  client:   Client,
  base_url: String,
}

impl ProviderClient {
  pub fn new(config: ProviderConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  /// Send with bearer auth and return the body text of a success response.
  async fn send(&self, req: RequestBuilder, secret: &str) -> Result<String> {
    let resp = req.bearer_auth(secret).send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    debug!(%status, bytes = text.len(), "provider response");

    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body: body_value(&text) });
    }
    Ok(text)
  }

  async fn fetch_list<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
    secret: &str,
  ) -> Result<Vec<T>> {
    let text = self
      .send(self.client.get(self.url(path)).query(query), secret)
      .await?;
    let value: Value = serde_json::from_str(&text)
      .map_err(|e| Error::Malformed(format!("GET {path}: {e}")))?;
    if !value.is_array() {
      return Err(Error::Malformed(format!("GET {path}: expected a JSON array")));
    }
    serde_json::from_value(value).map_err(|e| Error::Malformed(format!("GET {path}: {e}")))
  }
}

/// Error bodies are kept as JSON when they parse, as a string otherwise.
fn body_value(text: &str) -> Value {
  serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

impl CallProvider for ProviderClient {
  async fn start_call(&self, secret: &str, request: &CallRequest) -> Result<CallResponse> {
    let text = self
      .send(self.client.post(self.url("/phone-numbers/call")).json(request), secret)
      .await?;
    Ok(CallResponse::from_body(&text))
  }

  async fn list_assistants(&self, secret: &str) -> Result<Vec<RemoteAssistant>> {
    self
      .fetch_list("/assistants", &[("limit", "100"), ("status", "active")], secret)
      .await
  }

  async fn list_phone_numbers(&self, secret: &str) -> Result<Vec<RemotePhoneNumber>> {
    self
      .fetch_list(
        "/phone-numbers",
        &[("status", "active"), ("limit", "50"), ("skip", "0")],
        secret,
      )
      .await
  }
}

#[cfg(test)]
mod tests {
  use std::collections::{BTreeMap, HashMap};

  use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
  };
  use serde_json::json;

  use super::*;

  /// Serve `router` on an ephemeral port and return a client pointed at it.
  async fn serve(router: Router) -> ProviderClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    ProviderClient::new(ProviderConfig {
      base_url: format!("http://{addr}/"),
      timeout:  Duration::from_secs(5),
    })
    .unwrap()
  }

  fn bearer(headers: &HeaderMap) -> String {
    headers
      .get("authorization")
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_string()
  }

  #[tokio::test]
  async fn start_call_posts_payload_with_bearer() {
    let router = Router::new().route(
      "/phone-numbers/call",
      post(|headers: HeaderMap, Json(body): Json<Value>| async move {
        Json(json!({ "call_id": "call_123", "status": "queued", "auth": bearer(&headers), "echo": body }))
      }),
    );
    let client = serve(router).await;

    let req = CallRequest::outbound_sip("asst", "pn", "+15551234567", BTreeMap::new());
    let resp = client.start_call("sk_test", &req).await.unwrap();

    assert_eq!(resp.call_id.as_deref(), Some("call_123"));
    assert_eq!(resp.status.as_deref(), Some("queued"));
    assert_eq!(resp.raw["auth"], "Bearer sk_test");
    assert_eq!(resp.raw["echo"]["to_number"], "+15551234567");
    assert_eq!(resp.raw["echo"]["type"], "sip");
  }

  #[tokio::test]
  async fn non_json_success_is_accepted() {
    let router = Router::new().route("/phone-numbers/call", post(|| async { "OK" }));
    let client = serve(router).await;

    let req = CallRequest::outbound_sip("a", "p", "1", BTreeMap::new());
    let resp = client.start_call("sk", &req).await.unwrap();
    assert_eq!(resp.call_id, None);
    assert_eq!(resp.status, None);
  }

  #[tokio::test]
  async fn error_status_carries_body() {
    let router = Router::new().route(
      "/phone-numbers/call",
      post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "bad number" }))) }),
    );
    let client = serve(router).await;

    let req = CallRequest::outbound_sip("a", "p", "1", BTreeMap::new());
    match client.start_call("sk", &req).await {
      Err(Error::Status { status, body }) => {
        assert_eq!(status, 422);
        assert_eq!(body["detail"], "bad number");
      }
      other => panic!("expected status error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn list_assistants_sends_filters() {
    let router = Router::new().route(
      "/assistants",
      get(|Query(q): Query<HashMap<String, String>>| async move {
        assert_eq!(q.get("status").map(String::as_str), Some("active"));
        assert_eq!(q.get("limit").map(String::as_str), Some("100"));
        Json(json!([
          { "assistant_id": "a1", "name": "Sales", "status": "active" },
          { "name": "No id" },
        ]))
      }),
    );
    let client = serve(router).await;

    let list = client.list_assistants("sk").await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].assistant_id.as_deref(), Some("a1"));
    assert_eq!(list[1].assistant_id, None);
  }

  #[tokio::test]
  async fn non_array_list_is_malformed() {
    let router = Router::new()
      .route("/phone-numbers", get(|| async { Json(json!({ "items": [] })) }));
    let client = serve(router).await;

    assert!(matches!(client.list_phone_numbers("sk").await, Err(Error::Malformed(_))));
  }
}
