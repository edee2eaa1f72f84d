//! Router-level tests for the admin API against an in-memory store and a
//! scripted provider.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use ringpage_provider::{
  CallProvider, CallRequest, CallResponse, Error as ProviderError, RemoteAssistant,
  RemotePhoneNumber,
};
use ringpage_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::admin_router;

#[derive(Default)]
struct ScriptedProvider {
  assistants:  Vec<RemoteAssistant>,
  phones:      Vec<RemotePhoneNumber>,
  fail_status: Option<u16>,
}

impl ScriptedProvider {
  fn check(&self) -> ringpage_provider::Result<()> {
    match self.fail_status {
      Some(status) => Err(ProviderError::Status { status, body: json!({ "message": "bad token" }) }),
      None => Ok(()),
    }
  }
}

impl CallProvider for ScriptedProvider {
  async fn start_call(&self, _: &str, _: &CallRequest) -> ringpage_provider::Result<CallResponse> {
    Ok(CallResponse::default())
  }

  async fn list_assistants(&self, _: &str) -> ringpage_provider::Result<Vec<RemoteAssistant>> {
    self.check()?;
    Ok(self.assistants.clone())
  }

  async fn list_phone_numbers(&self, _: &str) -> ringpage_provider::Result<Vec<RemotePhoneNumber>> {
    self.check()?;
    Ok(self.phones.clone())
  }
}

async fn app_with(provider: ScriptedProvider) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  admin_router(Arc::new(store), Arc::new(provider))
}

async fn app() -> Router { app_with(ScriptedProvider::default()).await }

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header("content-type", "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Create one credential, assistant and phone number; return their ids.
async fn seed_refs(app: &Router) -> (String, String, String) {
  let (s, c) = send(app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_1234567890" }))).await;
  assert_eq!(s, StatusCode::CREATED, "{c}");
  let (s, a) = send(app, "POST", "/assistants", Some(json!({ "name": "Sales", "providerAssistantId": "asst_1" }))).await;
  assert_eq!(s, StatusCode::CREATED, "{a}");
  let (s, p) = send(
    app,
    "POST",
    "/phone-numbers",
    Some(json!({ "name": "Main", "providerPhoneNumberId": "pn_1", "displayNumber": "+1 555 0100" })),
  )
  .await;
  assert_eq!(s, StatusCode::CREATED, "{p}");
  (
    c["id"].as_str().unwrap().to_string(),
    a["id"].as_str().unwrap().to_string(),
    p["id"].as_str().unwrap().to_string(),
  )
}

fn page_body(refs: &(String, String, String), slug: &str) -> Value {
  json!({
    "slug": slug,
    "title": "Acme demo",
    "credentialId": refs.0,
    "assistantId": refs.1,
    "phoneNumberId": refs.2,
    "fields": [
      { "key": "phone", "label": "Phone", "type": "tel", "required": true },
      { "key": "name",  "label": "Name",  "type": "text" }
    ],
    "callToFieldKey": "phone",
    "variables": [
      { "key": "customer", "source": "field", "value": "name" },
      { "key": "", "source": "static", "value": "dropped" }
    ],
    "maxCalls": "5"
  })
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn credential_responses_are_masked() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_1234567890" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["maskedValue"], "sk_l…7890");
  assert!(body.get("secretValue").is_none());
  assert!(!body.to_string().contains("sk_live_1234567890"));

  let (_, list) = send(&app, "GET", "/credentials", None).await;
  assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn credential_validation_and_conflict() {
  let app = app().await;
  let (status, _) = send(&app, "POST", "/credentials", Some(json!({ "name": "p", "value": "sk_live_123" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "short" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let body = json!({ "name": "prod", "value": "sk_live_123" });
  send(&app, "POST", "/credentials", Some(body.clone())).await;
  let (status, err) = send(&app, "POST", "/credentials", Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(err["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn missing_ids_are_404() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();
  for uri in [
    format!("/credentials/{id}"),
    format!("/assistants/{id}"),
    format!("/phone-numbers/{id}"),
    format!("/demo-pages/{id}"),
  ] {
    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
  }
}

// ─── Demo pages ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_page_normalises_and_hides_hash() {
  let app = app().await;
  let refs = seed_refs(&app).await;

  let (status, page) = send(&app, "POST", "/demo-pages", Some(page_body(&refs, "  Acme Demo! "))).await;
  assert_eq!(status, StatusCode::CREATED, "{page}");
  assert_eq!(page["slug"], "acme-demo");
  assert_eq!(page["maxCalls"], 5);
  assert_eq!(page["callsMade"], 0);
  assert_eq!(page["hasPassword"], false);
  assert!(page.get("passwordHash").is_none());
  assert_eq!(page["variables"].as_array().unwrap().len(), 1);

  let (status, _) = send(&app, "POST", "/demo-pages", Some(page_body(&refs, "acme-demo"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_page_requires_existing_references() {
  let app = app().await;
  let refs = seed_refs(&app).await;
  let bogus = (uuid::Uuid::new_v4().to_string(), refs.1.clone(), refs.2.clone());

  let (status, err) = send(&app, "POST", "/demo-pages", Some(page_body(&bogus, "acme"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(err["error"].as_str().unwrap().contains("credential"));
}

#[tokio::test]
async fn password_protection_needs_a_password() {
  let app = app().await;
  let refs = seed_refs(&app).await;

  let mut body = page_body(&refs, "locked");
  body["passwordRequired"] = json!(true);
  let (status, _) = send(&app, "POST", "/demo-pages", Some(body.clone())).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  body["password"] = json!("abc");
  let (status, _) = send(&app, "POST", "/demo-pages", Some(body.clone())).await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "too short");

  body["password"] = json!("letmein");
  let (status, page) = send(&app, "POST", "/demo-pages", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{page}");
  assert_eq!(page["hasPassword"], true);

  // Turning protection off drops the hash.
  let id = page["id"].as_str().unwrap();
  let (_, page) = send(&app, "PUT", &format!("/demo-pages/{id}"), Some(json!({ "passwordRequired": false }))).await;
  assert_eq!(page["hasPassword"], false);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
  let app = app().await;
  let refs = seed_refs(&app).await;
  let (_, page) = send(&app, "POST", "/demo-pages", Some(page_body(&refs, "acme"))).await;
  let id = page["id"].as_str().unwrap();

  let (status, updated) = send(
    &app,
    "PUT",
    &format!("/demo-pages/{id}"),
    Some(json!({ "title": null, "maxCalls": null })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{updated}");
  assert_eq!(updated["title"], Value::Null);
  assert_eq!(updated["maxCalls"], Value::Null);
  assert_eq!(updated["slug"], "acme");
  assert_eq!(updated["fields"].as_array().unwrap().len(), 2);

  let (status, _) = send(
    &app,
    "PUT",
    &format!("/demo-pages/{id}"),
    Some(json!({ "callToFieldKey": "missing" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_calls_returns_zero() {
  let app = app().await;
  let refs = seed_refs(&app).await;
  let (_, page) = send(&app, "POST", "/demo-pages", Some(page_body(&refs, "acme"))).await;
  let id = page["id"].as_str().unwrap();

  let (status, body) = send(&app, "POST", &format!("/demo-pages/{id}/reset-calls"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "success": true, "message": "Call counter reset", "callsMade": 0 }));

  let (status, body) = send(&app, "DELETE", &format!("/demo-pages/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["message"].is_string());
}

// ─── Sync ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn assistant_sync_upserts_and_reports_bad_items() {
  let provider = ScriptedProvider {
    assistants: vec![
      RemoteAssistant { assistant_id: Some("asst_9".into()), name: None, status: Some("active".into()) },
      RemoteAssistant { assistant_id: None, name: Some("Broken".into()), status: None },
    ],
    ..Default::default()
  };
  let app = app_with(provider).await;
  let (_, cred) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_123" }))).await;
  let body = json!({ "credentialId": cred["id"] });

  let (status, first) = send(&app, "POST", "/assistants/sync", Some(body.clone())).await;
  assert_eq!(status, StatusCode::OK, "{first}");
  assert_eq!(first["success"], true);
  assert_eq!(first["message"], "Synced 2 assistants");
  assert_eq!(first["results"]["created"], 1);
  assert_eq!(first["results"]["errors"].as_array().unwrap().len(), 1);

  let (_, second) = send(&app, "POST", "/assistants/sync", Some(body)).await;
  assert_eq!(second["results"]["created"], 0);
  assert_eq!(second["results"]["updated"], 1);

  let (_, list) = send(&app, "GET", "/assistants", None).await;
  assert_eq!(list[0]["name"], "Unnamed Assistant");
  assert_eq!(list[0]["isActive"], true);
}

#[tokio::test]
async fn phone_sync_names_fall_back_to_number() {
  let provider = ScriptedProvider {
    phones: vec![RemotePhoneNumber {
      phone_number_id: Some("pn_7".into()),
      friendly_name:   None,
      number:          Some("+15550100".into()),
      status:          Some("inactive".into()),
    }],
    ..Default::default()
  };
  let app = app_with(provider).await;
  let (_, cred) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_123" }))).await;

  let (status, _) = send(&app, "POST", "/phone-numbers/sync", Some(json!({ "credentialId": cred["id"] }))).await;
  assert_eq!(status, StatusCode::OK);

  let (_, list) = send(&app, "GET", "/phone-numbers", None).await;
  assert_eq!(list[0]["name"], "+15550100");
  assert_eq!(list[0]["displayNumber"], "+15550100");
  assert_eq!(list[0]["isActive"], false);
}

#[tokio::test]
async fn sync_with_inactive_credential_is_404() {
  let app = app().await;
  let (_, cred) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_123" }))).await;
  let id = cred["id"].as_str().unwrap();
  send(&app, "PUT", &format!("/credentials/{id}"), Some(json!({ "isActive": false }))).await;

  let (status, _) = send(&app, "POST", "/assistants/sync", Some(json!({ "credentialId": id }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sync_surfaces_provider_status_and_details() {
  let app = app_with(ScriptedProvider { fail_status: Some(401), ..Default::default() }).await;
  let (_, cred) = send(&app, "POST", "/credentials", Some(json!({ "name": "prod", "value": "sk_live_123" }))).await;

  let (status, body) = send(&app, "POST", "/phone-numbers/sync", Some(json!({ "credentialId": cred["id"] }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["details"]["message"], "bad token");
}
