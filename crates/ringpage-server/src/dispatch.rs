//! Call dispatch: turn a visitor's form submission into one outbound call.
//!
//! Preconditions are checked in a fixed order and each is a hard stop:
//! session, quota, required fields (and field types), destination number,
//! then the referenced credential, assistant and phone number. The call
//! counter is only incremented after the provider accepted the call.

use ringpage_api::ApiError;
use ringpage_core::{
  credential::redact_for_log,
  demo_page::DemoPage,
  form::FormData,
  phone::{has_digits, normalize_phone},
  store::ConfigStore,
  variables::resolve_variables,
};
use ringpage_provider::{CallProvider, CallRequest};
use serde::Serialize;
use tracing::{error, info};

/// Body returned to the visitor after a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
  pub success: bool,
  pub message: String,
  pub call_id: Option<String>,
  pub status:  Option<String>,
}

/// Dispatch a call for the active `page`.
///
/// `session_valid` reports whether the visitor presented a valid session for
/// this page; it is only consulted for password-protected pages.
pub async fn dispatch_call<S, P>(
  store: &S,
  provider: &P,
  page: &DemoPage,
  session_valid: bool,
  form: &FormData,
  debug_calls: bool,
) -> Result<CallOutcome, ApiError>
where
  S: ConfigStore,
  P: CallProvider,
{
  if page.password_required && !session_valid {
    return Err(ApiError::Unauthorized("Password verification required".into()));
  }

  if page.quota_exhausted() {
    return Err(ApiError::QuotaExceeded(
      "This demo has reached its maximum number of calls".into(),
    ));
  }

  for field in &page.fields {
    match form.non_blank(&field.key) {
      None if field.required => {
        return Err(ApiError::Validation(format!("{} is required", field.label)));
      }
      None => {}
      Some(value) => field
        .field_type
        .check(value, &field.options)
        .map_err(|reason| ApiError::Validation(format!("{} {reason}", field.label)))?,
    }
  }

  let to_label = page
    .field(&page.call_to_field_key)
    .map_or(page.call_to_field_key.as_str(), |f| f.label.as_str());
  let raw_to = form
    .non_blank(&page.call_to_field_key)
    .ok_or_else(|| ApiError::Validation(format!("{to_label} is required")))?;
  let to_number = normalize_phone(raw_to);
  if !has_digits(&to_number) {
    return Err(ApiError::Validation(format!("{to_label} must be a phone number")));
  }

  let misconfigured = |what: &str| {
    error!(slug = %page.slug, "{what} is missing or inactive");
    ApiError::Configuration("This demo is not configured correctly".into())
  };

  let credential = store
    .get_credential(page.credential_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .filter(|c| c.is_active)
    .ok_or_else(|| misconfigured("credential"))?;
  let assistant = store
    .get_assistant(page.assistant_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .filter(|a| a.is_active)
    .ok_or_else(|| misconfigured("assistant"))?;
  let phone = store
    .get_phone_number(page.phone_number_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .filter(|p| p.is_active)
    .ok_or_else(|| misconfigured("phone number"))?;

  let request = CallRequest::outbound_sip(
    assistant.provider_assistant_id,
    phone.provider_phone_number_id,
    to_number,
    resolve_variables(&page.variables, form),
  );

  if debug_calls {
    info!(
      slug = %page.slug,
      credential = %redact_for_log(&credential.secret_value),
      request = ?request,
      "dispatching call"
    );
  }

  let response = match provider.start_call(&credential.secret_value, &request).await {
    Ok(r) => r,
    Err(e) => {
      error!(slug = %page.slug, error = %e, "provider rejected call");
      return Err(ApiError::provider("Failed to initiate call", e));
    }
  };

  if debug_calls {
    info!(slug = %page.slug, response = %response.raw, "provider response");
  }

  // The call is already placed; a failed counter update is logged, not
  // reported to the visitor.
  match store.increment_calls_made(page.id).await {
    Ok(true) => {}
    Ok(false) => error!(slug = %page.slug, "page vanished before call counter update"),
    Err(e) => error!(slug = %page.slug, error = %e, "call counter update failed"),
  }

  info!(slug = %page.slug, call_id = ?response.call_id, "call initiated");
  Ok(CallOutcome {
    success: true,
    message: "Call initiated successfully".into(),
    call_id: response.call_id,
    status:  response.status,
  })
}
