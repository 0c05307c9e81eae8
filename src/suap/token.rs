//! Token acquisition against the provider's candidate token endpoints

use serde_json::{json, Value};

use super::errors::AuthError;
use super::transport::{HttpTransport, ProviderRequest, ProviderResponse, RequestBody, TransportError};
use crate::models::{Credentials, TokenResult};
use crate::utils::logging::LoggingHelper;
use crate::utils::text::truncate_chars;

const ACCESS_TOKEN_FIELDS: &[&str] = &["access", "token", "access_token"];
const REFRESH_TOKEN_FIELDS: &[&str] = &["refresh", "refresh_token"];
const ERROR_DETAIL_FIELDS: &[&str] = &["detail", "message", "error"];

/// Longest provider text carried into error details
const MAX_DETAIL_CHARS: usize = 200;

/// What one candidate endpoint did with the credentials
enum CandidateOutcome {
    Accepted(ProviderResponse),
    Rejected,
    Failed(ProviderResponse),
    Unreachable(TransportError),
}

/// Obtain an access token, trying each candidate endpoint in order
///
/// Each candidate gets a form-encoded request first and, unless the answer was
/// a success, 401 or 404, a JSON-encoded retry. The first 200/201 wins. A 401
/// stops the whole sequence.
///
/// # Errors
///
/// - `InvalidCredentials` on any 401
/// - `MalformedResponse` / `TokenMissing` for an unusable success body
/// - `ProviderError` with the most recent provider answer once candidates run
///   out, preferring any non-404 answer over a 404
/// - `NoEndpointReachable` when no candidate produced any HTTP response
pub async fn acquire_token(
    transport: &dyn HttpTransport,
    endpoints: &[String],
    credentials: &Credentials,
) -> Result<TokenResult, AuthError> {
    let mut last_response: Option<ProviderResponse> = None;
    let mut last_transport_error: Option<TransportError> = None;

    for url in endpoints {
        match attempt_candidate(transport, url, credentials).await {
            CandidateOutcome::Accepted(response) => return parse_token_response(url, &response),
            CandidateOutcome::Rejected => {
                LoggingHelper::log_credentials_rejected(url);
                return Err(AuthError::InvalidCredentials);
            }
            CandidateOutcome::Failed(response) => record_failure(&mut last_response, response),
            CandidateOutcome::Unreachable(error) => last_transport_error = Some(error),
        }
    }

    Err(exhausted(last_response, last_transport_error))
}

/// Keep the most recent provider answer, except that a 404 (endpoint absent)
/// never replaces a real error from another candidate
fn record_failure(last_response: &mut Option<ProviderResponse>, response: ProviderResponse) {
    let holds_real_error = last_response
        .as_ref()
        .is_some_and(|previous| previous.status != 404);
    if response.status != 404 || !holds_real_error {
        *last_response = Some(response);
    }
}

async fn attempt_candidate(
    transport: &dyn HttpTransport,
    url: &str,
    credentials: &Credentials,
) -> CandidateOutcome {
    let form = RequestBody::Form(vec![
        ("username".to_string(), credentials.identifier().to_string()),
        ("password".to_string(), credentials.secret().to_string()),
    ]);

    let form_response = match send(transport, url, form).await {
        Ok(response) => response,
        Err(error) => return CandidateOutcome::Unreachable(error),
    };

    match form_response.status {
        200 | 201 => return CandidateOutcome::Accepted(form_response),
        401 => return CandidateOutcome::Rejected,
        404 => return CandidateOutcome::Failed(form_response),
        status => LoggingHelper::log_json_fallback(url, status),
    }

    let body = RequestBody::Json(json!({
        "username": credentials.identifier(),
        "password": credentials.secret(),
    }));

    match send(transport, url, body).await {
        Ok(response) if response.is_success() => CandidateOutcome::Accepted(response),
        Ok(response) if response.status == 401 => CandidateOutcome::Rejected,
        Ok(response) => CandidateOutcome::Failed(response),
        // The endpoint did answer the form request; keep that answer
        Err(_) => CandidateOutcome::Failed(form_response),
    }
}

async fn send(
    transport: &dyn HttpTransport,
    url: &str,
    body: RequestBody,
) -> Result<ProviderResponse, TransportError> {
    let body_kind = body.kind();
    LoggingHelper::log_token_attempt(url, body_kind);

    match transport.send(ProviderRequest::post(url, body)).await {
        Ok(response) => {
            if !response.is_success() {
                LoggingHelper::log_token_status(url, body_kind, response.status);
            }
            Ok(response)
        }
        Err(error) => {
            LoggingHelper::log_transport_failure(url, &error);
            Err(error)
        }
    }
}

fn parse_token_response(url: &str, response: &ProviderResponse) -> Result<TokenResult, AuthError> {
    let body = response.json().ok_or_else(|| {
        AuthError::MalformedResponse(truncate_chars(response.body.trim(), MAX_DETAIL_CHARS))
    })?;

    let access_token = first_string(&body, ACCESS_TOKEN_FIELDS).ok_or(AuthError::TokenMissing)?;
    let refresh_token = first_string(&body, REFRESH_TOKEN_FIELDS);

    LoggingHelper::log_token_acquired(url, access_token.len(), refresh_token.is_some());
    Ok(TokenResult::new(access_token, refresh_token))
}

fn exhausted(
    last_response: Option<ProviderResponse>,
    last_transport_error: Option<TransportError>,
) -> AuthError {
    if let Some(response) = last_response {
        return AuthError::ProviderError {
            status: response.status,
            detail: provider_detail(&response),
        };
    }

    let reason = last_transport_error.map_or_else(
        || "no token endpoints configured".to_string(),
        |error| error.to_string(),
    );
    AuthError::NoEndpointReachable(truncate_chars(&reason, MAX_DETAIL_CHARS))
}

/// The provider's own explanation, or the status and a slice of the body
fn provider_detail(response: &ProviderResponse) -> String {
    let explained = response.json().and_then(|body| {
        ERROR_DETAIL_FIELDS.iter().find_map(|key| match body.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
    });

    match explained {
        Some(detail) => truncate_chars(&detail, MAX_DETAIL_CHARS),
        None if response.body.trim().is_empty() => format!("HTTP {}", response.status),
        None => format!(
            "HTTP {}: {}",
            response.status,
            truncate_chars(response.body.trim(), MAX_DETAIL_CHARS)
        ),
    }
}

fn first_string(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        body.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}
