//! Profile retrieval from the provider's "my data" endpoints

use serde_json::Value;

use super::transport::{HttpTransport, ProviderRequest};
use crate::utils::logging::LoggingHelper;

/// Fetch the caller's raw profile with a bearer token
///
/// Each candidate is tried once, in order. The first 200 answer whose body is
/// a JSON object wins. Returns `None` when no candidate produced one; the
/// token is still valid in that case and the lookup can be retried later.
pub async fn fetch_profile(
    transport: &dyn HttpTransport,
    endpoints: &[String],
    access_token: &str,
) -> Option<Value> {
    for url in endpoints {
        let request = ProviderRequest::get_with_bearer(url, access_token);

        let response = match transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                LoggingHelper::log_transport_failure(url, &error);
                continue;
            }
        };

        if response.status != 200 {
            LoggingHelper::log_profile_candidate_failed(url, &format!("HTTP {}", response.status));
            continue;
        }

        match response.json() {
            Some(Value::Object(fields)) => {
                LoggingHelper::log_profile_fetched(url, fields.len());
                return Some(Value::Object(fields));
            }
            Some(_) => LoggingHelper::log_profile_candidate_failed(url, "body is not a JSON object"),
            None => LoggingHelper::log_profile_candidate_failed(url, "body is not JSON"),
        }
    }

    LoggingHelper::log_profile_unavailable(endpoints.len());
    None
}
