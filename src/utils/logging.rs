// Centralized logging for the SUAP adapter so token values and passwords
// never end up in log lines by accident
use log::{debug, info, warn};

use crate::suap::TransportError;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log settings file source
    pub fn log_settings_loaded(source: &std::path::Path) {
        info!("✓ Loaded SUAP settings from {}", source.display());
    }

    /// Log that the host installed its own logger first
    pub fn log_existing_logger() {
        debug!("Logger already installed; keeping the host's logger");
    }

    /// Log the provider configuration in use
    pub fn log_provider_configuration(base_url: &str, token_candidates: usize, profile_candidates: usize, timeout_secs: u64) {
        info!(
            "🔧 SUAP provider {} ({} token endpoints, {} profile endpoints, timeout {}s)",
            base_url, token_candidates, profile_candidates, timeout_secs
        );
    }

    /// Log a token request attempt
    pub fn log_token_attempt(url: &str, body_kind: &str) {
        debug!("🔄 Requesting token from {} ({} body)", url, body_kind);
    }

    /// Log a non-success token response
    pub fn log_token_status(url: &str, body_kind: &str, status: u16) {
        debug!("Token endpoint {} answered HTTP {} to {} body", url, status, body_kind);
    }

    /// Log the switch from form to JSON submission
    pub fn log_json_fallback(url: &str, status: u16) {
        debug!("Retrying {} with JSON body after HTTP {}", url, status);
    }

    /// Log rejected credentials
    pub fn log_credentials_rejected(url: &str) {
        info!("❌ SUAP rejected credentials at {}", url);
    }

    /// Log a transport failure for one candidate
    pub fn log_transport_failure(url: &str, error: &TransportError) {
        warn!("⚠️  SUAP endpoint {} unreachable: {}", url, error);
    }

    /// Log a successful token acquisition
    pub fn log_token_acquired(url: &str, access_token_len: usize, has_refresh: bool) {
        info!(
            "✅ Token acquired from {}: access_token={} chars, refresh_token={}",
            url,
            access_token_len,
            if has_refresh { "present" } else { "missing" }
        );
    }

    /// Log a profile candidate that did not produce a usable body
    pub fn log_profile_candidate_failed(url: &str, reason: &str) {
        debug!("Profile endpoint {} skipped: {}", url, reason);
    }

    /// Log a fetched profile
    pub fn log_profile_fetched(url: &str, field_count: usize) {
        info!("✅ Profile fetched from {} ({} fields)", url, field_count);
    }

    /// Log that no profile endpoint answered
    pub fn log_profile_unavailable(candidates: usize) {
        warn!("⚠️  No profile endpoint answered ({} candidates tried)", candidates);
    }

    /// Log the classification result
    pub fn log_classification(registration: &str, is_student: bool, rule: &str) {
        info!(
            "🎯 Classified {} as {} ({})",
            registration,
            if is_student { "active student" } else { "not authorized" },
            rule
        );
    }
}
