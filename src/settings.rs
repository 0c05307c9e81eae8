use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::suap::normalize::DEFAULT_PROVIDER_ORIGIN;
use crate::suap::ClassificationPolicy;
use crate::utils::logging::LoggingHelper;

const SETTINGS_FILE: &str = "Settings.toml";
const SECRETS_DIR_ENV: &str = "SUAP_AUTH_SECRETS_DIR";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] basic_toml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SuapSettings {
    pub provider: ProviderSettings,
    pub classification: ClassificationPolicy,
    pub access: AccessSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider origin; also used to absolutize relative photo paths
    pub base_url: String,
    /// Token endpoints in the order they are tried. Relative entries are
    /// joined to `base_url`.
    pub token_endpoints: Vec<String>,
    /// "My data" endpoints in the order they are tried
    pub profile_endpoints: Vec<String>,
    /// Bound on every outbound request
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AccessSettings {
    /// Registrations with administrator rights in the marketplace
    pub admin_registrations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_ORIGIN.to_string(),
            token_endpoints: [
                "/api/token/pair",
                "/api/v2/autenticacao/token/",
                "/api/autenticacao/token/",
            ]
            .map(String::from)
            .to_vec(),
            profile_endpoints: [
                "/api/rh/eu/",
                "/api/ensino/meus-dados-aluno/",
                "/api/rh/meus-dados/",
                "/api/v2/rh/eu/",
                "/api/v2/ensino/meus-dados-aluno/",
                "/api/v2/rh/meus-dados/",
            ]
            .map(String::from)
            .to_vec(),
            timeout_seconds: 15,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SuapSettings {
    /// Load settings from configuration files and environment variables,
    /// then install `env_logger` unless the host already has a logger
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub fn load() -> Result<Self, SettingsError> {
        // A missing .env file is the normal case outside development
        let _ = dotenvy::dotenv();

        let (mut settings, source) = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        if env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
        )
        .try_init()
        .is_err()
        {
            LoggingHelper::log_existing_logger();
        }

        if let Some(path) = source {
            LoggingHelper::log_settings_loaded(&path);
        }
        LoggingHelper::log_provider_configuration(
            &settings.provider.base_url,
            settings.provider.token_endpoints.len(),
            settings.provider.profile_endpoints.len(),
            settings.provider.timeout().as_secs(),
        );

        Ok(settings)
    }

    /// Parse settings from a TOML file, without environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&content)?)
    }

    /// Load base settings with the following priority (highest to lowest):
    /// 1. Settings.toml in `SUAP_AUTH_SECRETS_DIR` (if set and present)
    /// 2. Settings.toml in the current directory
    /// 3. Defaults
    fn load_base_settings() -> Result<(Self, Option<PathBuf>), SettingsError> {
        if let Ok(secrets_dir) = std::env::var(SECRETS_DIR_ENV) {
            let secrets_path = Path::new(&secrets_dir).join(SETTINGS_FILE);
            if secrets_path.exists() {
                return Ok((Self::from_file(&secrets_path)?, Some(secrets_path)));
            }
        }

        let local_path = PathBuf::from(SETTINGS_FILE);
        if local_path.exists() {
            return Ok((Self::from_file(&local_path)?, Some(local_path)));
        }

        Ok((Self::default(), None))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_provider_env_overrides(&mut settings.provider);
        Self::apply_classification_env_overrides(&mut settings.classification);
        Self::apply_access_env_overrides(&mut settings.access);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_provider_env_overrides(provider: &mut ProviderSettings) {
        if let Ok(base_url) = std::env::var("SUAP_API_BASE_URL") {
            provider.base_url = base_url.trim().to_string();
        }
        if let Ok(endpoints) = std::env::var("SUAP_TOKEN_ENDPOINTS") {
            provider.token_endpoints = split_list(&endpoints);
        }
        if let Ok(endpoints) = std::env::var("SUAP_PROFILE_ENDPOINTS") {
            provider.profile_endpoints = split_list(&endpoints);
        }
        if let Ok(timeout) = std::env::var("SUAP_TIMEOUT_SECONDS") {
            match timeout.trim().parse() {
                Ok(seconds) => provider.timeout_seconds = seconds,
                Err(_) => log::warn!("Ignoring invalid SUAP_TIMEOUT_SECONDS value: {timeout}"),
            }
        }
    }

    fn apply_classification_env_overrides(policy: &mut ClassificationPolicy) {
        if let Ok(value) = std::env::var("SUAP_ALLOW_UNRECOGNIZED") {
            match parse_bool(&value) {
                Some(allow) => policy.allow_unrecognized = allow,
                None => log::warn!("Ignoring invalid SUAP_ALLOW_UNRECOGNIZED value: {value}"),
            }
        }
    }

    fn apply_access_env_overrides(access: &mut AccessSettings) {
        if let Ok(registrations) = std::env::var("ADMIN_MATRICULAS") {
            access.admin_registrations = split_list(&registrations);
        }
    }

    fn apply_logging_env_overrides(logging: &mut LoggingSettings) {
        if let Ok(level) = std::env::var("RUST_LOG") {
            logging.level = level;
        }
    }

    /// Whether the registration belongs to a marketplace administrator
    #[must_use]
    pub fn is_admin(&self, registration: &str) -> bool {
        self.access.is_admin(registration)
    }
}

impl ProviderSettings {
    /// Absolute token endpoint URLs in try order
    #[must_use]
    pub fn token_urls(&self) -> Vec<String> {
        self.resolve_all(&self.token_endpoints)
    }

    /// Absolute profile endpoint URLs in try order
    #[must_use]
    pub fn profile_urls(&self) -> Vec<String> {
        self.resolve_all(&self.profile_endpoints)
    }

    /// Per-request timeout, never below one second
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    fn resolve_all(&self, endpoints: &[String]) -> Vec<String> {
        endpoints
            .iter()
            .map(|endpoint| resolve_endpoint(&self.base_url, endpoint))
            .collect()
    }
}

impl AccessSettings {
    #[must_use]
    pub fn is_admin(&self, registration: &str) -> bool {
        let registration = registration.trim();
        !registration.is_empty() && self.admin_registrations.iter().any(|r| r.trim() == registration)
    }
}

/// Join a relative endpoint to the provider origin; absolute URLs pass through
fn resolve_endpoint(base_url: &str, endpoint: &str) -> String {
    if url::Url::parse(endpoint).is_ok_and(|u| matches!(u.scheme(), "http" | "https")) {
        return endpoint.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
