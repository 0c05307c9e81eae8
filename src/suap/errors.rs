//! Error types for the SUAP adapter

use thiserror::Error;

use crate::models::TokenResult;

/// Errors that can end a login attempt
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration or password was blank
    #[error("registration and password are required")]
    EmptyCredentials,

    /// The provider rejected the credentials (HTTP 401)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Every candidate token endpoint failed at the transport level
    #[error("no token endpoint reachable: {0}")]
    NoEndpointReachable(String),

    /// A 200/201 token response whose body is not JSON
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// A JSON token response without any known token field
    #[error("token not found in provider response")]
    TokenMissing,

    /// Any other provider status
    #[error("provider error (HTTP {status}): {detail}")]
    ProviderError { status: u16, detail: String },

    /// Token acquired but no profile endpoint answered; the token is kept so
    /// the caller can retry the profile lookup later
    #[error("profile unavailable")]
    ProfileUnavailable(TokenResult),
}

impl AuthError {
    /// Short message suitable for showing on the login page
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AuthError::EmptyCredentials => "Preencha matrícula e senha.".to_string(),
            AuthError::InvalidCredentials => {
                "Credenciais inválidas. Verifique sua matrícula e senha.".to_string()
            }
            AuthError::NoEndpointReachable(reason) => {
                if reason.starts_with("timeout") {
                    "O servidor SUAP demorou muito para responder. Tente novamente.".to_string()
                } else if reason.starts_with("tls") {
                    "Erro de certificado SSL. Verifique sua conexão.".to_string()
                } else {
                    "Não foi possível conectar ao servidor SUAP. Verifique sua conexão com a internet."
                        .to_string()
                }
            }
            AuthError::MalformedResponse(_) => "Resposta inválida do SUAP.".to_string(),
            AuthError::TokenMissing => "Token não encontrado na resposta do SUAP.".to_string(),
            AuthError::ProviderError { detail, .. } => format!("Erro ao autenticar: {detail}"),
            AuthError::ProfileUnavailable(_) => {
                "Não foi possível obter os dados do usuário.".to_string()
            }
        }
    }

    /// Whether the same request may succeed if repeated later
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::NoEndpointReachable(_)
                | AuthError::ProfileUnavailable(_)
                | AuthError::ProviderError { status: 500..=599, .. }
        )
    }
}
