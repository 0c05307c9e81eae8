//! Test fixtures providing sample provider payloads
//!
//! The profile payloads follow the layouts the provider is known to return
//! from its different "my data" endpoints.

use serde_json::{json, Value};

use super::constants::{TEST_ORIGIN, TEST_REGISTRATION};
use crate::settings::{ProviderSettings, SuapSettings};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Default settings re-pointed at the test origin
    #[must_use]
    pub fn settings() -> SuapSettings {
        SuapSettings {
            provider: ProviderSettings {
                base_url: TEST_ORIGIN.to_string(),
                ..ProviderSettings::default()
            },
            ..SuapSettings::default()
        }
    }

    /// Absolute URL of the n-th default token endpoint
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the default candidate list.
    #[must_use]
    pub fn token_url(index: usize) -> String {
        Self::settings().provider.token_urls()[index].clone()
    }

    /// Absolute URL of the n-th default profile endpoint
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the default candidate list.
    #[must_use]
    pub fn profile_url(index: usize) -> String {
        Self::settings().provider.profile_urls()[index].clone()
    }

    /// Token pair body in the current API's shape
    #[must_use]
    pub fn token_body() -> &'static str {
        r#"{"access":"access-token","refresh":"refresh-token"}"#
    }

    /// Employee-style record with a single nested `vinculo` for an active student
    #[must_use]
    pub fn student_profile() -> Value {
        json!({
            "id": 123_456,
            "matricula": TEST_REGISTRATION,
            "nome_usual": "Maria Souza",
            "nome_registro": "Maria Aparecida de Souza",
            "tipo_vinculo": "Aluno",
            "url_foto_75x100": "/media/alunos/75x100/maria.jpg",
            "url_foto_150x200": "/media/alunos/150x200/maria.jpg",
            "vinculo": {
                "matricula": TEST_REGISTRATION,
                "curso": {
                    "codigo": "04404",
                    "nome": "Tecnologia em Redes de Computadores"
                },
                "campus": {"sigla": "CNAT", "nome": "Natal-Central"},
                "situacao": "Matriculado"
            }
        })
    }

    /// Same student after the enrollment was cancelled
    #[must_use]
    pub fn cancelled_student_profile() -> Value {
        let mut profile = Self::student_profile();
        profile["vinculo"]["situacao"] = json!("Cancelado");
        profile
    }

    /// Flat record from the student endpoint: no `vinculo` wrapper at all
    #[must_use]
    pub fn flat_student_profile() -> Value {
        json!({
            "matricula": TEST_REGISTRATION,
            "nome_social": "Alex",
            "nome": "Alexandre Lima",
            "curso": "Técnico em Informática",
            "campus": {"nome": "Parnamirim"},
            "situacao": "Trancado",
            "foto": "media/alunos/alex.jpg"
        })
    }

    /// Staff record listing several affiliations
    #[must_use]
    pub fn staff_profile() -> Value {
        json!({
            "matricula": "1234567",
            "primeiro_nome": "Carlos",
            "ultimo_nome": "Pereira",
            "foto": "https://cdn.suap.test/fotos/carlos.jpg",
            "vinculo": [
                {"tipo": "Servidor", "setor": "COTED", "situacao": "Ativo"},
                {"tipo": "Prestador de Serviço", "situacao": "Ativo"}
            ]
        })
    }
}
