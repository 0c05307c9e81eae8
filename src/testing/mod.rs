//! Testing utilities for suap-auth
//!
//! ## Organization
//!
//! - [`fixtures`] - Sample provider payloads and settings pointing at a test origin
//! - [`mock`] - Scripted [`HttpTransport`](crate::suap::HttpTransport) for
//!   exercising the candidate-endpoint logic without a network
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use suap_auth::testing::{fixtures::TestFixtures, mock::ScriptedTransport};
//! use suap_auth::SuapClient;
//!
//! let transport = ScriptedTransport::new()
//!     .respond(&TestFixtures::token_url(0), 200, TestFixtures::token_body());
//! let client = SuapClient::with_transport(&TestFixtures::settings(), Arc::new(transport));
//! # let _ = client;
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::ScriptedTransport;

/// Common test constants
pub mod constants {
    /// Origin every fixture endpoint lives under
    pub const TEST_ORIGIN: &str = "https://suap.test";

    /// Registration used by the sample profiles
    pub const TEST_REGISTRATION: &str = "20231041110013";

    /// Password accepted by scripted token endpoints
    pub const TEST_PASSWORD: &str = "senha-de-teste";
}
