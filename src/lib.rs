#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the suap-auth library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod models;
pub mod settings;
pub mod suap;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use models::{AuthenticationOutcome, Credentials, TokenResult, UserRecord};
pub use settings::SuapSettings;
pub use suap::{
    classify, normalize, AffiliationField, AuthError, ClassificationPolicy, NormalizedProfile,
    SuapClient, SuapSession,
};
