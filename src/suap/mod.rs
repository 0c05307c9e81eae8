//! SUAP identity adapter
//!
//! This module turns a registration/password pair into an authorization
//! decision: token acquisition against a list of candidate endpoints, profile
//! retrieval, normalization of the provider's drifting JSON shapes, and the
//! active-student classification.

pub mod classify;
pub mod errors;
pub mod normalize;
pub mod profile;
pub mod service;
pub mod session;
pub mod token;
pub mod transport;

pub use classify::{classify, classify_raw, explain, Classification, ClassificationPolicy, DecidingRule};
pub use errors::AuthError;
pub use normalize::{
    normalize, normalize_with_origin, Affiliation, AffiliationField, NormalizedProfile,
    DEFAULT_PROVIDER_ORIGIN,
};
pub use profile::fetch_profile;
pub use service::SuapClient;
pub use session::SuapSession;
pub use token::acquire_token;
pub use transport::{
    HttpTransport, ProviderRequest, ProviderResponse, ReqwestTransport, RequestBody,
    TransportError,
};
