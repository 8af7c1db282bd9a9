//! Authentication: credential and token caches, token acquisition
//!
//! The two stores own the only state that outlives an invocation. Token
//! validity is decided locally from the stored expiry; a 401 from the
//! service clears both stores so the next run starts clean.

pub mod credentials;
pub mod store;
pub mod token;

pub use credentials::{ensure_credentials, optional_credentials, pair_credentials};
pub use store::{CredentialStore, StoredCredentials, StoredToken, TokenStore};
pub use token::{acquire_bearer_token, select_token, TokenSource};
