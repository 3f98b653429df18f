/// Authentication for the HTTP surface
///
/// - `jwt`: access token encoding and validation
/// - `credentials`: one-time codes, token pairs, rotation, and logout

pub mod credentials;
pub mod jwt;

pub use credentials::{AuthError, CredentialConfig, CredentialService, TokenPair};
