//! AWS collaborators: the secret store holding root credentials and the
//! SigV4 signer for IAM database auth tokens.

pub mod rds_signer;
pub mod secrets;

pub use rds_signer::{RdsIamSigner, TokenSigner};
pub use secrets::{SecretStore, SecretsManagerStore};
