use crate::db::models::{RoleName, TlsPolicy};
use crate::error::BootstrapError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_IAM_USER: &str = "iam_user_not_set";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Handler configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Database role that authenticates through IAM.
    /// Env: `DB_IAM_USER`. Default: `iam_user_not_set`.
    pub db_iam_user: String,

    /// Secrets Manager identifier (ARN or name) holding the root credentials.
    /// Env: `SECRET_ARN`. Required at invocation time, not at cold start.
    pub secret_arn: Option<String>,

    /// Region used to sign IAM auth tokens.
    /// Env: `REGION`. Default: `us-east-1`.
    pub region: String,

    /// Log level for tracing subscriber initialization when `RUST_LOG` is unset.
    /// Env: `LOGLEVEL`. Default: `info`.
    pub loglevel: String,

    /// Encrypt database sessions without validating the server certificate.
    /// Env: `DB_TLS_ACCEPT_INVALID_CERTS`. Default: `true`.
    /// Insecure; set to `false` to require certificate and hostname verification.
    pub db_tls_accept_invalid_certs: bool,

    /// PEM bundle of the Amazon RDS certificate authorities, used when
    /// certificate verification is on.
    /// Env: `DB_SSL_ROOT_CERT`. Example: `/opt/certs/global-bundle.pem`. Default: unset.
    pub db_ssl_root_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_iam_user: DEFAULT_IAM_USER.to_string(),
            secret_arn: None,
            region: DEFAULT_REGION.to_string(),
            loglevel: "info".to_string(),
            db_tls_accept_invalid_certs: true,
            db_ssl_root_cert: None,
        }
    }
}

impl Config {
    /// Builds a Figment that merges defaults and environment variables.
    /// Uses raw env mapping, so field names map to env vars in UPPER_SNAKE_CASE.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::raw())
    }

    /// Loads configuration from the environment (with defaults).
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, BootstrapError> {
        Ok(figment.extract()?)
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        if self.db_tls_accept_invalid_certs {
            TlsPolicy::AcceptInvalidCerts
        } else {
            TlsPolicy::VerifyFull {
                root_cert: self.db_ssl_root_cert.clone(),
            }
        }
    }

    /// Resolves the per-invocation settings passed into the bootstrap flow.
    pub fn bootstrap_settings(&self) -> Result<BootstrapSettings, BootstrapError> {
        Ok(BootstrapSettings {
            secret_id: self
                .secret_arn
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            iam_user: RoleName::parse(&self.db_iam_user)?,
            region: self.region.clone(),
            tls: self.tls_policy(),
        })
    }
}

/// Explicit inputs for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    pub secret_id: Option<String>,
    pub iam_user: RoleName,
    pub region: String,
    pub tls: TlsPolicy,
}
