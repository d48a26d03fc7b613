use crate::error::BootstrapError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Root credentials stored by the database secret (RDS-managed layout).
#[derive(Clone, Deserialize, PartialEq)]
pub struct DbSecret {
    pub host: String,
    #[serde(deserialize_with = "deserialize_port_lax")]
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSecret")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DbSecret {
    /// Parameters for the administrative (password) session.
    pub fn admin_params(&self, tls: &TlsPolicy) -> ConnectParams {
        ConnectParams {
            host: self.host.clone(),
            port: self.port,
            database: self.dbname.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            tls: tls.clone(),
        }
    }

    /// Parameters for a session that logs in as `role` using an IAM auth token.
    pub fn iam_params(&self, role: &RoleName, token: &AuthToken, tls: &TlsPolicy) -> ConnectParams {
        ConnectParams {
            host: self.host.clone(),
            port: self.port,
            database: self.dbname.clone(),
            username: role.as_str().to_string(),
            password: token.value().to_string(),
            tls: tls.clone(),
        }
    }
}

fn deserialize_port_lax<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::Number(n) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("port out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u16>()
            .map_err(|e| serde::de::Error::custom(format!("invalid port {s:?}: {e}"))),
        _ => Err(serde::de::Error::custom(
            "expected a number or a numeric string for port",
        )),
    }
}

/// Certificate handling for database sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Encrypt, but accept any server certificate and hostname.
    AcceptInvalidCerts,
    /// Encrypt and verify the certificate chain and hostname.
    ///
    /// RDS server certificates chain to the Amazon RDS CAs, which are not in
    /// the bundled webpki roots; `root_cert` points at the RDS CA bundle.
    VerifyFull { root_cert: Option<PathBuf> },
}

#[derive(Clone, PartialEq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub tls: TlsPolicy,
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .finish()
    }
}

/// A Postgres role name that is safe to splice into DDL.
///
/// Role DDL cannot take bind parameters, so names are restricted to plain
/// identifiers and always emitted quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleName(String);

const MAX_IDENTIFIER_LEN: usize = 63;

impl RoleName {
    pub fn parse(name: &str) -> Result<Self, BootstrapError> {
        let name = name.trim();
        let mut chars = name.chars();
        let valid_head = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

        if !valid_head || !valid_tail || name.len() > MAX_IDENTIFIER_LEN {
            return Err(BootstrapError::Configuration(format!(
                "invalid database role name {name:?}"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"name"`, for identifier positions.
    pub fn quoted_ident(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// `'name'`, for literal positions such as the `pg_roles` lookup.
    pub fn quoted_literal(&self) -> String {
        format!("'{}'", self.0)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short-lived IAM database auth token, used once as a password.
#[derive(Clone)]
pub struct AuthToken {
    value: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl AuthToken {
    pub fn new(value: String, expires_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
