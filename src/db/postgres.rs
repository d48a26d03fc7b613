use crate::db::models::{ConnectParams, TlsPolicy};
use crate::db::schema::LIST_TABLES;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{Connection, Executor, Row};

/// Opens single database sessions. One connection per session, no pooling.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    async fn connect(&self, params: &ConnectParams) -> Result<Self::Session, sqlx::Error>;
}

/// An open database session. Callers must `close` it on every exit path.
#[async_trait]
pub trait Session: Send {
    /// Run a statement (or `DO` block) with no result rows.
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error>;

    /// Names of every table visible through `information_schema.tables`.
    async fn list_tables(&mut self) -> Result<Vec<String>, sqlx::Error>;

    async fn close(self) -> Result<(), sqlx::Error>;
}

/// sqlx-backed Postgres connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn connect_options(params: &ConnectParams) -> PgConnectOptions {
    let opts = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.username)
        .password(&params.password)
        .database(&params.database)
        .ssl_mode(ssl_mode(&params.tls))
        .application_name("rds-iam-bootstrap");

    match &params.tls {
        TlsPolicy::VerifyFull {
            root_cert: Some(path),
        } => opts.ssl_root_cert(path),
        _ => opts,
    }
}

/// `Require` encrypts without checking the certificate; `VerifyFull` checks
/// chain and hostname.
fn ssl_mode(tls: &TlsPolicy) -> PgSslMode {
    match tls {
        TlsPolicy::AcceptInvalidCerts => PgSslMode::Require,
        TlsPolicy::VerifyFull { .. } => PgSslMode::VerifyFull,
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, params: &ConnectParams) -> Result<PgSession, sqlx::Error> {
        let conn = PgConnection::connect_with(&connect_options(params)).await?;
        Ok(PgSession { conn })
    }
}

pub struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl Session for PgSession {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        // Simple-query protocol: `DO` blocks cannot be prepared.
        self.conn.execute(sql).await?;
        Ok(())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(LIST_TABLES).fetch_all(&mut self.conn).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect()
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}
