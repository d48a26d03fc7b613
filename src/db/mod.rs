//! Database module: secret-derived connection models, SQL text and the
//! Postgres session seam.
//!
//! Layout:
//! - `models.rs`: secret record, connection parameters, role names, auth tokens
//! - `schema.rs`: SQL issued against the cluster
//! - `postgres.rs`: `Connector`/`Session` traits and the sqlx implementation

pub mod models;
pub mod postgres;
pub mod schema;

pub use models::{AuthToken, ConnectParams, DbSecret, RoleName, TlsPolicy};
pub use postgres::{Connector, PgConnector, PgSession, Session};
