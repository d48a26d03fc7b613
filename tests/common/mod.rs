#![allow(dead_code)]

use async_trait::async_trait;
use rds_iam_bootstrap::aws::{SecretStore, TokenSigner};
use rds_iam_bootstrap::config::BootstrapSettings;
use rds_iam_bootstrap::db::{AuthToken, ConnectParams, Connector, RoleName, Session, TlsPolicy};
use rds_iam_bootstrap::error::BootstrapError;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ADMIN_USER: &str = "postgres_admin";
pub const ADMIN_PASSWORD: &str = "x";
pub const IAM_USER: &str = "db_iam_user";
pub const SECRET_ID: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:aurora";

pub fn valid_secret_json() -> String {
    format!(
        r#"{{"host":"h","port":5432,"dbname":"main_db","username":"{ADMIN_USER}","password":"{ADMIN_PASSWORD}"}}"#
    )
}

pub fn settings(secret_id: Option<&str>) -> BootstrapSettings {
    BootstrapSettings {
        secret_id: secret_id.map(str::to_string),
        iam_user: RoleName::parse(IAM_USER).expect("valid role"),
        region: "us-east-1".to_string(),
        tls: TlsPolicy::AcceptInvalidCerts,
    }
}

pub struct FakeStore {
    value: Option<String>,
    calls: AtomicUsize,
}

impl FakeStore {
    pub fn with(value: Option<String>) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for FakeStore {
    async fn secret_string(&self, _secret_id: &str) -> Result<Option<String>, BootstrapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

pub struct FakeSigner {
    pub fail: bool,
}

#[async_trait]
impl TokenSigner for FakeSigner {
    async fn auth_token(
        &self,
        host: &str,
        port: u16,
        user: &RoleName,
    ) -> Result<AuthToken, BootstrapError> {
        if self.fail {
            return Err(BootstrapError::TokenSigning(
                "no credentials for region".to_string(),
            ));
        }
        Ok(AuthToken::new(
            format!("{host}:{port}/?Action=connect&DBUser={user}&X-Amz-Signature=fake"),
            chrono::Utc::now() + chrono::TimeDelta::minutes(15),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleRecord {
    pub iam_login: bool,
    pub privileges: BTreeSet<String>,
}

#[derive(Default)]
pub struct ClusterState {
    pub roles: HashMap<String, RoleRecord>,
    pub tables: Vec<String>,
    pub connections: Vec<ConnectParams>,
    pub open_sessions: usize,
    pub closed_sessions: usize,
    pub statements: usize,
    pub role_creations: usize,
    pub refuse_logins: HashSet<String>,
    pub fail_execute: bool,
    pub fail_list_tables: bool,
}

/// In-memory stand-in for the Aurora cluster. Understands only the
/// role-provisioning block and the table listing.
#[derive(Clone, Default)]
pub struct FakeCluster {
    pub state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        let cluster = Self::default();
        cluster.state().tables = vec!["accounts".to_string(), "pg_class".to_string()];
        cluster
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, ClusterState> {
        self.state.lock().expect("cluster state poisoned")
    }

    pub fn seed_role(&self, name: &str, record: RoleRecord) {
        self.state().roles.insert(name.to_string(), record);
    }
}

fn refused(msg: &str) -> sqlx::Error {
    sqlx::Error::Protocol(msg.to_string())
}

#[async_trait]
impl Connector for FakeCluster {
    type Session = FakeSession;

    async fn connect(&self, params: &ConnectParams) -> Result<FakeSession, sqlx::Error> {
        let mut state = self.state();
        state.connections.push(params.clone());

        if state.refuse_logins.contains(&params.username) {
            return Err(refused("connection refused"));
        }
        let authenticated = if params.username == ADMIN_USER {
            params.password == ADMIN_PASSWORD
        } else {
            state
                .roles
                .get(&params.username)
                .is_some_and(|r| r.iam_login)
                && params.password.contains("Action=connect")
        };
        if !authenticated {
            return Err(refused("password authentication failed"));
        }

        state.open_sessions += 1;
        Ok(FakeSession {
            cluster: self.clone(),
        })
    }
}

pub struct FakeSession {
    cluster: FakeCluster,
}

fn quoted_between<'a>(sql: &'a str, open: &str, close: char) -> Option<&'a str> {
    let start = sql.find(open)? + open.len();
    let len = sql[start..].find(close)?;
    Some(&sql[start..start + len])
}

#[async_trait]
impl Session for FakeSession {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        let mut state = self.cluster.state();
        state.statements += 1;
        if state.fail_execute {
            return Err(refused("permission denied to create role"));
        }

        let role = quoted_between(sql, "rolname = '", '\'')
            .ok_or_else(|| refused("unsupported statement"))?
            .to_string();
        if !sql.contains("IF NOT EXISTS") {
            return Err(refused("unguarded role creation"));
        }
        if state.roles.contains_key(&role) {
            return Ok(());
        }

        let privileges = if sql.contains(
            "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public",
        ) {
            ["SELECT", "INSERT", "UPDATE", "DELETE"]
                .iter()
                .map(|v| v.to_string())
                .collect()
        } else {
            BTreeSet::new()
        };
        state.roles.insert(
            role,
            RoleRecord {
                iam_login: sql.contains("GRANT rds_iam"),
                privileges,
            },
        );
        state.role_creations += 1;
        Ok(())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, sqlx::Error> {
        let state = self.cluster.state();
        if state.fail_list_tables {
            return Err(refused("permission denied for information_schema"));
        }
        Ok(state.tables.clone())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        let mut state = self.cluster.state();
        state.open_sessions -= 1;
        state.closed_sessions += 1;
        Ok(())
    }
}
