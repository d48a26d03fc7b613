use crate::db::models::{ConnectParams, RoleName};
use crate::db::postgres::{Connector, Session};
use crate::db::schema::ensure_iam_role_sql;
use crate::error::BootstrapError;
use tracing::{error, info, warn};

/// Make sure `role` exists as an IAM-authenticated login with the fixed grant
/// set, using an administrative password session.
///
/// Best effort: failures are logged and swallowed so the IAM connectivity
/// check still runs. Returns `true` only when the statement completed; callers
/// must not treat a `false` as fatal.
pub async fn ensure_iam_role<C>(connector: &C, admin: &ConnectParams, role: &RoleName) -> bool
where
    C: Connector + ?Sized,
{
    match try_ensure_iam_role(connector, admin, role).await {
        Ok(()) => {
            info!(role = %role, "ensured IAM user exists with correct privileges");
            true
        }
        Err(e) => {
            error!(role = %role, error = %e, "error creating IAM user");
            false
        }
    }
}

/// Strict variant of [`ensure_iam_role`]: the admin session is closed on every
/// path once opened, and the first error is returned.
pub async fn try_ensure_iam_role<C>(
    connector: &C,
    admin: &ConnectParams,
    role: &RoleName,
) -> Result<(), BootstrapError>
where
    C: Connector + ?Sized,
{
    let mut session = connector
        .connect(admin)
        .await
        .map_err(BootstrapError::Provisioning)?;
    info!(
        host = %admin.host,
        username = %admin.username,
        "connected to database as root user"
    );

    let outcome = session.execute(&ensure_iam_role_sql(role)).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close root database session");
    }

    outcome.map_err(BootstrapError::Provisioning)
}
