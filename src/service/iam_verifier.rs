use crate::aws::rds_signer::TokenSigner;
use crate::db::models::{DbSecret, RoleName, TlsPolicy};
use crate::db::postgres::{Connector, Session};
use crate::error::BootstrapError;
use tracing::{error, info, warn};

/// Sign an IAM auth token for `role`, log in with it and list tables.
///
/// Signing and connect failures propagate. Once connected, a failing query is
/// only logged, and the session is closed either way.
pub async fn verify_iam_connection<C, T>(
    connector: &C,
    signer: &T,
    secret: &DbSecret,
    role: &RoleName,
    tls: &TlsPolicy,
) -> Result<(), BootstrapError>
where
    C: Connector + ?Sized,
    T: TokenSigner + ?Sized,
{
    let token = signer.auth_token(&secret.host, secret.port, role).await?;
    info!(expires_at = %token.expires_at(), "retrieved IAM auth token");

    let params = secret.iam_params(role, &token, tls);
    let mut session = connector
        .connect(&params)
        .await
        .map_err(BootstrapError::Connectivity)?;
    info!(role = %role, "successfully connected to database as IAM user");

    match session.list_tables().await {
        Ok(tables) => info!(count = tables.len(), ?tables, "all tables in database"),
        Err(e) => error!(error = %BootstrapError::Connectivity(e), "error listing tables"),
    }

    info!("closing IAM database connection");
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close IAM database session");
    }
    Ok(())
}
