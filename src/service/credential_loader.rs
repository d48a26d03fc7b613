use crate::aws::secrets::SecretStore;
use crate::db::models::DbSecret;
use crate::error::BootstrapError;
use tracing::info;

/// Load the database root credentials from the secret store.
///
/// A missing identifier fails before the store is contacted. No retries.
pub async fn load_db_secret<S>(
    store: &S,
    secret_id: Option<&str>,
) -> Result<DbSecret, BootstrapError>
where
    S: SecretStore + ?Sized,
{
    let secret_id = secret_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BootstrapError::Configuration("SECRET_ARN is not defined".to_string()))?;

    let raw = store
        .secret_string(secret_id)
        .await?
        .ok_or_else(|| {
            BootstrapError::Retrieval(format!("No SecretString returned for {secret_id}"))
        })?;

    let secret = parse_secret(&raw)?;
    info!(
        host = %secret.host,
        port = secret.port,
        dbname = %secret.dbname,
        username = %secret.username,
        "loaded database credentials"
    );
    Ok(secret)
}

fn parse_secret(raw: &str) -> Result<DbSecret, BootstrapError> {
    Ok(serde_json::from_str(raw)?)
}
