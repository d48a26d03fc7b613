use crate::error::BootstrapError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client as SecretsClient;
use aws_sdk_secretsmanager::config::Builder as SecretsConfigBuilder;
use aws_sdk_secretsmanager::config::retry::RetryConfig;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use tracing::debug;

/// Read access to a secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Current `SecretString` for `secret_id`, or `None` when the secret has no
    /// string value (e.g. binary-only secrets).
    async fn secret_string(&self, secret_id: &str) -> Result<Option<String>, BootstrapError>;
}

/// AWS Secrets Manager backed store.
#[derive(Clone)]
pub struct SecretsManagerStore {
    client: SecretsClient,
}

impl SecretsManagerStore {
    /// Build the client from the shared SDK config with retries disabled; a
    /// failed lookup fails the invocation and the trigger owns retry policy.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let config = SecretsConfigBuilder::from(sdk_config)
            .retry_config(RetryConfig::disabled())
            .build();
        Self {
            client: SecretsClient::from_conf(config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, secret_id: &str) -> Result<Option<String>, BootstrapError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                BootstrapError::Retrieval(format!(
                    "GetSecretValue for {secret_id} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        debug!(
            secret_id,
            version_id = output.version_id().unwrap_or("<unknown>"),
            "fetched secret value"
        );
        Ok(output.secret_string().map(str::to_string))
    }
}
