use crate::aws::rds_signer::TokenSigner;
use crate::aws::secrets::SecretStore;
use crate::config::BootstrapSettings;
use crate::db::postgres::Connector;
use crate::error::BootstrapError;
use crate::service::credential_loader::load_db_secret;
use crate::service::iam_verifier::verify_iam_connection;
use crate::service::role_provisioner::ensure_iam_role;
use lambda_runtime::LambdaEvent;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

pub const SUCCESS_MESSAGE: &str = "IAM user created and connected successfully.";

/// Lambda proxy-style response; `body` is a JSON document encoded as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub status_code: u16,
    pub body: String,
}

impl BootstrapResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: json!({ "message": SUCCESS_MESSAGE }).to_string(),
        }
    }
}

/// Collaborators for one bootstrap run.
pub struct Bootstrapper<S, C, T> {
    pub store: S,
    pub connector: C,
    pub signer: T,
    pub settings: BootstrapSettings,
}

impl<S, C, T> Bootstrapper<S, C, T>
where
    S: SecretStore,
    C: Connector,
    T: TokenSigner,
{
    pub fn new(store: S, connector: C, signer: T, settings: BootstrapSettings) -> Self {
        Self {
            store,
            connector,
            signer,
            settings,
        }
    }

    /// Load credentials, provision the IAM role (best effort), then prove the
    /// IAM login works. Retrieval, signing and IAM connect failures abort.
    pub async fn run(&self, event: &Value) -> Result<BootstrapResponse, BootstrapError> {
        info!(%event, "received event");
        let settings = &self.settings;

        let secret = load_db_secret(&self.store, settings.secret_id.as_deref()).await?;

        let admin = secret.admin_params(&settings.tls);
        if ensure_iam_role(&self.connector, &admin, &settings.iam_user).await {
            info!(
                role = %settings.iam_user,
                "ensured IAM user exists and connected successfully using username and password"
            );
        } else {
            warn!(
                role = %settings.iam_user,
                "IAM user provisioning not confirmed; continuing with IAM connectivity check"
            );
        }

        verify_iam_connection(
            &self.connector,
            &self.signer,
            &secret,
            &settings.iam_user,
            &settings.tls,
        )
        .await?;
        info!("successful connection to database with IAM user");

        Ok(BootstrapResponse::success())
    }

    /// `lambda_runtime` entry point.
    pub async fn handle(
        &self,
        event: LambdaEvent<Value>,
    ) -> Result<BootstrapResponse, lambda_runtime::Error> {
        let (payload, context) = event.into_parts();
        info!(request_id = %context.request_id, "bootstrap invocation started");
        Ok(self.run(&payload).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_shape() {
        let resp = BootstrapResponse::success();
        let json = serde_json::to_value(&resp).expect("serializes");
        assert_eq!(
            json,
            json!({
                "statusCode": 200,
                "body": "{\"message\":\"IAM user created and connected successfully.\"}"
            })
        );
    }
}
