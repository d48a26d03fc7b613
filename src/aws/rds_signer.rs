use crate::db::models::{AuthToken, RoleName};
use crate::error::BootstrapError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::{Duration, SystemTime};
use tracing::debug;
use url::Url;

/// Lifetime RDS accepts for IAM auth tokens.
pub const TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

const SIGNING_NAME: &str = "rds-db";

/// Produces IAM database auth tokens.
#[async_trait]
pub trait TokenSigner: Send + Sync {
    async fn auth_token(
        &self,
        host: &str,
        port: u16,
        user: &RoleName,
    ) -> Result<AuthToken, BootstrapError>;
}

/// Signs tokens locally with the ambient AWS credential chain. No request is
/// made to the database or to RDS.
#[derive(Clone)]
pub struct RdsIamSigner {
    credentials: Option<SharedCredentialsProvider>,
    region: String,
}

impl RdsIamSigner {
    pub fn new(sdk_config: &SdkConfig, region: impl Into<String>) -> Self {
        Self {
            credentials: sdk_config.credentials_provider(),
            region: region.into(),
        }
    }

    pub fn with_provider(
        provider: impl ProvideCredentials + 'static,
        region: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Some(SharedCredentialsProvider::new(provider)),
            region: region.into(),
        }
    }
}

#[async_trait]
impl TokenSigner for RdsIamSigner {
    async fn auth_token(
        &self,
        host: &str,
        port: u16,
        user: &RoleName,
    ) -> Result<AuthToken, BootstrapError> {
        let provider = self.credentials.as_ref().ok_or_else(|| {
            BootstrapError::TokenSigning("no AWS credentials provider configured".to_string())
        })?;
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| BootstrapError::TokenSigning(format!("resolving credentials: {e}")))?;

        let now = SystemTime::now();
        let value = presign_token(&credentials, &self.region, host, port, user, now)?;
        let token = AuthToken::new(value, expiry_of(now));
        debug!(
            host,
            port,
            user = %user,
            expires_at = %token.expires_at(),
            "signed IAM auth token"
        );
        Ok(token)
    }
}

fn expiry_of(signed_at: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(signed_at) + TimeDelta::seconds(TOKEN_TTL.as_secs() as i64)
}

/// SigV4 query-string presign of `https://{host}:{port}/?Action=connect&DBUser={user}`.
/// The token is that URL without its scheme.
pub fn presign_token(
    credentials: &Credentials,
    region: &str,
    host: &str,
    port: u16,
    user: &RoleName,
    signed_at: SystemTime,
) -> Result<String, BootstrapError> {
    if region.trim().is_empty() {
        return Err(BootstrapError::TokenSigning(
            "signing region is empty".to_string(),
        ));
    }

    let mut url = Url::parse(&format!("https://{host}:{port}/"))
        .map_err(|e| BootstrapError::TokenSigning(format!("invalid endpoint {host}:{port}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("Action", "connect")
        .append_pair("DBUser", user.as_str());

    let identity = credentials.clone().into();
    let mut settings = SigningSettings::default();
    settings.expires_in = Some(TOKEN_TTL);
    settings.signature_location = SignatureLocation::QueryParams;

    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_NAME)
        .time(signed_at)
        .settings(settings)
        .build()
        .map_err(|e| BootstrapError::TokenSigning(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        "GET",
        url.as_str(),
        std::iter::empty(),
        SignableBody::Bytes(&[]),
    )
    .map_err(|e| BootstrapError::TokenSigning(e.to_string()))?;
    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| BootstrapError::TokenSigning(e.to_string()))?
        .into_parts();

    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in instructions.params() {
            pairs.append_pair(name, value);
        }
    }

    let signed = url.as_str();
    Ok(signed
        .strip_prefix("https://")
        .unwrap_or(signed)
        .to_string())
}
