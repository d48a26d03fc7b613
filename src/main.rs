use aws_config::BehaviorVersion;
use lambda_runtime::{LambdaEvent, service_fn};
use mimalloc::MiMalloc;
use rds_iam_bootstrap::aws::{RdsIamSigner, SecretsManagerStore};
use rds_iam_bootstrap::config::Config;
use rds_iam_bootstrap::db::PgConnector;
use rds_iam_bootstrap::Bootstrapper;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false)
                // CloudWatch stamps ingestion time.
                .without_time(),
        )
        .init();

    info!(
        db_iam_user = %cfg.db_iam_user,
        secret_arn = %cfg.secret_arn.as_deref().unwrap_or("<none>"),
        region = %cfg.region,
        tls_accept_invalid_certs = cfg.db_tls_accept_invalid_certs,
        ssl_root_cert = ?cfg.db_ssl_root_cert,
        loglevel = %cfg.loglevel
    );

    let settings = cfg.bootstrap_settings()?;
    // Secrets Manager follows the default region chain; `REGION` only scopes token signing.
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let bootstrapper = Bootstrapper::new(
        SecretsManagerStore::new(&sdk_config),
        PgConnector::new(),
        RdsIamSigner::new(&sdk_config, cfg.region.clone()),
        settings,
    );
    let bootstrapper = &bootstrapper;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        bootstrapper.handle(event).await
    }))
    .await
}
