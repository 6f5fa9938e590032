use std::sync::Arc;

use auth::Authenticator;
use identity_service::config::Config;
use identity_service::domain::session::service::SessionService;
use identity_service::domain::user::ports::IdentityStore;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryIdentityStore;
use identity_service::outbound::repositories::PostgresIdentityStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_lifetime_hours = config.jwt.expiration_hours,
        issuer = ?config.jwt.issuer,
        audience = ?config.jwt.audience,
        storage = if config.database.is_some() { "postgresql" } else { "memory" },
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::with_policy(
        config.jwt.secret.as_bytes(),
        config.jwt.validation_policy(),
    ));

    match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            serve(Arc::new(PostgresIdentityStore::new(pg_pool)), authenticator, &config).await
        }
        None => {
            let store = match &config.storage.snapshot_path {
                Some(path) => InMemoryIdentityStore::open(path).await?,
                None => {
                    tracing::warn!("No snapshot path configured, users are lost on restart");
                    InMemoryIdentityStore::new()
                }
            };

            serve(Arc::new(store), authenticator, &config).await
        }
    }
}

async fn serve<S: IdentityStore>(
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    config: &Config,
) -> Result<(), anyhow::Error> {
    let user_service = Arc::new(UserService::new(
        Arc::clone(&store),
        Arc::clone(&authenticator),
    ));
    let session_service = Arc::new(SessionService::new(
        store,
        authenticator,
        config.jwt.token_lifetime(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(user_service, session_service)).await?;
    tracing::info!("Server exited successfully");

    Ok(())
}
