use axum::Server;
use clap::Parser;
use common::logging::Format;
use eyre::{eyre, WrapErr};
use event_types::Services;
use redis::aio::ConnectionManager as RedisConnectionManager;
use scheduler::FrontendUrl;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info, Level};
use url::Url;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    common::dotenv()?;

    let config = Config::parse();
    common::logging::init(config.log_level, config.log_format)?;

    let db = database::connect(&config.database_url).await?;
    if config.run_migrations {
        database::migrate(&db).await?;
    }
    let cache = connect_to_cache(&config.cache_url).await?;

    let frontend_url =
        FrontendUrl::new(config.frontend_url).wrap_err("invalid frontend URL")?;
    let cookie_domain = frontend_url
        .domain()
        .ok_or_else(|| eyre!("frontend URL must have a host"))?
        .to_owned();

    let payments = payments::Client::new(payments::Config {
        api_url: config.payment_api_url,
        secret_key: config.payment_secret_key,
        success_url: frontend_url.join("/event-types?payment=success")?,
        cancel_url: frontend_url.join("/event-types?payment=cancelled")?,
    })
    .wrap_err("failed to create payment client")?;
    let services = Services::postgres(db.clone(), Arc::new(payments));

    let authenticator = scheduler::saml_idp(
        &config.saml_idp_url,
        config.saml_client_secret_verifier,
        db.clone(),
    )
    .wrap_err("failed to create identity provider client")?;

    let router = scheduler::router(
        authenticator,
        cache,
        &cookie_domain,
        &config.cookie_signing_key,
        db,
        frontend_url,
        services,
    );

    info!(address = %config.address, "listening and ready to handle requests");
    Server::bind(&config.address)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown())
        .await
        .wrap_err("failed to start server")?;

    Ok(())
}

/// Connect to the specified cache instance
async fn connect_to_cache(url: &str) -> eyre::Result<RedisConnectionManager> {
    let client = redis::Client::open(url).wrap_err("invalid cache URL format")?;
    let manager = client
        .get_tokio_connection_manager()
        .await
        .wrap_err("failed to connect to the cache")?;
    Ok(manager)
}

/// Setup hyper graceful shutdown for SIGINT (ctrl+c) and SIGTERM
async fn shutdown() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(%error, "failed to install ctrl+c handler");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("server successfully shutdown");
    info!("goodbye! o/");
}

/// Creates paid event types and completes sign-ins from the SAML identity provider
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Config {
    /// The address for the server to listen on
    #[arg(long, default_value = "127.0.0.1:4243", env = "ADDRESS")]
    address: SocketAddr,

    /// The database to store event types in
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Apply pending migrations on startup
    #[arg(long, default_value_t = false, env = "RUN_MIGRATIONS")]
    run_migrations: bool,

    /// The Redis cache to store sessions in
    #[arg(long, env = "CACHE_URL")]
    cache_url: String,

    /// The default level to log at
    #[arg(long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    log_level: Level,

    /// How log lines are formatted, either `pretty` or `json`
    #[arg(long, default_value_t = Format::Pretty, env = "LOG_FORMAT")]
    log_format: Format,

    /// The publicly accessible URL for the frontend
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Url,

    /// A secret to sign the session cookie with
    ///
    /// This should be a long, random string
    #[arg(long, env = "COOKIE_SIGNING_KEY")]
    cookie_signing_key: String,

    /// The SAML identity provider's base URL
    #[arg(long, env = "SAML_IDP_URL")]
    saml_idp_url: Url,

    /// The secret exchanged with the identity provider in place of a client secret
    #[arg(long, env = "SAML_CLIENT_SECRET_VERIFIER")]
    saml_client_secret_verifier: String,

    /// Base URL of the payment provider's API
    #[arg(long, default_value = "https://api.stripe.com", env = "PAYMENT_API_URL")]
    payment_api_url: Url,

    /// The payment provider's secret API key
    #[arg(long, env = "PAYMENT_SECRET_KEY")]
    payment_secret_key: String,
}
