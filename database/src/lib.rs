use eyre::WrapErr;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions,
};
use std::{str::FromStr, time::Duration};
use tracing::{info, instrument, log::LevelFilter};

mod app;
mod credential;
mod error;
mod event_type;
mod membership;
mod user;

pub use app::App;
pub use credential::Credential;
pub use error::{Error, Result};
pub use event_type::{
    CreatedEventType, EventType, Location, NewEventType, PaymentStatus, SchedulingType,
};
pub use membership::{Membership, MembershipRole};
pub use sqlx::{types::Json, Error as SqlxError, PgPool};
pub use user::{DefaultConferencingApp, User, UserMetadata};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect to the database
pub async fn connect(url: &str) -> eyre::Result<PgPool> {
    let options = PgConnectOptions::from_str(url)
        .wrap_err("invalid database URL format")?
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(250));
    let db = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .wrap_err("failed to connect to the database")?;

    info!("connected to the database");

    Ok(db)
}

/// Apply all pending schema migrations
#[instrument(skip_all)]
pub async fn migrate(db: &PgPool) -> eyre::Result<()> {
    MIGRATOR
        .run(db)
        .await
        .wrap_err("failed to apply migrations")?;

    info!(total = MIGRATOR.iter().count(), "migrations up to date");

    Ok(())
}
