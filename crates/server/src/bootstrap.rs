use std::sync::Arc;

use axum::Router;
use expertise_core::config::AppConfig;
use expertise_core::token::TokenVerifier;
use expertise_db::{
    connect_with_settings, migrations, repositories::ExpertiseRepository, DbPool,
    SqlExpertiseRepository,
};
use expertise_slack::{CommandRouter, TextStyle};
use thiserror::Error;
use tracing::info;

use crate::routes::{self, AppState, SharedCommandRouter};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub commands: SharedCommandRouter,
}

impl Application {
    pub fn router(&self) -> Router {
        routes::router(
            AppState {
                commands: Arc::clone(&self.commands),
                deployment_mode: self.config.deployment.mode,
            },
            self.db_pool.clone(),
        )
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        deployment_mode = ?config.deployment.mode,
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let repository: Arc<dyn ExpertiseRepository> =
        Arc::new(SqlExpertiseRepository::new(db_pool.clone()));
    let verifier = TokenVerifier::new(config.slack.verification_token.clone());
    let commands = Arc::new(
        CommandRouter::new(repository, verifier)
            .with_style(TextStyle::from_mrkdwn_flag(config.slack.mrkdwn)),
    );

    Ok(Application { config, db_pool, commands })
}
