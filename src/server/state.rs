use crate::application::{AccountService, AnalyticsService, DemoSeedService};
use crate::infrastructure::{
    AppConfig, PasswordHasher, PostgresBatchRepository, PostgresCampaignRepository,
    PostgresCompanyRepository, PostgresUserRepository, TokenService,
};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub type AccountServiceType = AccountService<PostgresUserRepository, PostgresBatchRepository>;

pub type AnalyticsServiceType =
    AnalyticsService<PostgresUserRepository, PostgresCompanyRepository, PostgresCampaignRepository>;

pub type DemoSeedServiceType = DemoSeedService<PostgresBatchRepository>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub accounts: Arc<AccountServiceType>,
    pub analytics: Arc<AnalyticsServiceType>,
    pub demo_seed: Arc<DemoSeedServiceType>,
    pub demo_seed_enabled: bool,
}

/// Build full state from config + an existing pool.
///
/// Intended for embedding into a larger service that already manages a `PgPool`.
pub async fn build_state_with_pool(
    config: AppConfig,
    pool: PgPool,
    run_migrations: bool,
) -> anyhow::Result<AppState> {
    if run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
    }

    anyhow::ensure!(!config.jwt_secret.is_empty(), "jwt_secret must not be empty");

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let company_repo = Arc::new(PostgresCompanyRepository::new(pool.clone()));
    let campaign_repo = Arc::new(PostgresCampaignRepository::new(pool.clone()));
    let batch_repo = Arc::new(PostgresBatchRepository::new(pool.clone()));

    let hasher = PasswordHasher::new(config.bcrypt_cost);
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);

    let accounts = Arc::new(AccountService::new(
        user_repo.clone(),
        batch_repo.clone(),
        hasher,
        tokens,
    ));
    let analytics = Arc::new(AnalyticsService::new(user_repo, company_repo, campaign_repo));
    let demo_seed = Arc::new(DemoSeedService::new(batch_repo, hasher));

    Ok(AppState {
        pool,
        accounts,
        analytics,
        demo_seed,
        demo_seed_enabled: config.demo_seed_enabled,
    })
}

/// Build state for the standalone server.
///
/// Creates the `PgPool`, runs migrations, and wires repositories/services.
pub async fn build_state_from_env(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await
        .context("connect database")?;
    build_state_with_pool(config, pool, true).await
}
