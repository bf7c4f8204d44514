use crate::domain::{Campaign, CampaignStatus, Company, Plan, RecordBatch, Role, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Company, RepositoryError>;
    /// Active companies in creation order.
    async fn list_active(&self) -> Result<Vec<Company>, RepositoryError>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Campaign>, RepositoryError>;
    async fn list_by_companies(
        &self,
        company_ids: &[Uuid],
    ) -> Result<Vec<Campaign>, RepositoryError>;
}

/// Atomic multi-table writes (registration, demo fixtures).
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Persists every record or none. A duplicate email surfaces as `Conflict`.
    async fn insert_batch(&self, batch: &RecordBatch) -> Result<(), RepositoryError>;
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return RepositoryError::Conflict(format!("Duplicate value violates {}", constraint));
        }
    }
    RepositoryError::DatabaseError(e)
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, company_id, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("User {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_user(&row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, role, company_id, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, RepositoryError> {
    let role_str: String = row.try_get("role")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        role: Role::from_str(&role_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown role: {}", role_str)))?,
        company_id: row.try_get("company_id")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Company, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, plan, monthly_budget, is_active, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Company {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_company(&row)
    }

    async fn list_active(&self) -> Result<Vec<Company>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, plan, monthly_budget, is_active, created_at, updated_at
            FROM companies
            WHERE is_active = TRUE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_company).collect()
    }
}

fn row_to_company(row: &sqlx::postgres::PgRow) -> Result<Company, RepositoryError> {
    let plan_str: String = row.try_get("plan")?;

    Ok(Company {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        plan: Plan::from_str(&plan_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown plan: {}", plan_str)))?,
        monthly_budget: row.try_get("monthly_budget")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Campaign>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, name, platform, status, budget, spent,
                   impressions, clicks, conversions, revenue, created_at, updated_at
            FROM campaigns
            WHERE company_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_campaign).collect()
    }

    async fn list_by_companies(
        &self,
        company_ids: &[Uuid],
    ) -> Result<Vec<Campaign>, RepositoryError> {
        if company_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, company_id, name, platform, status, budget, spent,
                   impressions, clicks, conversions, revenue, created_at, updated_at
            FROM campaigns
            WHERE company_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_campaign).collect()
    }
}

fn row_to_campaign(row: &sqlx::postgres::PgRow) -> Result<Campaign, RepositoryError> {
    let status_str: String = row.try_get("status")?;

    Ok(Campaign {
        id: row.try_get("id")?,
        company_id: row.try_get("company_id")?,
        name: row.try_get("name")?,
        platform: row.try_get("platform")?,
        status: CampaignStatus::from_str(&status_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", status_str)))?,
        budget: row.try_get("budget")?,
        spent: row.try_get("spent")?,
        impressions: row.try_get("impressions")?,
        clicks: row.try_get("clicks")?,
        conversions: row.try_get("conversions")?,
        revenue: row.try_get("revenue")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresBatchRepository {
    pool: PgPool,
}

impl PostgresBatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchRepository for PostgresBatchRepository {
    async fn insert_batch(&self, batch: &RecordBatch) -> Result<(), RepositoryError> {
        // Dropping `tx` on any early return rolls the whole batch back.
        let mut tx = self.pool.begin().await?;

        for company in &batch.companies {
            insert_company(&mut tx, company).await?;
        }
        for user in &batch.users {
            insert_user(&mut tx, user).await?;
        }
        for campaign in &batch.campaigns {
            insert_campaign(&mut tx, campaign).await?;
        }

        tx.commit().await?;
        debug!(records = batch.len(), "Committed record batch");
        Ok(())
    }
}

async fn insert_company(
    tx: &mut Transaction<'_, Postgres>,
    company: &Company,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO companies (id, name, plan, monthly_budget, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(company.plan.to_string())
    .bind(company.monthly_budget)
    .bind(company.is_active)
    .bind(company.created_at)
    .bind(company.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(map_write_error)?;

    Ok(())
}

async fn insert_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, company_id, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role.to_string())
    .bind(user.company_id)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(map_write_error)?;

    Ok(())
}

async fn insert_campaign(
    tx: &mut Transaction<'_, Postgres>,
    campaign: &Campaign,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO campaigns (id, company_id, name, platform, status, budget, spent,
                               impressions, clicks, conversions, revenue, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(campaign.id)
    .bind(campaign.company_id)
    .bind(&campaign.name)
    .bind(&campaign.platform)
    .bind(campaign.status.to_string())
    .bind(campaign.budget)
    .bind(campaign.spent)
    .bind(campaign.impressions)
    .bind(campaign.clicks)
    .bind(campaign.conversions)
    .bind(campaign.revenue)
    .bind(campaign.created_at)
    .bind(campaign.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(map_write_error)?;

    Ok(())
}
