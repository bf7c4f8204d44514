use crate::application::ServiceError;
use crate::domain::{Campaign, Company, Plan, Platform, RecordBatch, Role, User};
use crate::infrastructure::{BatchRepository, PasswordHasher};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

pub const AGENCY_EMAIL: &str = "admin@ai.growth";
pub const AGENCY_NAME: &str = "Admin AI.GROWTH";
pub const AGENCY_PASSWORD: &str = "admin123";
pub const CLIENT_PASSWORD: &str = "cliente123";

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub plan: Plan,
    pub monthly_budget: f64,
}

pub const DEMO_CATALOG: [CatalogEntry; 5] = [
    CatalogEntry {
        name: "TechSolve Ltda",
        plan: Plan::Aceleracao,
        monthly_budget: 15_000.0,
    },
    CatalogEntry {
        name: "Marketing Pro",
        plan: Plan::Crescimento,
        monthly_budget: 25_000.0,
    },
    CatalogEntry {
        name: "StartupX",
        plan: Plan::Starter,
        monthly_budget: 5_000.0,
    },
    CatalogEntry {
        name: "E-commerce Plus",
        plan: Plan::Aceleracao,
        monthly_budget: 18_000.0,
    },
    CatalogEntry {
        name: "Consultoria Digital",
        plan: Plan::Crescimento,
        monthly_budget: 30_000.0,
    },
];

/// Login of the demo manager account of a catalog company.
pub fn client_email(company_name: &str) -> String {
    let slug = company_name
        .to_lowercase()
        .replace(' ', "")
        .replace("ltda", "");
    format!("cliente@{}.com", slug)
}

fn seed_campaign<R: Rng + ?Sized>(rng: &mut R, company: &Company, platform: Platform) -> Campaign {
    let mut campaign = Campaign::new(
        company.id,
        format!("Campanha {} - {}", platform.title(), company.name),
        platform.to_string(),
    );

    let budget = company.monthly_budget / company.plan.budget_divisor();
    let spent = budget * rng.gen_range(0.6..=0.9);
    let impressions = (spent * rng.gen_range(50.0..=150.0)) as i64;
    let clicks = (impressions as f64 * rng.gen_range(0.02..=0.08)) as i64;
    let conversions = (clicks as f64 * rng.gen_range(0.05..=0.15)) as i64;
    let revenue = spent * rng.gen_range(2.5..=5.0);

    campaign.budget = budget;
    campaign.spent = spent;
    campaign.impressions = impressions;
    campaign.clicks = clicks;
    campaign.conversions = conversions;
    campaign.revenue = revenue;
    campaign
}

/// Builds the full demo data set: one agency account, then per catalog
/// company a client account and `plan.campaign_cap()` campaigns.
///
/// Structure is fixed; magnitudes come from `rng`.
pub fn generate_demo_batch<R: Rng + ?Sized>(
    rng: &mut R,
    agency_password_hash: &str,
    client_password_hash: &str,
) -> RecordBatch {
    let mut batch = RecordBatch::default();

    batch.users.push(User::new(
        AGENCY_EMAIL.to_string(),
        agency_password_hash.to_string(),
        AGENCY_NAME.to_string(),
        Role::Agency,
        None,
    ));

    for entry in DEMO_CATALOG.iter() {
        let company = Company::new(entry.name.to_string(), entry.plan, entry.monthly_budget);

        batch.users.push(User::new(
            client_email(entry.name),
            client_password_hash.to_string(),
            format!("Gestor {}", entry.name),
            Role::Client,
            Some(company.id),
        ));

        for platform in Platform::SEED_ORDER.iter().take(entry.plan.campaign_cap()) {
            batch.campaigns.push(seed_campaign(rng, &company, *platform));
        }

        batch.companies.push(company);
    }

    batch.stamp_sequential(Utc::now());
    batch
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeedOutcome {
    pub created: bool,
    pub companies: usize,
    pub users: usize,
    pub campaigns: usize,
}

/// Writes the demo data set as one transaction.
///
/// Nothing deduplicates a second call; it collides on the demo emails and
/// fails with `Conflict` without persisting anything.
pub struct DemoSeedService<B>
where
    B: BatchRepository,
{
    batch_repo: Arc<B>,
    hasher: PasswordHasher,
}

impl<B> DemoSeedService<B>
where
    B: BatchRepository,
{
    pub fn new(batch_repo: Arc<B>, hasher: PasswordHasher) -> Self {
        Self { batch_repo, hasher }
    }

    pub async fn seed_demo_data(&self) -> Result<SeedOutcome, ServiceError> {
        let agency_hash = self.hasher.hash(AGENCY_PASSWORD).await?;
        let client_hash = self.hasher.hash(CLIENT_PASSWORD).await?;

        let batch = generate_demo_batch(&mut StdRng::from_entropy(), &agency_hash, &client_hash);

        if let Err(e) = self.batch_repo.insert_batch(&batch).await {
            error!(error = %e, "Demo data batch rolled back");
            return Err(e.into());
        }

        info!(
            companies = batch.companies.len(),
            users = batch.users.len(),
            campaigns = batch.campaigns.len(),
            "Demo data created"
        );

        Ok(SeedOutcome {
            created: true,
            companies: batch.companies.len(),
            users: batch.users.len(),
            campaigns: batch.campaigns.len(),
        })
    }
}
