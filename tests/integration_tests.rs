//! Integration tests for ad-growth
//! Drives registration, demo seeding and the scoped analytics views end to end
//! over in-memory repositories.

use ad_growth::{
    application::{
        AccountService, AnalyticsService, DemoSeedService, Login, Registration, ServiceError,
        AGENCY_EMAIL, AGENCY_PASSWORD, CLIENT_PASSWORD,
    },
    domain::{Campaign, Company, Plan, RecordBatch, Role, User},
    infrastructure::{
        BatchRepository, CallerIdentity, CampaignRepository, CompanyRepository, PasswordHasher,
        RepositoryError, TokenService, UserRepository,
    },
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ============================================================================
// In-memory store
// ============================================================================

/// Every repository over one set of tables. Vectors keep insertion order,
/// which stands in for `created_at` ordering.
#[derive(Clone, Default)]
struct InMemoryStore {
    companies: Arc<Mutex<Vec<Company>>>,
    users: Arc<Mutex<Vec<User>>>,
    campaigns: Arc<Mutex<Vec<Campaign>>>,
    fail_next_batch: Arc<AtomicBool>,
}

impl InMemoryStore {
    fn put_company(&self, company: Company) {
        self.companies.lock().unwrap().push(company);
    }

    fn put_campaign(&self, campaign: Campaign) {
        self.campaigns.lock().unwrap().push(campaign);
    }

    fn put_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    fn counts(&self) -> (usize, usize, usize) {
        (
            self.companies.lock().unwrap().len(),
            self.users.lock().unwrap().len(),
            self.campaigns.lock().unwrap().len(),
        )
    }

    fn deactivate_user(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("User {}", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Company, RepositoryError> {
        let companies = self.companies.lock().unwrap();
        companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Company {}", id)))
    }

    async fn list_active(&self) -> Result<Vec<Company>, RepositoryError> {
        let companies = self.companies.lock().unwrap();
        Ok(companies.iter().filter(|c| c.is_active).cloned().collect())
    }
}

#[async_trait]
impl CampaignRepository for InMemoryStore {
    async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.lock().unwrap();
        Ok(campaigns
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn list_by_companies(&self, company_ids: &[Uuid]) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.lock().unwrap();
        Ok(campaigns
            .iter()
            .filter(|c| company_ids.contains(&c.company_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BatchRepository for InMemoryStore {
    /// All-or-nothing: every check runs before the first row is stored.
    async fn insert_batch(&self, batch: &RecordBatch) -> Result<(), RepositoryError> {
        let mut companies = self.companies.lock().unwrap();
        let mut users = self.users.lock().unwrap();
        let mut campaigns = self.campaigns.lock().unwrap();

        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::InvalidData("injected write failure".to_string()));
        }

        let mut emails: HashSet<&str> = users.iter().map(|u| u.email.as_str()).collect();
        for user in &batch.users {
            if !emails.insert(user.email.as_str()) {
                return Err(RepositoryError::Conflict(format!("Email {} already exists", user.email)));
            }
        }

        companies.extend(batch.companies.iter().cloned());
        users.extend(batch.users.iter().cloned());
        campaigns.extend(batch.campaigns.iter().cloned());
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    store: InMemoryStore,
    accounts: AccountService<InMemoryStore, InMemoryStore>,
    analytics: AnalyticsService<InMemoryStore, InMemoryStore, InMemoryStore>,
    demo_seed: DemoSeedService<InMemoryStore>,
}

fn harness() -> Harness {
    let store = InMemoryStore::default();
    let shared = Arc::new(store.clone());
    let hasher = PasswordHasher::new(4);

    Harness {
        accounts: AccountService::new(
            shared.clone(),
            shared.clone(),
            hasher,
            TokenService::new("integration-secret", 1),
        ),
        analytics: AnalyticsService::new(shared.clone(), shared.clone(), shared.clone()),
        demo_seed: DemoSeedService::new(shared, hasher),
        store,
    }
}

fn caller_for(user: &User) -> CallerIdentity {
    CallerIdentity {
        user_id: user.id,
        role: user.role,
        company_id: user.company_id,
    }
}

async fn login_as(h: &Harness, email: &str, password: &str) -> CallerIdentity {
    let session = h
        .accounts
        .login(Login {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
        .expect("login");
    h.accounts
        .resolve_caller(&session.access_token)
        .expect("resolve token")
}

fn registration(email: &str, role: Option<Role>, company_name: Option<&str>) -> Registration {
    Registration {
        email: email.to_string(),
        password: "pw-123".to_string(),
        name: "Test User".to_string(),
        role,
        company_name: company_name.map(str::to_string),
        plan: None,
    }
}

fn campaign(company_id: Uuid, platform: &str, spent: f64, revenue: f64, clicks: i64, conversions: i64) -> Campaign {
    let mut c = Campaign::new(company_id, format!("{} campaign", platform), platform.to_string());
    c.budget = spent;
    c.spent = spent;
    c.revenue = revenue;
    c.impressions = clicks * 20;
    c.clicks = clicks;
    c.conversions = conversions;
    c
}

fn agency_user(h: &Harness) -> User {
    let user = User::new(
        "agency@example.com".to_string(),
        String::new(),
        "Agency".to_string(),
        Role::Agency,
        None,
    );
    h.store.put_user(user.clone());
    user
}

fn client_user(h: &Harness, company_id: Option<Uuid>) -> User {
    let user = User::new(
        format!("client-{}@example.com", Uuid::new_v4()),
        String::new(),
        "Client".to_string(),
        Role::Client,
        company_id,
    );
    h.store.put_user(user.clone());
    user
}

// ============================================================================
// Demo seeding
// ============================================================================

#[tokio::test]
async fn test_demo_seed_builds_catalog_visible_to_agency() {
    let h = harness();

    let outcome = h.demo_seed.seed_demo_data().await.expect("seed");
    assert!(outcome.created);
    assert_eq!((outcome.companies, outcome.users, outcome.campaigns), (5, 6, 9));
    assert_eq!(h.store.counts(), (5, 6, 9));

    let agency = login_as(&h, AGENCY_EMAIL, AGENCY_PASSWORD).await;
    let dashboard = h.analytics.agency_dashboard(&agency).await.expect("dashboard");

    assert_eq!(dashboard.kpis.total_companies, 5);
    assert_eq!(dashboard.kpis.total_campaigns, 9);
    assert_eq!(dashboard.kpis.total_budget, 93_000.0);

    let plans: Vec<(Plan, usize)> = dashboard
        .plans_performance
        .iter()
        .map(|p| (p.plan, p.count))
        .collect();
    assert_eq!(
        plans,
        vec![(Plan::Starter, 1), (Plan::Aceleracao, 2), (Plan::Crescimento, 2)]
    );

    assert_eq!(dashboard.top_companies.len(), 5);
    for pair in dashboard.top_companies.windows(2) {
        assert!(pair[0].roas >= pair[1].roas);
    }
}

#[tokio::test]
async fn test_demo_client_sees_only_its_company() {
    let h = harness();
    h.demo_seed.seed_demo_data().await.expect("seed");

    let client = login_as(&h, "cliente@startupx.com", CLIENT_PASSWORD).await;
    let dashboard = h.analytics.client_dashboard(&client).await.expect("dashboard");

    assert_eq!(dashboard.company.name, "StartupX");
    assert_eq!(dashboard.campaigns.len(), 1);
    assert_eq!(dashboard.platform_performance.keys().collect::<Vec<_>>(), vec!["google"]);

    let company = h.analytics.client_company(&client).await.expect("company");
    assert_eq!(company.id, dashboard.company.id);
}

#[tokio::test]
async fn test_demo_seed_twice_conflicts_and_persists_nothing() {
    let h = harness();
    h.demo_seed.seed_demo_data().await.expect("first seed");
    let before = h.store.counts();

    let second = h.demo_seed.seed_demo_data().await;

    assert!(matches!(second, Err(ServiceError::Conflict(_))));
    assert_eq!(h.store.counts(), before);
}

#[tokio::test]
async fn test_failed_demo_batch_persists_nothing() {
    let h = harness();
    h.store.fail_next_batch.store(true, Ordering::SeqCst);

    let result = h.demo_seed.seed_demo_data().await;

    assert!(matches!(result, Err(ServiceError::Internal(_))));
    assert_eq!(h.store.counts(), (0, 0, 0));
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_same_email_twice_conflicts() {
    let h = harness();
    let first = h
        .accounts
        .register(registration("dup@example.com", Some(Role::Agency), None))
        .await
        .expect("first registration");

    let second = h
        .accounts
        .register(registration("dup@example.com", Some(Role::Agency), None))
        .await;

    assert!(matches!(second, Err(ServiceError::Conflict(_))));
    assert_eq!(h.store.counts(), (0, 1, 0));

    let caller = login_as(&h, "dup@example.com", "pw-123").await;
    assert_eq!(caller.user_id, first.user.id);
}

#[tokio::test]
async fn test_client_registration_creates_company_on_plan() {
    let h = harness();
    let mut req = registration("gestor@acme.com", None, Some("Acme"));
    req.plan = Some(Plan::Crescimento);

    let session = h.accounts.register(req).await.expect("register");

    assert_eq!(session.user.role, Role::Client);
    let company_id = session.user.company_id.expect("bound to company");
    let caller = h.accounts.resolve_caller(&session.access_token).expect("token");
    let company = h.analytics.client_company(&caller).await.expect("company");
    assert_eq!(company.id, company_id);
    assert_eq!(company.plan, Plan::Crescimento);
    assert_eq!(company.monthly_budget, 0.0);
}

#[tokio::test]
async fn test_client_registration_with_blank_company_name_has_no_company() {
    let h = harness();
    for (email, name) in [("a@example.com", ""), ("b@example.com", "   ")] {
        let session = h
            .accounts
            .register(registration(email, Some(Role::Client), Some(name)))
            .await
            .expect("register");
        assert_eq!(session.user.company_id, None);
    }

    assert_eq!(h.store.counts(), (0, 2, 0));
}

#[tokio::test]
async fn test_agency_registration_ignores_company_name() {
    let h = harness();
    let session = h
        .accounts
        .register(registration("boss@example.com", Some(Role::Agency), Some("Ignored")))
        .await
        .expect("register");

    assert_eq!(session.user.company_id, None);
    assert_eq!(h.store.counts(), (0, 1, 0));
}

#[tokio::test]
async fn test_invalid_registration_is_rejected_before_writes() {
    let h = harness();
    let result = h
        .accounts
        .register(registration("not-an-email", None, None))
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert_eq!(h.store.counts(), (0, 0, 0));
}

#[tokio::test]
async fn test_login_failures() {
    let h = harness();
    h.accounts
        .register(registration("ana@example.com", Some(Role::Agency), None))
        .await
        .expect("register");

    let wrong_password = h
        .accounts
        .login(Login {
            email: "ana@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await;
    assert!(matches!(wrong_password, Err(ServiceError::Unauthenticated)));

    let unknown = h
        .accounts
        .login(Login {
            email: "ghost@example.com".to_string(),
            password: "pw-123".to_string(),
        })
        .await;
    assert!(matches!(unknown, Err(ServiceError::Unauthenticated)));

    let missing = h
        .accounts
        .login(Login {
            email: String::new(),
            password: String::new(),
        })
        .await;
    assert!(matches!(missing, Err(ServiceError::Validation(_))));

    h.store.deactivate_user("ana@example.com");
    let deactivated = h
        .accounts
        .login(Login {
            email: "ana@example.com".to_string(),
            password: "pw-123".to_string(),
        })
        .await;
    assert!(matches!(deactivated, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_current_user_and_bad_tokens() {
    let h = harness();
    let session = h
        .accounts
        .register(registration("me@example.com", Some(Role::Agency), None))
        .await
        .expect("register");
    let caller = h.accounts.resolve_caller(&session.access_token).expect("token");

    let me = h.accounts.current_user(&caller).await.expect("current user");
    assert_eq!(me.email, "me@example.com");

    assert!(matches!(
        h.accounts.resolve_caller("garbage"),
        Err(ServiceError::Unauthenticated)
    ));

    let stranger = CallerIdentity {
        user_id: Uuid::new_v4(),
        role: Role::Agency,
        company_id: None,
    };
    assert!(matches!(
        h.accounts.current_user(&stranger).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        h.analytics.agency_dashboard(&stranger).await,
        Err(ServiceError::NotFound(_))
    ));
}

// ============================================================================
// Scoping
// ============================================================================

#[tokio::test]
async fn test_client_without_company_is_forbidden_everywhere() {
    let h = harness();
    let orphan = caller_for(&client_user(&h, None));

    assert!(matches!(h.analytics.client_dashboard(&orphan).await, Err(ServiceError::Forbidden)));
    assert!(matches!(h.analytics.client_campaigns(&orphan).await, Err(ServiceError::Forbidden)));
    assert!(matches!(h.analytics.client_company(&orphan).await, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_client_forbidden_on_other_company_dashboard() {
    let h = harness();
    let own = Company::new("Own".to_string(), Plan::Starter, 1_000.0);
    let other = Company::new("Other".to_string(), Plan::Starter, 1_000.0);
    let (own_id, other_id) = (own.id, other.id);
    h.store.put_company(own);
    h.store.put_company(other);

    let client = caller_for(&client_user(&h, Some(own_id)));

    let own_dashboard = h.analytics.company_dashboard(&client, own_id).await.expect("own");
    assert_eq!(own_dashboard.company.id, own_id);
    assert!(matches!(
        h.analytics.company_dashboard(&client, other_id).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(h.analytics.agency_companies(&client).await, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_agency_sees_active_companies_only() {
    let h = harness();
    let active = Company::new("Active".to_string(), Plan::Aceleracao, 2_000.0);
    let mut dormant = Company::new("Dormant".to_string(), Plan::Crescimento, 9_000.0);
    dormant.is_active = false;
    let (active_id, dormant_id) = (active.id, dormant.id);
    h.store.put_company(active);
    h.store.put_company(dormant);
    h.store.put_campaign(campaign(active_id, "google", 100.0, 300.0, 10, 2));
    h.store.put_campaign(campaign(dormant_id, "google", 100.0, 900.0, 10, 2));

    let agency = caller_for(&agency_user(&h));

    let companies = h.analytics.agency_companies(&agency).await.expect("companies");
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].company.id, active_id);

    let campaigns = h.analytics.agency_campaigns(&agency).await.expect("campaigns");
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].company_name.as_deref(), Some("Active"));

    let dashboard = h.analytics.agency_dashboard(&agency).await.expect("dashboard");
    assert_eq!(dashboard.kpis.total_companies, 1);
    assert_eq!(dashboard.kpis.total_budget, 2_000.0);

    assert!(matches!(
        h.analytics.company_dashboard(&agency, dormant_id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(h.analytics.client_dashboard(&agency).await, Err(ServiceError::Forbidden)));
}

// ============================================================================
// Aggregation over stored data
// ============================================================================

#[tokio::test]
async fn test_zero_counter_company_reports_zero_metrics() {
    let h = harness();
    let empty = Company::new("Empty".to_string(), Plan::Starter, 500.0);
    let idle = Company::new("Idle".to_string(), Plan::Starter, 500.0);
    let (empty_id, idle_id) = (empty.id, idle.id);
    h.store.put_company(empty);
    h.store.put_company(idle);
    h.store.put_campaign(campaign(idle_id, "facebook", 0.0, 0.0, 0, 0));

    let client = caller_for(&client_user(&h, Some(idle_id)));
    let dashboard = h.analytics.client_dashboard(&client).await.expect("dashboard");
    assert_eq!(dashboard.kpis.roi, 0.0);
    assert_eq!(dashboard.kpis.cac, 0.0);
    assert_eq!(dashboard.kpis.conversion_rate, 0.0);

    let agency = caller_for(&agency_user(&h));
    let companies = h.analytics.agency_companies(&agency).await.expect("companies");
    let counts: Vec<(Uuid, usize)> = companies.iter().map(|s| (s.company.id, s.campaigns_count)).collect();
    assert_eq!(counts, vec![(empty_id, 0), (idle_id, 1)]);
    assert!(companies.iter().all(|s| s.roi == 0.0 && s.roas == 0.0));

    let dashboard = h.analytics.agency_dashboard(&agency).await.expect("dashboard");
    assert!(dashboard.top_companies.is_empty());
    assert_eq!(dashboard.plans_performance.len(), 1);
    assert_eq!(dashboard.plans_performance[0].count, 2);
    assert_eq!(dashboard.plans_performance[0].avg_roas, 0.0);
}

#[tokio::test]
async fn test_platform_breakdown_matches_client_totals() {
    let h = harness();
    let company = Company::new("Multi".to_string(), Plan::Crescimento, 9_000.0);
    let company_id = company.id;
    h.store.put_company(company);
    h.store.put_campaign(campaign(company_id, "google", 1_000.0, 3_000.0, 200, 20));
    h.store.put_campaign(campaign(company_id, "google", 500.0, 1_000.0, 100, 5));
    h.store.put_campaign(campaign(company_id, "instagram", 250.5, 900.0, 50, 4));

    let client = caller_for(&client_user(&h, Some(company_id)));
    let dashboard = h.analytics.client_dashboard(&client).await.expect("dashboard");

    let platform_spent: f64 = dashboard.platform_performance.values().map(|p| p.spent).sum();
    let platform_clicks: i64 = dashboard.platform_performance.values().map(|p| p.clicks).sum();
    assert!((platform_spent - dashboard.kpis.total_spent).abs() < 1e-9);
    assert_eq!(platform_clicks, dashboard.kpis.total_clicks);

    let google = &dashboard.platform_performance["google"];
    assert_eq!(google.spent, 1_500.0);
    assert_eq!(google.conversions, 25);
    assert!((google.roas - 4_000.0 / 1_500.0).abs() < 1e-9);

    let campaigns = h.analytics.client_campaigns(&client).await.expect("campaigns");
    assert_eq!(campaigns.len(), 3);
    assert!(campaigns.iter().all(|c| c.company_name.is_none()));
}

#[tokio::test]
async fn test_top_companies_rank_by_aggregate_roas() {
    let h = harness();
    let names = ["Low", "High", "Free", "Mid"];
    let mut ids = Vec::new();
    for name in names {
        let company = Company::new(name.to_string(), Plan::Aceleracao, 1_000.0);
        ids.push(company.id);
        h.store.put_company(company);
    }
    // Low: 2.0, High: 5.0, Free: no spend, Mid: (100 + 700) / 200 = 4.0
    h.store.put_campaign(campaign(ids[0], "google", 100.0, 200.0, 10, 1));
    h.store.put_campaign(campaign(ids[1], "google", 100.0, 500.0, 10, 1));
    h.store.put_campaign(campaign(ids[2], "google", 0.0, 50.0, 10, 1));
    h.store.put_campaign(campaign(ids[3], "google", 100.0, 100.0, 10, 1));
    h.store.put_campaign(campaign(ids[3], "facebook", 100.0, 700.0, 10, 1));

    let agency = caller_for(&agency_user(&h));
    let dashboard = h.analytics.agency_dashboard(&agency).await.expect("dashboard");

    let ranked: Vec<&str> = dashboard.top_companies.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(ranked, vec!["High", "Mid", "Low"]);

    // Per-row mean over rows with spend: (2 + 5 + 1 + 7) / 4
    assert_eq!(dashboard.plans_performance.len(), 1);
    assert!((dashboard.plans_performance[0].avg_roas - 3.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_dashboard_json_rounds_metrics() {
    let h = harness();
    let company = Company::new("Round".to_string(), Plan::Starter, 100.0);
    let company_id = company.id;
    h.store.put_company(company);
    h.store.put_campaign(campaign(company_id, "google", 3.0, 10.0, 7, 3));

    let client = caller_for(&client_user(&h, Some(company_id)));
    let dashboard = h.analytics.client_dashboard(&client).await.expect("dashboard");
    let json = serde_json::to_value(&dashboard).unwrap();

    assert_eq!(json["kpis"]["roi"], 233.33);
    assert_eq!(json["kpis"]["conversion_rate"], 42.86);
    assert_eq!(json["campaigns"][0]["cpc"], 0.43);
}
