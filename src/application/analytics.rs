use crate::application::aggregation::{
    build_agency_dashboard, build_company_dashboard, summarize_companies, AgencyDashboard,
    CampaignReport, CompanyDashboard, CompanySummary,
};
use crate::application::scoping::{authorize, RequestedScope, VisibleScope};
use crate::application::ServiceError;
use crate::domain::{Campaign, Company, Principal};
use crate::infrastructure::{
    CallerIdentity, CampaignRepository, CompanyRepository, RepositoryError, UserRepository,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Role-scoped read operations over companies and their campaigns.
///
/// Every operation resolves the caller and checks its scope before the first
/// company or campaign query runs.
pub struct AnalyticsService<U, C, K>
where
    U: UserRepository,
    C: CompanyRepository,
    K: CampaignRepository,
{
    user_repo: Arc<U>,
    company_repo: Arc<C>,
    campaign_repo: Arc<K>,
}

impl<U, C, K> AnalyticsService<U, C, K>
where
    U: UserRepository,
    C: CompanyRepository,
    K: CampaignRepository,
{
    pub fn new(user_repo: Arc<U>, company_repo: Arc<C>, campaign_repo: Arc<K>) -> Self {
        Self {
            user_repo,
            company_repo,
            campaign_repo,
        }
    }

    /// Stored user behind a token, as a principal allowed to read analytics.
    pub async fn resolve_principal(&self, caller: &CallerIdentity) -> Result<Principal, ServiceError> {
        let user = self.user_repo.get_by_id(caller.user_id).await?;

        Principal::from_user(&user).ok_or_else(|| {
            warn!(
                user_id = %user.id,
                role = %user.role,
                active = user.is_active,
                "Caller cannot read analytics"
            );
            ServiceError::Forbidden
        })
    }

    async fn authorize_caller(
        &self,
        caller: &CallerIdentity,
        requested: RequestedScope,
    ) -> Result<VisibleScope, ServiceError> {
        let principal = self.resolve_principal(caller).await?;
        authorize(&principal, requested)
    }

    async fn load_company(&self, scope: VisibleScope) -> Result<Company, ServiceError> {
        let id = scope
            .company_id()
            .ok_or_else(|| ServiceError::NotFound("Company".to_string()))?;

        let company = self.company_repo.get_by_id(id).await?;
        if matches!(scope, VisibleScope::ActiveCompany(_)) && !company.is_active {
            return Err(RepositoryError::NotFound(format!("Company {}", id)).into());
        }
        Ok(company)
    }

    async fn load_active_portfolio(&self) -> Result<(Vec<Company>, Vec<Campaign>), ServiceError> {
        let companies = self.company_repo.list_active().await?;
        let ids: Vec<Uuid> = companies.iter().map(|c| c.id).collect();
        let campaigns = self.campaign_repo.list_by_companies(&ids).await?;
        debug!(
            companies = companies.len(),
            campaigns = campaigns.len(),
            "Loaded active portfolio"
        );
        Ok((companies, campaigns))
    }

    pub async fn agency_dashboard(&self, caller: &CallerIdentity) -> Result<AgencyDashboard, ServiceError> {
        self.authorize_caller(caller, RequestedScope::AllCompanies).await?;
        let (companies, campaigns) = self.load_active_portfolio().await?;
        Ok(build_agency_dashboard(&companies, &campaigns))
    }

    pub async fn agency_companies(&self, caller: &CallerIdentity) -> Result<Vec<CompanySummary>, ServiceError> {
        self.authorize_caller(caller, RequestedScope::AllCompanies).await?;
        let (companies, campaigns) = self.load_active_portfolio().await?;
        Ok(summarize_companies(&companies, &campaigns))
    }

    pub async fn agency_campaigns(&self, caller: &CallerIdentity) -> Result<Vec<CampaignReport>, ServiceError> {
        self.authorize_caller(caller, RequestedScope::AllCompanies).await?;
        let (companies, campaigns) = self.load_active_portfolio().await?;

        let names: HashMap<Uuid, &str> = companies.iter().map(|c| (c.id, c.name.as_str())).collect();
        Ok(campaigns
            .into_iter()
            .map(|campaign| {
                let name = names.get(&campaign.company_id).copied().unwrap_or_default();
                CampaignReport::new(campaign).with_company_name(name)
            })
            .collect())
    }

    pub async fn client_dashboard(&self, caller: &CallerIdentity) -> Result<CompanyDashboard, ServiceError> {
        let scope = self.authorize_caller(caller, RequestedScope::OwnTenant).await?;
        self.dashboard_for(scope).await
    }

    /// Dashboard of a named company: any active company for the agency, only
    /// its own for a client.
    pub async fn company_dashboard(
        &self,
        caller: &CallerIdentity,
        company_id: Uuid,
    ) -> Result<CompanyDashboard, ServiceError> {
        let scope = self
            .authorize_caller(caller, RequestedScope::Company(company_id))
            .await?;
        self.dashboard_for(scope).await
    }

    async fn dashboard_for(&self, scope: VisibleScope) -> Result<CompanyDashboard, ServiceError> {
        let company = self.load_company(scope).await?;
        let campaigns = self.campaign_repo.list_by_company(company.id).await?;
        Ok(build_company_dashboard(company, campaigns))
    }

    pub async fn client_campaigns(&self, caller: &CallerIdentity) -> Result<Vec<CampaignReport>, ServiceError> {
        let scope = self.authorize_caller(caller, RequestedScope::OwnTenant).await?;
        let company_id = scope
            .company_id()
            .ok_or(ServiceError::Forbidden)?;

        let campaigns = self.campaign_repo.list_by_company(company_id).await?;
        Ok(campaigns.into_iter().map(CampaignReport::new).collect())
    }

    pub async fn client_company(&self, caller: &CallerIdentity) -> Result<Company, ServiceError> {
        let scope = self.authorize_caller(caller, RequestedScope::OwnTenant).await?;
        self.load_company(scope).await
    }
}
