use crate::application::ServiceError;
use crate::domain::Principal;
use tracing::warn;
use uuid::Uuid;

/// What an operation asks to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedScope {
    /// Every tenant (agency overview).
    AllCompanies,
    /// One named tenant's record and dashboard.
    Company(Uuid),
    /// The campaign set of one named tenant.
    CampaignsOf(Uuid),
    /// Whatever tenant the caller is bound to (client views).
    OwnTenant,
}

/// What the caller is allowed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleScope {
    AllActiveCompanies,
    /// A single tenant that must also be active.
    ActiveCompany(Uuid),
    /// The caller's own tenant.
    OwnCompany(Uuid),
}

impl VisibleScope {
    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            VisibleScope::AllActiveCompanies => None,
            VisibleScope::ActiveCompany(id) | VisibleScope::OwnCompany(id) => Some(*id),
        }
    }
}

/// Decides visibility before anything is read.
pub fn authorize(principal: &Principal, requested: RequestedScope) -> Result<VisibleScope, ServiceError> {
    let decision = match (principal, requested) {
        (Principal::Agency { .. }, RequestedScope::AllCompanies) => Ok(VisibleScope::AllActiveCompanies),
        (Principal::Agency { .. }, RequestedScope::Company(id))
        | (Principal::Agency { .. }, RequestedScope::CampaignsOf(id)) => Ok(VisibleScope::ActiveCompany(id)),
        (Principal::Agency { .. }, RequestedScope::OwnTenant) => Err(ServiceError::Forbidden),

        (Principal::Client { company_id, .. }, RequestedScope::OwnTenant) => {
            Ok(VisibleScope::OwnCompany(*company_id))
        }
        (Principal::Client { company_id, .. }, RequestedScope::Company(id))
        | (Principal::Client { company_id, .. }, RequestedScope::CampaignsOf(id))
            if *company_id == id =>
        {
            Ok(VisibleScope::OwnCompany(id))
        }
        (Principal::Client { .. }, _) => Err(ServiceError::Forbidden),
    };

    if decision.is_err() {
        warn!(user_id = %principal.user_id(), requested = ?requested, "Access denied");
    }
    decision
}
