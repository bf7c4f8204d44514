use crate::application::ServiceError;
use crate::domain::{Company, Plan, RecordBatch, Role, User};
use crate::infrastructure::{
    BatchRepository, CallerIdentity, PasswordHasher, TokenService, UserRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub role: Option<Role>,
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Login {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

pub struct AccountService<U, B>
where
    U: UserRepository,
    B: BatchRepository,
{
    user_repo: Arc<U>,
    batch_repo: Arc<B>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl<U, B> AccountService<U, B>
where
    U: UserRepository,
    B: BatchRepository,
{
    pub fn new(user_repo: Arc<U>, batch_repo: Arc<B>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            user_repo,
            batch_repo,
            hasher,
            tokens,
        }
    }

    /// Creates a user, and for a client naming a company, that company too.
    ///
    /// Both rows are written in one batch. Concurrent duplicates that slip past
    /// the email pre-check fail on the unique constraint as `Conflict`.
    pub async fn register(&self, mut registration: Registration) -> Result<AuthSession, ServiceError> {
        // A blank company name means none was given.
        registration.company_name = registration.company_name.filter(|n| !n.trim().is_empty());
        registration.validate()?;

        if self.user_repo.get_by_email(&registration.email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email {} already registered",
                registration.email
            )));
        }

        let role = registration.role.unwrap_or(Role::Client);
        let mut batch = RecordBatch::default();

        let company_id = match (role, registration.company_name) {
            (Role::Client, Some(company_name)) => {
                let company = Company::new(company_name, registration.plan.unwrap_or_default(), 0.0);
                let id = company.id;
                batch.companies.push(company);
                Some(id)
            }
            _ => None,
        };

        let password_hash = self.hasher.hash(&registration.password).await?;
        let user = User::new(registration.email, password_hash, registration.name, role, company_id);
        batch.users.push(user.clone());

        self.batch_repo.insert_batch(&batch).await?;

        info!(
            user_id = %user.id,
            role = %user.role,
            company_id = ?user.company_id,
            "User registered"
        );

        let access_token = self.tokens.issue(&user)?;
        Ok(AuthSession { access_token, user })
    }

    pub async fn login(&self, login: Login) -> Result<AuthSession, ServiceError> {
        login.validate()?;

        let user = match self.user_repo.get_by_email(&login.email).await? {
            Some(user) => user,
            None => return Err(ServiceError::Unauthenticated),
        };

        if !self.hasher.verify(&login.password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Rejected login with wrong password");
            return Err(ServiceError::Unauthenticated);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Rejected login for deactivated user");
            return Err(ServiceError::Forbidden);
        }

        let access_token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthSession { access_token, user })
    }

    pub async fn current_user(&self, caller: &CallerIdentity) -> Result<User, ServiceError> {
        Ok(self.user_repo.get_by_id(caller.user_id).await?)
    }

    pub fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, ServiceError> {
        Ok(self.tokens.resolve_caller(token)?)
    }
}
