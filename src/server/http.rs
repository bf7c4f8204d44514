use super::http_auth::extract_bearer_token;
use super::http_errors::error_response;
use super::http_parse::{parse_plan, parse_role, PLANS, ROLES};
use super::http_types::{HealthResponse, LoginRequest, RegisterRequest};
use super::state::AppState;
use crate::application::{Login, Registration};
use crate::infrastructure::CallerIdentity;
use axum::{
    extract::{Path, State},
    http::{header::HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

type JsonResponse = (StatusCode, Json<serde_json::Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/demo-data", post(create_demo_data))
        .route("/api/agency/dashboard", get(agency_dashboard))
        .route("/api/agency/companies", get(agency_companies))
        .route("/api/agency/companies/:id/dashboard", get(company_dashboard))
        .route("/api/agency/campaigns", get(agency_campaigns))
        .route("/api/client/dashboard", get(client_dashboard))
        .route("/api/client/campaigns", get(client_campaigns))
        .route("/api/client/company", get(client_company))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Verifies the bearer token; the stored user is re-read by each operation.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, JsonResponse> {
    let token = extract_bearer_token(headers).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Missing or invalid authorization token"})),
        )
    })?;

    state
        .accounts
        .resolve_caller(token)
        .map_err(|e| error_response(&e, "resolve caller"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        register,
        login,
        current_user,
        create_demo_data,
        agency_dashboard,
        agency_companies,
        company_dashboard,
        agency_campaigns,
        client_dashboard,
        client_campaigns,
        client_company,
    ),
    components(schemas(HealthResponse, RegisterRequest, LoginRequest)),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and demo data"),
        (name = "Agency", description = "Cross-company views for the agency"),
        (name = "Client", description = "Views of the caller's own company"),
    ),
    info(
        title = "AI.GROWTH Analytics API",
        version = "0.1.0",
        description = "Multi-tenant marketing analytics for an agency and its client companies",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed: DB connectivity issue");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    error: Some("Database connectivity failed".to_string()),
                }),
            )
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = Object),
        (status = 400, description = "Invalid fields, role or plan", body = Object),
        (status = 409, description = "Email already registered", body = Object)
    )
)]
async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> JsonResponse {
    let role = match req.role.as_deref().map(parse_role) {
        None => None,
        Some(Some(role)) => Some(role),
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid role", "allowed": ROLES})),
            );
        }
    };

    let plan = match req.plan.as_deref().map(parse_plan) {
        None => None,
        Some(Some(plan)) => Some(plan),
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid plan", "allowed": PLANS})),
            );
        }
    };

    let registration = Registration {
        email: req.email,
        password: req.password,
        name: req.name,
        role,
        company_name: req.company_name,
        plan,
    };

    match state.accounts.register(registration).await {
        Ok(session) => (StatusCode::CREATED, Json(serde_json::json!(session))),
        Err(e) => error_response(&e, "register"),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = Object),
        (status = 400, description = "Email and password are required", body = Object),
        (status = 401, description = "Invalid credentials", body = Object),
        (status = 403, description = "User deactivated", body = Object)
    )
)]
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> JsonResponse {
    let login = Login {
        email: req.email,
        password: req.password,
    };

    match state.accounts.login(login).await {
        Ok(session) => (StatusCode::OK, Json(serde_json::json!(session))),
        Err(e) => error_response(&e, "login"),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 404, description = "User not found", body = Object)
    )
)]
async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.accounts.current_user(&caller).await {
        Ok(user) => (StatusCode::OK, Json(serde_json::json!({"user": user}))),
        Err(e) => error_response(&e, "current user"),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/demo-data",
    tag = "Auth",
    responses(
        (status = 201, description = "Demo data created", body = Object),
        (status = 404, description = "Demo seeding disabled", body = Object),
        (status = 409, description = "Demo data already present", body = Object)
    )
)]
async fn create_demo_data(State(state): State<AppState>) -> JsonResponse {
    if !state.demo_seed_enabled {
        warn!("Demo data requested while seeding is disabled");
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Not found"})),
        );
    }

    match state.demo_seed.seed_demo_data().await {
        Ok(outcome) => (StatusCode::CREATED, Json(serde_json::json!(outcome))),
        Err(e) => error_response(&e, "seed demo data"),
    }
}

#[utoipa::path(
    get,
    path = "/api/agency/dashboard",
    tag = "Agency",
    responses(
        (status = 200, description = "KPIs, plan performance and top companies", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller is not the agency", body = Object)
    )
)]
async fn agency_dashboard(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.agency_dashboard(&caller).await {
        Ok(dashboard) => (StatusCode::OK, Json(serde_json::json!(dashboard))),
        Err(e) => error_response(&e, "agency dashboard"),
    }
}

#[utoipa::path(
    get,
    path = "/api/agency/companies",
    tag = "Agency",
    responses(
        (status = 200, description = "Active companies with campaign totals", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller is not the agency", body = Object)
    )
)]
async fn agency_companies(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.agency_companies(&caller).await {
        Ok(companies) => (StatusCode::OK, Json(serde_json::json!({"companies": companies}))),
        Err(e) => error_response(&e, "agency companies"),
    }
}

#[utoipa::path(
    get,
    path = "/api/agency/companies/{id}/dashboard",
    tag = "Agency",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Dashboard of one company", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Company outside the caller's scope", body = Object),
        (status = 404, description = "Company not found or inactive", body = Object)
    )
)]
async fn company_dashboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.company_dashboard(&caller, id).await {
        Ok(dashboard) => (StatusCode::OK, Json(serde_json::json!(dashboard))),
        Err(e) => error_response(&e, "company dashboard"),
    }
}

#[utoipa::path(
    get,
    path = "/api/agency/campaigns",
    tag = "Agency",
    responses(
        (status = 200, description = "Campaigns of every active company", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller is not the agency", body = Object)
    )
)]
async fn agency_campaigns(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.agency_campaigns(&caller).await {
        Ok(campaigns) => (StatusCode::OK, Json(serde_json::json!({"campaigns": campaigns}))),
        Err(e) => error_response(&e, "agency campaigns"),
    }
}

#[utoipa::path(
    get,
    path = "/api/client/dashboard",
    tag = "Client",
    responses(
        (status = 200, description = "Dashboard of the caller's company", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller has no company", body = Object),
        (status = 404, description = "Company not found", body = Object)
    )
)]
async fn client_dashboard(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.client_dashboard(&caller).await {
        Ok(dashboard) => (StatusCode::OK, Json(serde_json::json!(dashboard))),
        Err(e) => error_response(&e, "client dashboard"),
    }
}

#[utoipa::path(
    get,
    path = "/api/client/campaigns",
    tag = "Client",
    responses(
        (status = 200, description = "Campaigns of the caller's company", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller has no company", body = Object)
    )
)]
async fn client_campaigns(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.client_campaigns(&caller).await {
        Ok(campaigns) => (StatusCode::OK, Json(serde_json::json!({"campaigns": campaigns}))),
        Err(e) => error_response(&e, "client campaigns"),
    }
}

#[utoipa::path(
    get,
    path = "/api/client/company",
    tag = "Client",
    responses(
        (status = 200, description = "The caller's company", body = Object),
        (status = 401, description = "Invalid or missing authorization token", body = Object),
        (status = 403, description = "Caller has no company", body = Object),
        (status = 404, description = "Company not found", body = Object)
    )
)]
async fn client_company(State(state): State<AppState>, headers: HeaderMap) -> JsonResponse {
    let caller = match authenticate(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.analytics.client_company(&caller).await {
        Ok(company) => (StatusCode::OK, Json(serde_json::json!({"company": company}))),
        Err(e) => error_response(&e, "client company"),
    }
}
