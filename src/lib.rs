//! AI.GROWTH analytics
//!
//! Multi-tenant marketing analytics: an agency oversees client companies and
//! their ad campaigns, clients see only their own company.
//!
//! ## Standalone
//!
//! Run the binary:
//! ```bash
//! ad-growth-server
//! ```
//!
//! ## Embedded (Axum)
//!
//! With the `server` feature enabled the router can be nested into a larger Axum app:
//! ```rust,ignore
//! use axum::Router;
//! use ad_growth::infrastructure::AppConfig;
//! use ad_growth::server::{build_state_with_pool, router};
//! use sqlx::PgPool;
//!
//! let cfg = AppConfig::from_env()?;
//! let pool = PgPool::connect(&cfg.database_url).await?;
//! let state = build_state_with_pool(cfg, pool, true).await?;
//! let app = Router::new().nest("/growth", router(state));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Enabled behind the `server` feature so the core library can be used without Axum.
#[cfg(feature = "server")]
pub mod server;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;

#[cfg(feature = "server")]
pub use server::*;
