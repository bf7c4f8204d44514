pub mod accounts;
pub mod aggregation;
pub mod analytics;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod scoping;

pub use accounts::*;
pub use aggregation::*;
pub use analytics::*;
pub use error::*;
pub use fixtures::*;
pub use scoping::*;
