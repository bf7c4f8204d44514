pub mod config;
pub mod password;
pub mod repository;
pub mod token;

pub use config::*;
pub use password::*;
pub use repository::*;
pub use token::*;
