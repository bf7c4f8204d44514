pub mod batch;
pub mod campaign;
pub mod company;
pub mod principal;
pub mod user;

pub use batch::*;
pub use campaign::*;
pub use company::*;
pub use principal::*;
pub use user::*;
