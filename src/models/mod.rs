pub mod ai;
pub mod billing;
pub mod github;
pub mod pagination;
pub mod project;
pub mod template;
pub mod user;

pub use ai::*;
pub use billing::*;
pub use github::*;
pub use pagination::*;
pub use project::*;
pub use template::*;
pub use user::*;
