pub mod ai;
pub mod auth;
pub mod billing;
pub mod github;
pub mod project;
pub mod template;
pub mod webhook;

pub use ai::ai_config;
pub use auth::auth_config;
pub use billing::billing_config;
pub use github::github_config;
pub use project::project_config;
pub use template::template_config;
pub use webhook::webhook_config;
