pub mod auth_service;
pub mod billing_service;
pub mod generation_service;
pub mod github_service;
pub mod ledger_service;
pub mod project_service;
pub mod template_service;

pub use auth_service::AuthService;
pub use billing_service::BillingService;
pub use generation_service::GenerationService;
pub use github_service::GithubService;
pub use ledger_service::LedgerService;
pub use project_service::ProjectService;
pub use template_service::TemplateService;
