pub mod projects;
pub mod templates;
pub mod users;

pub use projects as project_entity;
pub use templates as template_entity;
pub use users as user_entity;
