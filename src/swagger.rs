use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::update_profile,
        handlers::auth::change_password,
        handlers::ai::generate,
        handlers::ai::improve,
        handlers::ai::suggestions,
        handlers::ai::credits,
        handlers::project::create_project,
        handlers::project::list_projects,
        handlers::project::get_project,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::project::duplicate_project,
        handlers::project::explore_projects,
        handlers::project::view_public_project,
        handlers::template::list_templates,
        handlers::template::template_categories,
        handlers::template::get_template,
        handlers::billing::plans,
        handlers::billing::usage,
        handlers::billing::create_subscription,
        handlers::billing::create_order,
        handlers::billing::capture_order,
        handlers::billing::cancel_subscription,
        handlers::github::auth_url,
        handlers::github::callback,
        handlers::github::connect,
        handlers::github::disconnect,
        handlers::github::list_repos,
        handlers::github::read_repo,
        handlers::github::create_repo,
        handlers::github::update_repo,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            UserResponse,
            AuthResponse,
            UsageStats,
            SubscriptionInfo,
            GenerateRequest,
            GenerateResponse,
            SavedProjectRef,
            GenerationMeta,
            ImproveRequest,
            ImproveResponse,
            SuggestionsRequest,
            CreditsResponse,
            CreateProjectRequest,
            UpdateProjectRequest,
            ProjectQuery,
            ProjectResponse,
            ProjectSummary,
            TemplateQuery,
            TemplateResponse,
            TemplateSummary,
            TemplateRating,
            CreateSubscriptionRequest,
            CreateSubscriptionResponse,
            CreateOrderRequest,
            CreateOrderResponse,
            CaptureOrderRequest,
            CaptureOrderResponse,
            UsageResponse,
            GithubAuthUrlResponse,
            ListReposRequest,
            RepoInfo,
            ReadRepoRequest,
            ReadRepoResponse,
            CreateRepoRequest,
            CreateRepoResponse,
            UpdateRepoRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "ai", description = "AI website generation API"),
        (name = "projects", description = "Project management API"),
        (name = "templates", description = "Template catalog API"),
        (name = "billing", description = "Plans, credits and payments API"),
        (name = "github", description = "GitHub integration API"),
    ),
    info(
        title = "WebForge Backend API",
        version = "1.0.0",
        description = "AI website builder REST API documentation",
    ),
    servers(
        (url = "/", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
