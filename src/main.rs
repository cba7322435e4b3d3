use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use webforge_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{GithubClient, OpenAiClient, PayPalClient},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "webforge-backend"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Services share one connection pool behind an Arc.
    let pool = Arc::new(pool);

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);

    let openai_client = OpenAiClient::new(config.openai.clone());
    let paypal_client = PayPalClient::new(config.paypal.clone());
    let github_client = GithubClient::new(config.github.clone());

    let ledger_service = LedgerService::new(pool.clone());
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let generation_service = GenerationService::new(
        pool.clone(),
        ledger_service.clone(),
        openai_client.clone(),
    );
    let billing_service = BillingService::new(
        ledger_service.clone(),
        paypal_client.clone(),
        config.frontend_url.clone(),
    );
    let project_service = ProjectService::new(pool.clone());
    let template_service = TemplateService::new(pool.clone());
    let github_service = GithubService::new(
        pool.clone(),
        github_client.clone(),
        config.frontend_url.clone(),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let frontend_url = config.frontend_url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&frontend_url))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(generation_service.clone()))
            .app_data(web::Data::new(billing_service.clone()))
            .app_data(web::Data::new(project_service.clone()))
            .app_data(web::Data::new(template_service.clone()))
            .app_data(web::Data::new(github_service.clone()))
            .route("/health", web::get().to(health))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::ai_config)
                    .configure(handlers::project_config)
                    .configure(handlers::template_config)
                    .configure(handlers::billing_config)
                    .configure(handlers::github_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
