use crate::handlers::auth::current_user_id;
use crate::models::*;
use crate::services::GithubService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    #[serde(rename = "githubToken")]
    pub github_token: String,
}

#[utoipa::path(
    get,
    path = "/api/github/auth",
    tag = "github",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "OAuth authorization URL", body = GithubAuthUrlResponse))
)]
pub async fn auth_url(github_service: web::Data<GithubService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": GithubAuthUrlResponse {
            auth_url: github_service.authorize_url(),
        }
    })))
}

/// OAuth redirect target. Always lands the browser back on the frontend,
/// with either the token or a fixed error code in the query string.
#[utoipa::path(
    get,
    path = "/api/github/callback",
    tag = "github",
    params(("code" = Option<String>, Query, description = "OAuth authorization code")),
    responses((status = 302, description = "Redirect to frontend"))
)]
pub async fn callback(
    github_service: web::Data<GithubService>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse> {
    let location = match query.code.as_deref() {
        Some(code) if !code.is_empty() => github_service.callback(code).await,
        _ => github_service.callback("").await,
    };

    Ok(HttpResponse::Found()
        .insert_header(("Location", location))
        .finish())
}

#[utoipa::path(
    post,
    path = "/api/github/connect",
    tag = "github",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "GitHub account linked"),
        (status = 502, description = "GitHub API error")
    )
)]
pub async fn connect(
    github_service: web::Data<GithubService>,
    req: HttpRequest,
    request: web::Json<ConnectRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match github_service.connect(user_id, &request.github_token).await {
        Ok(username) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "username": username }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/github/disconnect",
    tag = "github",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "GitHub account unlinked"))
)]
pub async fn disconnect(
    github_service: web::Data<GithubService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match github_service.disconnect(user_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "GitHub account disconnected"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/github/repos",
    tag = "github",
    request_body = ListReposRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repository list"),
        (status = 502, description = "GitHub API error")
    )
)]
pub async fn list_repos(
    github_service: web::Data<GithubService>,
    request: web::Json<ListReposRequest>,
) -> Result<HttpResponse> {
    match github_service
        .list_repositories(&request.github_token)
        .await
    {
        Ok(repos) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "repos": repos }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/github/read-repo",
    tag = "github",
    request_body = ReadRepoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Site files pulled from repository", body = ReadRepoResponse),
        (status = 404, description = "No HTML file in repository")
    )
)]
pub async fn read_repo(
    github_service: web::Data<GithubService>,
    request: web::Json<ReadRepoRequest>,
) -> Result<HttpResponse> {
    match github_service.read_repository(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/github/create-repo",
    tag = "github",
    request_body = CreateRepoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repository created and site pushed", body = CreateRepoResponse),
        (status = 502, description = "GitHub API error")
    )
)]
pub async fn create_repo(
    github_service: web::Data<GithubService>,
    request: web::Json<CreateRepoRequest>,
) -> Result<HttpResponse> {
    match github_service.create_repository(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/github/update-repo",
    tag = "github",
    request_body = UpdateRepoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Site files pushed"),
        (status = 502, description = "GitHub API error")
    )
)]
pub async fn update_repo(
    github_service: web::Data<GithubService>,
    request: web::Json<UpdateRepoRequest>,
) -> Result<HttpResponse> {
    match github_service.update_repository(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Repository updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn github_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/github")
            .route("/auth", web::get().to(auth_url))
            .route("/callback", web::get().to(callback))
            .route("/connect", web::post().to(connect))
            .route("/disconnect", web::post().to(disconnect))
            .route("/repos", web::post().to(list_repos))
            .route("/read-repo", web::post().to(read_repo))
            .route("/create-repo", web::post().to(create_repo))
            .route("/update-repo", web::post().to(update_repo)),
    );
}
