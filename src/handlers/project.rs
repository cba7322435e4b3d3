use crate::handlers::auth::current_user_id;
use crate::models::*;
use crate::services::ProjectService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ExploreQuery {
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid project data")
    )
)]
pub async fn create_project(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    request: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service.create(user_id, request.into_inner()).await {
        Ok(project) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "project": project }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("type" = Option<String>, Query, description = "Filter by site type"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("pageSize" = Option<i64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated project list"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_projects(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    query: web::Query<ProjectQuery>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service.list(user_id, query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Project detail", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service.get(user_id, path.into_inner()).await {
        Ok(project) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "project": project }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service
        .update(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(project) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "project": project }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service.delete(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Project deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/duplicate",
    tag = "projects",
    params(("id" = i64, Path, description = "Project id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Project duplicated", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn duplicate_project(
    project_service: web::Data<ProjectService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match project_service.duplicate(user_id, path.into_inner()).await {
        Ok(project) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "project": project }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects/public/explore",
    tag = "projects",
    params(("limit" = Option<u64>, Query, description = "Max results")),
    responses((status = 200, description = "Public project gallery"))
)]
pub async fn explore_projects(
    project_service: web::Data<ProjectService>,
    query: web::Query<ExploreQuery>,
) -> Result<HttpResponse> {
    match project_service.explore(query.limit).await {
        Ok(projects) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "projects": projects }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects/public/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Public project detail", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn view_public_project(
    project_service: web::Data<ProjectService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match project_service.view_public(path.into_inner()).await {
        Ok(project) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "project": project }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn project_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/projects")
            .route("/public/explore", web::get().to(explore_projects))
            .route("/public/{id}", web::get().to(view_public_project))
            .route("", web::post().to(create_project))
            .route("", web::get().to(list_projects))
            .route("/{id}", web::get().to(get_project))
            .route("/{id}", web::put().to(update_project))
            .route("/{id}", web::delete().to(delete_project))
            .route("/{id}/duplicate", web::post().to(duplicate_project)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::projects::{self, ProjectStatus, SiteType};
    use crate::services::ProjectService;
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn stored_project() -> projects::Model {
        let now = Utc::now();
        projects::Model {
            id: 1,
            user_id: 0,
            name: "Landing".to_string(),
            description: None,
            prompt: String::new(),
            html_code: "<h1>Hi</h1>".to_string(),
            css_code: String::new(),
            js_code: String::new(),
            site_type: SiteType::Custom,
            status: ProjectStatus::Draft,
            is_public: false,
            views: 0,
            likes: 0,
            version: 1,
            last_edited: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_create_project_responds_with_201() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_project()]])
            .into_connection();
        let project_service = ProjectService::new(Arc::new(db));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(project_service))
                .configure(project_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/projects")
            .set_json(serde_json::json!({
                "name": "Landing",
                "htmlCode": "<h1>Hi</h1>"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
