use crate::models::*;
use crate::services::TemplateService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "templates",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("isPremium" = Option<bool>, Query, description = "Filter by premium flag"),
        ("limit" = Option<u64>, Query, description = "Max results")
    ),
    responses((status = 200, description = "Template catalog"))
)]
pub async fn list_templates(
    template_service: web::Data<TemplateService>,
    query: web::Query<TemplateQuery>,
) -> Result<HttpResponse> {
    match template_service.list(query.into_inner()).await {
        Ok(templates) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "templates": templates }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/templates/categories",
    tag = "templates",
    responses((status = 200, description = "Category facets"))
)]
pub async fn template_categories(
    template_service: web::Data<TemplateService>,
) -> Result<HttpResponse> {
    match template_service.categories().await {
        Ok(categories) => {
            let data: Vec<serde_json::Value> = categories
                .into_iter()
                .map(|(name, count)| json!({ "name": name, "count": count }))
                .collect();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": { "categories": data }
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    tag = "templates",
    params(("id" = i64, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template detail", body = TemplateResponse),
        (status = 404, description = "Template not found")
    )
)]
pub async fn get_template(
    template_service: web::Data<TemplateService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match template_service.get(path.into_inner()).await {
        Ok(template) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "template": template }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn template_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/templates")
            .route("", web::get().to(list_templates))
            .route("/categories", web::get().to(template_categories))
            .route("/{id}", web::get().to(get_template)),
    );
}
