use crate::handlers::auth::current_user_id;
use crate::models::*;
use crate::services::GenerationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/ai/generate",
    tag = "ai",
    request_body = GenerateRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Website generated", body = GenerateResponse),
        (status = 400, description = "Invalid prompt"),
        (status = 403, description = "Out of credits"),
        (status = 502, description = "Generation provider error")
    )
)]
pub async fn generate(
    generation_service: web::Data<GenerationService>,
    req: HttpRequest,
    request: web::Json<GenerateRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match generation_service
        .generate(user_id, request.into_inner())
        .await
    {
        Ok((response, meta)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "meta": meta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/ai/improve",
    tag = "ai",
    request_body = ImproveRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Code improved", body = ImproveResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Out of credits")
    )
)]
pub async fn improve(
    generation_service: web::Data<GenerationService>,
    req: HttpRequest,
    request: web::Json<ImproveRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match generation_service
        .improve(user_id, request.into_inner())
        .await
    {
        Ok((response, meta)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "meta": meta
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/ai/suggestions",
    tag = "ai",
    request_body = SuggestionsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Design suggestions"),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn suggestions(
    generation_service: web::Data<GenerationService>,
    request: web::Json<SuggestionsRequest>,
) -> Result<HttpResponse> {
    match generation_service.design_suggestions(&request.prompt).await {
        Ok((suggestions, tokens_used)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "suggestions": suggestions },
            "meta": { "tokensUsed": tokens_used }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/ai/credits",
    tag = "ai",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Credit balance", body = CreditsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn credits(
    generation_service: web::Data<GenerationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match generation_service.credits(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ai_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .route("/generate", web::post().to(generate))
            .route("/improve", web::post().to(improve))
            .route("/suggestions", web::post().to(suggestions))
            .route("/credits", web::get().to(credits)),
    );
}
