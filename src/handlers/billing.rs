use crate::handlers::auth::current_user_id;
use crate::models::*;
use crate::services::BillingService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/billing/plans",
    tag = "billing",
    responses((status = 200, description = "Plan and credit pack catalog"))
)]
pub async fn plans(billing_service: web::Data<BillingService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": billing_service.plans()
    })))
}

#[utoipa::path(
    get,
    path = "/api/billing/usage",
    tag = "billing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current plan, credits and usage", body = UsageResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn usage(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match billing_service.usage(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/billing/create-subscription",
    tag = "billing",
    request_body = CreateSubscriptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription created", body = CreateSubscriptionResponse),
        (status = 400, description = "Invalid plan"),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn create_subscription(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match billing_service
        .create_subscription(user_id, &request.plan_id)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/billing/create-order",
    tag = "billing",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid credit pack"),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn create_order(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match billing_service.create_order(user_id, &request.pack_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/billing/capture-order",
    tag = "billing",
    request_body = CaptureOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order captured and credits granted", body = CaptureOrderResponse),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn capture_order(
    billing_service: web::Data<BillingService>,
    request: web::Json<CaptureOrderRequest>,
) -> Result<HttpResponse> {
    match billing_service.capture_order(&request.order_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/billing/cancel-subscription",
    tag = "billing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription cancelled"),
        (status = 400, description = "No active subscription")
    )
)]
pub async fn cancel_subscription(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req);

    match billing_service.cancel_subscription(user_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Subscription cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn billing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billing")
            .route("/plans", web::get().to(plans))
            .route("/usage", web::get().to(usage))
            .route("/create-subscription", web::post().to(create_subscription))
            .route("/create-order", web::post().to(create_order))
            .route("/capture-order", web::post().to(capture_order))
            .route("/cancel-subscription", web::post().to(cancel_subscription))
            .route(
                "/webhook",
                web::post().to(crate::handlers::webhook::paypal_webhook),
            ),
    );
}
