use crate::models::WebhookEvent;
use crate::services::BillingService;
use actix_web::{HttpResponse, Result, web};
use log::{error, info};
use serde_json::json;

/// Payment provider webhook. The provider retries on non-2xx responses, so
/// every outcome short of a transport failure acknowledges with 200; errors
/// are logged for operator follow-up instead.
pub async fn paypal_webhook(
    billing_service: web::Data<BillingService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let ack = HttpResponse::Ok().json(json!({ "received": true }));

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            error!("Undecodable webhook payload: {e}");
            return Ok(ack);
        }
    };

    info!("Received payment webhook event: {}", event.event_type);

    if let Err(e) = billing_service.handle_webhook_event(&event).await {
        error!("Failed to process webhook event {}: {e}", event.event_type);
    }

    Ok(ack)
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/paypal", web::post().to(paypal_webhook)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayPalConfig;
    use crate::external::PayPalClient;
    use crate::handlers::billing_config;
    use crate::services::{BillingService, LedgerService};
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn billing_service() -> BillingService {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let paypal = PayPalClient::new(PayPalConfig {
            client_id: String::new(),
            secret: String::new(),
            mode: String::new(),
            basic_plan_id: "P-BASIC".to_string(),
            pro_plan_id: "P-PRO".to_string(),
            enterprise_plan_id: "P-ENT".to_string(),
        });
        BillingService::new(
            LedgerService::new(Arc::new(db)),
            paypal,
            "http://localhost:3000".to_string(),
        )
    }

    #[actix_web::test]
    async fn test_billing_webhook_acknowledges_undecodable_payload() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(billing_service()))
                .service(web::scope("/api").configure(billing_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/billing/webhook")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["received"], true);
    }

    #[actix_web::test]
    async fn test_webhook_acknowledges_unknown_event_type() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(billing_service()))
                .configure(webhook_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/webhook/paypal")
            .set_json(serde_json::json!({ "event_type": "CUSTOMER.DISPUTE.CREATED" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["received"], true);
    }
}
