use crate::entities::users::Plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credits granted to a fresh account on registration.
pub const FREE_PLAN_CREDITS: i64 = 10;

/// Enterprise is unlimited; the ledger pins this value purely for display.
pub const ENTERPRISE_DISPLAY_CREDITS: i64 = 999_999;

impl Plan {
    /// Credit allotment applied on subscription activation and on the
    /// monthly rollover reset.
    pub fn monthly_allotment(&self) -> i64 {
        match self {
            Plan::Free => FREE_PLAN_CREDITS,
            Plan::Basic => 100,
            Plan::Pro => 300,
            Plan::Enterprise => ENTERPRISE_DISPLAY_CREDITS,
        }
    }

    pub fn price_usd(&self) -> i64 {
        match self {
            Plan::Free => 0,
            Plan::Basic => 9,
            Plan::Pro => 19,
            Plan::Enterprise => 99,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CreditPack {
    Small,
    Medium,
    Large,
}

impl CreditPack {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "small" => Some(CreditPack::Small),
            "medium" => Some(CreditPack::Medium),
            "large" => Some(CreditPack::Large),
            _ => None,
        }
    }

    pub fn credits(&self) -> i64 {
        match self {
            CreditPack::Small => 50,
            CreditPack::Medium => 100,
            CreditPack::Large => 500,
        }
    }

    pub fn price_usd(&self) -> i64 {
        match self {
            CreditPack::Small => 5,
            CreditPack::Medium => 9,
            CreditPack::Large => 40,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CreditPack::Small => "50 Credits",
            CreditPack::Medium => "100 Credits",
            CreditPack::Large => "500 Credits",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    /// Plan key: "basic", "pro" or "enterprise".
    #[serde(rename = "planId")]
    pub plan_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
    pub approval_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Credit pack key: "small", "medium" or "large".
    #[serde(rename = "packId")]
    pub pack_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub approval_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaptureOrderRequest {
    #[serde(rename = "orderId")]
    pub order_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaptureOrderResponse {
    pub credits: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsageResponse {
    pub plan: Plan,
    pub credits: i64,
    pub usage: super::user::UsageStats,
    pub subscription: super::user::SubscriptionInfo,
}

/// Inbound webhook payload, payment-provider shaped. Unknown fields are
/// ignored; every field the dispatcher touches is optional because the
/// provider's schema differs per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event_type: String,
    #[serde(default)]
    pub resource: WebhookResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookResource {
    pub id: Option<String>,
    pub plan_id: Option<String>,
    pub custom_id: Option<String>,
    pub subscriber: Option<WebhookSubscriber>,
    pub billing_info: Option<WebhookBillingInfo>,
    /// Present on sale events belonging to a subscription.
    pub billing_agreement_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSubscriber {
    pub payer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBillingInfo {
    pub next_billing_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_allotments() {
        assert_eq!(Plan::Free.monthly_allotment(), 10);
        assert_eq!(Plan::Basic.monthly_allotment(), 100);
        assert_eq!(Plan::Pro.monthly_allotment(), 300);
        assert!(Plan::Enterprise.is_unlimited());
    }

    #[test]
    fn test_credit_pack_lookup() {
        assert_eq!(CreditPack::from_id("small"), Some(CreditPack::Small));
        assert_eq!(CreditPack::from_id("large").unwrap().credits(), 500);
        assert!(CreditPack::from_id("mega").is_none());
    }

    #[test]
    fn test_webhook_event_parses_activation_payload() {
        let payload = serde_json::json!({
            "id": "WH-1",
            "event_type": "BILLING.SUBSCRIPTION.ACTIVATED",
            "resource": {
                "id": "I-SUB123",
                "plan_id": "P-PRO",
                "custom_id": "42",
                "subscriber": { "payer_id": "PAYER9" },
                "billing_info": { "next_billing_time": "2026-10-01T00:00:00Z" }
            }
        });
        let event: WebhookEvent = serde_json::from_value(payload).unwrap();
        assert_eq!(event.event_type, "BILLING.SUBSCRIPTION.ACTIVATED");
        assert_eq!(event.resource.id.as_deref(), Some("I-SUB123"));
        assert_eq!(event.resource.custom_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_webhook_event_tolerates_missing_resource() {
        let event: WebhookEvent =
            serde_json::from_value(serde_json::json!({ "event_type": "PAYMENT.SALE.COMPLETED" }))
                .unwrap();
        assert!(event.resource.id.is_none());
    }
}
