use crate::config::PayPalConfig;
use crate::entities::users::Plan;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct CapturedOrder {
    pub purchase_units: Vec<CapturedPurchaseUnit>,
}

#[derive(Debug, Deserialize)]
pub struct CapturedPurchaseUnit {
    pub custom_id: Option<String>,
    pub payments: CapturedPayments,
}

#[derive(Debug, Deserialize)]
pub struct CapturedPayments {
    pub captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
pub struct Capture {
    pub id: String,
    pub amount: CaptureAmount,
}

#[derive(Debug, Deserialize)]
pub struct CaptureAmount {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ApprovableResource {
    pub id: String,
    pub approval_url: String,
}

#[derive(Clone)]
pub struct PayPalClient {
    client: Client,
    config: PayPalConfig,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Maps the provider's plan id (as delivered in webhook payloads) back to
    /// the internal tier. Unknown ids fall back to free.
    pub fn plan_for_external_id(&self, plan_id: &str) -> Plan {
        if plan_id == self.config.basic_plan_id {
            Plan::Basic
        } else if plan_id == self.config.pro_plan_id {
            Plan::Pro
        } else if plan_id == self.config.enterprise_plan_id {
            Plan::Enterprise
        } else {
            Plan::Free
        }
    }

    pub fn external_plan_id(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Free => None,
            Plan::Basic => Some(&self.config.basic_plan_id),
            Plan::Pro => Some(&self.config.pro_plan_id),
            Plan::Enterprise => Some(&self.config.enterprise_plan_id),
        }
    }

    async fn get_access_token(&self) -> AppResult<String> {
        let url = format!("{}/v1/oauth2/token", self.config.api_base());

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if response.status().is_success() {
            let token: AccessTokenResponse = response.json().await?;
            Ok(token.access_token)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalApiError(format!(
                "PayPal authentication failed: {text}"
            )))
        }
    }

    pub async fn create_subscription(
        &self,
        external_plan_id: &str,
        user_id: i64,
        frontend_url: &str,
    ) -> AppResult<ApprovableResource> {
        let access_token = self.get_access_token().await?;
        let url = format!("{}/v1/billing/subscriptions", self.config.api_base());

        let body = json!({
            "plan_id": external_plan_id,
            "application_context": {
                "brand_name": "AI Website Builder",
                "shipping_preference": "NO_SHIPPING",
                "user_action": "SUBSCRIBE_NOW",
                "return_url": format!("{frontend_url}/dashboard?subscription=success"),
                "cancel_url": format!("{frontend_url}/pricing?subscription=cancelled"),
            },
            // Echoed back as resource.custom_id on the activation webhook.
            "custom_id": user_id.to_string(),
        });

        self.post_approvable(&url, &access_token, &body, "create subscription")
            .await
    }

    pub async fn create_order(
        &self,
        description: &str,
        price_usd: i64,
        custom_id: &str,
        frontend_url: &str,
    ) -> AppResult<ApprovableResource> {
        let access_token = self.get_access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.config.api_base());

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "description": description,
                "custom_id": custom_id,
                "amount": {
                    "currency_code": "USD",
                    "value": format!("{price_usd}.00"),
                },
            }],
            "application_context": {
                "brand_name": "AI Website Builder",
                "landing_page": "NO_PREFERENCE",
                "shipping_preference": "NO_SHIPPING",
                "user_action": "PAY_NOW",
                "return_url": format!("{frontend_url}/dashboard?credits=purchased"),
                "cancel_url": format!("{frontend_url}/pricing?payment=cancelled"),
            },
        });

        self.post_approvable(&url, &access_token, &body, "create order")
            .await
    }

    pub async fn capture_order(&self, order_id: &str) -> AppResult<CapturedOrder> {
        let access_token = self.get_access_token().await?;
        let url = format!(
            "{}/v2/checkout/orders/{order_id}/capture",
            self.config.api_base()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .header("Content-Type", "application/json")
            .json(&json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalApiError(format!(
                "PayPal capture failed: {text}"
            )))
        }
    }

    pub async fn cancel_subscription(&self, subscription_id: &str, reason: &str) -> AppResult<()> {
        let access_token = self.get_access_token().await?;
        let url = format!(
            "{}/v1/billing/subscriptions/{subscription_id}/cancel",
            self.config.api_base()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&json!({ "reason": reason }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalApiError(format!(
                "PayPal cancellation failed: {text}"
            )))
        }
    }

    async fn post_approvable(
        &self,
        url: &str,
        access_token: &str,
        body: &serde_json::Value,
        action: &str,
    ) -> AppResult<ApprovableResource> {
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "PayPal {action} failed: {text}"
            )));
        }

        let resource: CreatedResource = response.json().await?;
        let approval_url = resource
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone())
            .ok_or_else(|| {
                AppError::ExternalApiError(format!("PayPal {action}: no approval link returned"))
            })?;

        Ok(ApprovableResource {
            id: resource.id,
            approval_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayPalConfig;

    fn test_client() -> PayPalClient {
        PayPalClient::new(PayPalConfig {
            client_id: "cid".to_string(),
            secret: "sec".to_string(),
            mode: String::new(),
            basic_plan_id: "P-BASIC".to_string(),
            pro_plan_id: "P-PRO".to_string(),
            enterprise_plan_id: "P-ENT".to_string(),
        })
    }

    #[test]
    fn test_plan_mapping() {
        let client = test_client();
        assert_eq!(client.plan_for_external_id("P-BASIC"), Plan::Basic);
        assert_eq!(client.plan_for_external_id("P-PRO"), Plan::Pro);
        assert_eq!(client.plan_for_external_id("P-ENT"), Plan::Enterprise);
        assert_eq!(client.plan_for_external_id("P-UNKNOWN"), Plan::Free);
    }

    #[test]
    fn test_external_plan_id() {
        let client = test_client();
        assert_eq!(client.external_plan_id(Plan::Pro), Some("P-PRO"));
        assert_eq!(client.external_plan_id(Plan::Free), None);
    }

    #[test]
    fn test_sandbox_is_default_api_base() {
        let client = test_client();
        assert_eq!(
            client.config.api_base(),
            "https://api-m.sandbox.paypal.com"
        );
    }
}
