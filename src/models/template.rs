use crate::entities::templates::{self, TemplateCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TemplateQuery {
    pub category: Option<TemplateCategory>,
    #[serde(rename = "isPremium")]
    pub is_premium: Option<bool>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: i64,
    pub name: String,
    pub category: TemplateCategory,
    pub description: String,
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
    pub is_premium: bool,
    pub usage_count: i64,
    pub rating: TemplateRating,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateRating {
    pub average: f64,
    pub count: i64,
}

impl From<templates::Model> for TemplateResponse {
    fn from(t: templates::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            category: t.category,
            description: t.description,
            html_code: t.html_code,
            css_code: t.css_code,
            js_code: t.js_code,
            is_premium: t.is_premium,
            usage_count: t.usage_count,
            rating: TemplateRating {
                average: t.rating_average,
                count: t.rating_count,
            },
            created_at: t.created_at,
        }
    }
}

/// List-view projection without the code blobs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub category: TemplateCategory,
    pub description: String,
    pub is_premium: bool,
    pub usage_count: i64,
    pub rating: TemplateRating,
}

impl From<templates::Model> for TemplateSummary {
    fn from(t: templates::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            category: t.category,
            description: t.description,
            is_premium: t.is_premium,
            usage_count: t.usage_count,
            rating: TemplateRating {
                average: t.rating_average,
                count: t.rating_count,
            },
        }
    }
}
