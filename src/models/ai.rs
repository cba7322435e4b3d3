use crate::entities::projects::SiteType;
use crate::entities::users::Plan;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    #[schema(example = "A landing page for a coffee subscription service")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub site_type: Option<SiteType>,
    pub style: Option<String>,
    #[serde(rename = "includeJS")]
    pub include_js: Option<bool>,
    /// When set, the generated site is saved as a project with this name.
    #[serde(rename = "saveAs")]
    pub save_as: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<SavedProjectRef>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SavedProjectRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMeta {
    pub credits_remaining: i64,
    pub tokens_used: i64,
    pub model: String,
    pub plan: Plan,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImproveRequest {
    pub code: String,
    pub improvements: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResponse {
    pub html_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestionsRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditsResponse {
    pub credits: i64,
    pub plan: Plan,
    pub unlimited: bool,
    pub usage: super::user::UsageStats,
}
