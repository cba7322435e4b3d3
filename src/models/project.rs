use crate::entities::projects::{self, ProjectStatus, SiteType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub prompt: String,
    pub html_code: String,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    #[serde(rename = "type")]
    pub site_type: Option<SiteType>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    pub status: Option<ProjectStatus>,
    pub is_public: Option<bool>,
}

impl UpdateProjectRequest {
    /// True when any of the three code blobs changes; bumps the version.
    pub fn touches_code(&self) -> bool {
        self.html_code.is_some() || self.css_code.is_some() || self.js_code.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
    #[serde(rename = "type")]
    pub site_type: Option<SiteType>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

/// Full project payload, returned by detail endpoints only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub prompt: String,
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    pub status: ProjectStatus,
    pub is_public: bool,
    pub views: i64,
    pub likes: i64,
    pub version: i64,
    pub last_edited: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<projects::Model> for ProjectResponse {
    fn from(p: projects::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            prompt: p.prompt,
            html_code: p.html_code,
            css_code: p.css_code,
            js_code: p.js_code,
            site_type: p.site_type,
            status: p.status,
            is_public: p.is_public,
            views: p.views,
            likes: p.likes,
            version: p.version,
            last_edited: p.last_edited,
            created_at: p.created_at,
        }
    }
}

/// List-view projection: the code blobs are omitted for payload size.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    pub status: ProjectStatus,
    pub is_public: bool,
    pub views: i64,
    pub likes: i64,
    pub version: i64,
    pub last_edited: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<projects::Model> for ProjectSummary {
    fn from(p: projects::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            site_type: p.site_type,
            status: p.status,
            is_public: p.is_public,
            views: p.views,
            likes: p.likes,
            version: p.version,
            last_edited: p.last_edited,
            created_at: p.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_query_uses_camel_case_params() {
        let query: ProjectQuery = serde_json::from_value(serde_json::json!({
            "type": "landing",
            "pageSize": 5
        }))
        .unwrap();
        assert_eq!(query.site_type, Some(SiteType::Landing));
        assert_eq!(query.page_size, Some(5));
    }
}
