use crate::entities::projects::{self, ProjectStatus, SiteType};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProjectRequest, PaginatedResponse, PaginationParams, ProjectQuery, ProjectResponse,
    ProjectSummary, UpdateProjectRequest,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProjectService {
    pool: Arc<DatabaseConnection>,
}

impl ProjectService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// Fetches a project scoped to its owner. A project belonging to someone
    /// else resolves exactly like a missing one.
    async fn find_owned(&self, user_id: i64, project_id: i64) -> AppResult<projects::Model> {
        projects::Entity::find_by_id(project_id)
            .filter(projects::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    pub async fn create(
        &self,
        user_id: i64,
        request: CreateProjectRequest,
    ) -> AppResult<ProjectResponse> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Project name is required".to_string(),
            ));
        }
        if name.len() > 100 {
            return Err(AppError::ValidationError(
                "Project name must be at most 100 characters".to_string(),
            ));
        }

        let now = Utc::now();
        let model = projects::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            description: Set(request.description),
            prompt: Set(request.prompt),
            html_code: Set(request.html_code),
            css_code: Set(request.css_code.unwrap_or_default()),
            js_code: Set(request.js_code.unwrap_or_default()),
            site_type: Set(request.site_type.unwrap_or(SiteType::Custom)),
            status: Set(ProjectStatus::Draft),
            is_public: Set(false),
            views: Set(0),
            likes: Set(0),
            version: Set(1),
            last_edited: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model.insert(self.pool.as_ref()).await?;
        Ok(ProjectResponse::from(created))
    }

    pub async fn list(
        &self,
        user_id: i64,
        query: ProjectQuery,
    ) -> AppResult<PaginatedResponse<ProjectSummary>> {
        let pagination = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };
        let page = pagination.get_page();
        let page_size = pagination.get_limit();

        let mut select = projects::Entity::find().filter(projects::Column::UserId.eq(user_id));
        if let Some(status) = query.status {
            select = select.filter(projects::Column::Status.eq(status));
        }
        if let Some(site_type) = query.site_type {
            select = select.filter(projects::Column::SiteType.eq(site_type));
        }

        let total = select.clone().count(self.pool.as_ref()).await? as i64;
        let rows = select
            .order_by_desc(projects::Column::CreatedAt)
            .offset(pagination.get_offset() as u64)
            .limit(page_size as u64)
            .all(self.pool.as_ref())
            .await?;

        let data = rows.into_iter().map(ProjectSummary::from).collect();
        Ok(PaginatedResponse::new(data, page, page_size, total))
    }

    pub async fn get(&self, user_id: i64, project_id: i64) -> AppResult<ProjectResponse> {
        let project = self.find_owned(user_id, project_id).await?;
        Ok(ProjectResponse::from(project))
    }

    pub async fn update(
        &self,
        user_id: i64,
        project_id: i64,
        request: UpdateProjectRequest,
    ) -> AppResult<ProjectResponse> {
        let project = self.find_owned(user_id, project_id).await?;

        let bump_version = request.touches_code();
        let current_version = project.version;
        let mut model = project.into_active_model();

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError(
                    "Project name is required".to_string(),
                ));
            }
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(html_code) = request.html_code {
            model.html_code = Set(html_code);
        }
        if let Some(css_code) = request.css_code {
            model.css_code = Set(css_code);
        }
        if let Some(js_code) = request.js_code {
            model.js_code = Set(js_code);
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        if let Some(is_public) = request.is_public {
            model.is_public = Set(is_public);
        }
        if bump_version {
            model.version = Set(current_version + 1);
            model.last_edited = Set(Utc::now());
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(self.pool.as_ref()).await?;
        Ok(ProjectResponse::from(updated))
    }

    pub async fn delete(&self, user_id: i64, project_id: i64) -> AppResult<()> {
        let project = self.find_owned(user_id, project_id).await?;
        projects::Entity::delete_by_id(project.id)
            .exec(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Clones an owned project as a new draft named "<name> (Copy)".
    pub async fn duplicate(&self, user_id: i64, project_id: i64) -> AppResult<ProjectResponse> {
        let source = self.find_owned(user_id, project_id).await?;

        let now = Utc::now();
        let copy = projects::ActiveModel {
            user_id: Set(user_id),
            name: Set(format!("{} (Copy)", source.name)),
            description: Set(source.description),
            prompt: Set(source.prompt),
            html_code: Set(source.html_code),
            css_code: Set(source.css_code),
            js_code: Set(source.js_code),
            site_type: Set(source.site_type),
            status: Set(ProjectStatus::Draft),
            is_public: Set(false),
            views: Set(0),
            likes: Set(0),
            version: Set(1),
            last_edited: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = copy.insert(self.pool.as_ref()).await?;
        Ok(ProjectResponse::from(created))
    }

    /// Public gallery: published, publicly shared projects from any owner,
    /// most viewed first.
    pub async fn explore(&self, limit: Option<u64>) -> AppResult<Vec<ProjectSummary>> {
        let rows = projects::Entity::find()
            .filter(projects::Column::IsPublic.eq(true))
            .filter(projects::Column::Status.eq(ProjectStatus::Published))
            .order_by_desc(projects::Column::Views)
            .limit(limit.unwrap_or(20).min(100))
            .all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ProjectSummary::from).collect())
    }

    /// Serves a single public project and counts the view.
    pub async fn view_public(&self, project_id: i64) -> AppResult<ProjectResponse> {
        let project = projects::Entity::find_by_id(project_id)
            .filter(projects::Column::IsPublic.eq(true))
            .filter(projects::Column::Status.eq(ProjectStatus::Published))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        projects::Entity::update_many()
            .col_expr(
                projects::Column::Views,
                Expr::col(projects::Column::Views).add(1),
            )
            .filter(projects::Column::Id.eq(project.id))
            .exec(self.pool.as_ref())
            .await?;

        let mut response = ProjectResponse::from(project);
        response.views += 1;
        Ok(response)
    }
}
