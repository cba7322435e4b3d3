use crate::entities::templates;
use crate::error::{AppError, AppResult};
use crate::models::{TemplateQuery, TemplateResponse, TemplateSummary};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct TemplateService {
    pool: Arc<DatabaseConnection>,
}

impl TemplateService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// Catalog listing. Only active templates are visible.
    pub async fn list(&self, query: TemplateQuery) -> AppResult<Vec<TemplateSummary>> {
        let mut select = templates::Entity::find().filter(templates::Column::IsActive.eq(true));
        if let Some(category) = query.category {
            select = select.filter(templates::Column::Category.eq(category));
        }
        if let Some(is_premium) = query.is_premium {
            select = select.filter(templates::Column::IsPremium.eq(is_premium));
        }

        let rows = select
            .order_by_desc(templates::Column::UsageCount)
            .limit(query.limit.unwrap_or(50).min(200))
            .all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(TemplateSummary::from).collect())
    }

    /// Template detail with code blobs. Each fetch counts as one use.
    pub async fn get(&self, template_id: i64) -> AppResult<TemplateResponse> {
        let template = templates::Entity::find_by_id(template_id)
            .filter(templates::Column::IsActive.eq(true))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Template not found".to_string()))?;

        templates::Entity::update_many()
            .col_expr(
                templates::Column::UsageCount,
                Expr::col(templates::Column::UsageCount).add(1),
            )
            .filter(templates::Column::Id.eq(template.id))
            .exec(self.pool.as_ref())
            .await?;

        let mut response = TemplateResponse::from(template);
        response.usage_count += 1;
        Ok(response)
    }

    /// Category facets for the catalog filter bar.
    pub async fn categories(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = templates::Entity::find()
            .filter(templates::Column::IsActive.eq(true))
            .all(self.pool.as_ref())
            .await?;

        let mut counts: Vec<(String, i64)> = Vec::new();
        for row in rows {
            let key = serde_json::to_value(row.category)?
                .as_str()
                .unwrap_or("other")
                .to_string();
            match counts.iter_mut().find(|(name, _)| *name == key) {
                Some((_, count)) => *count += 1,
                None => counts.push((key, 1)),
            }
        }
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(counts)
    }
}
