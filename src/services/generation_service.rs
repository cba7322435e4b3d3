use crate::entities::project_entity as projects;
use crate::entities::projects::ProjectStatus;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::external::OpenAiClient;
use crate::external::openai::GenerateOptions;
use crate::models::{
    CreditsResponse, GenerateRequest, GenerateResponse, GenerationMeta, ImproveRequest,
    ImproveResponse, SavedProjectRef, UsageStats,
};
use crate::services::ledger_service::{LedgerService, can_generate};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;

const MIN_PROMPT_LEN: usize = 10;

/// Pre-flight gate plus LLM orchestration for the `/api/ai` surface. The
/// pre-call check is advisory; the post-call conditional decrement in the
/// ledger is what enforces the quota under concurrency.
#[derive(Clone)]
pub struct GenerationService {
    pool: Arc<DatabaseConnection>,
    ledger: LedgerService,
    openai: OpenAiClient,
}

impl GenerationService {
    pub fn new(pool: Arc<DatabaseConnection>, ledger: LedgerService, openai: OpenAiClient) -> Self {
        Self {
            pool,
            ledger,
            openai,
        }
    }

    pub async fn generate(
        &self,
        user_id: i64,
        request: GenerateRequest,
    ) -> AppResult<(GenerateResponse, GenerationMeta)> {
        let prompt = request.prompt.trim();
        if prompt.len() < MIN_PROMPT_LEN {
            return Err(AppError::ValidationError(format!(
                "Prompt must be at least {MIN_PROMPT_LEN} characters long"
            )));
        }

        let user = self.ledger.find_by_id(user_id).await?;
        self.check_gate(&user)?;

        let options = GenerateOptions {
            site_type: request.site_type,
            style: request.style.clone(),
            include_js: request.include_js.unwrap_or(false),
        };
        let site = self.openai.generate_website_code(prompt, &options).await?;

        // The provider call succeeded; only now is the credit consumed.
        let credits_remaining = self.settle(&user).await?;

        let project = if let Some(name) = request
            .save_as
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let saved = self
                .save_project(user_id, name, prompt, &site)
                .await?;
            Some(saved)
        } else {
            None
        };

        let response = GenerateResponse {
            html_code: site.html_code,
            css_code: site.css_code,
            js_code: site.js_code,
            site_type: site.site_type,
            project,
        };
        let meta = GenerationMeta {
            credits_remaining,
            tokens_used: site.tokens_used,
            model: site.model,
            plan: user.plan,
        };

        Ok((response, meta))
    }

    pub async fn improve(
        &self,
        user_id: i64,
        request: ImproveRequest,
    ) -> AppResult<(ImproveResponse, GenerationMeta)> {
        if request.code.trim().is_empty() || request.improvements.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Code and improvements are required".to_string(),
            ));
        }

        let user = self.ledger.find_by_id(user_id).await?;
        self.check_gate(&user)?;

        let improved = self
            .openai
            .improve_code(&request.code, &request.improvements)
            .await?;

        let credits_remaining = self.settle(&user).await?;

        Ok((
            ImproveResponse {
                html_code: improved.html_code,
            },
            GenerationMeta {
                credits_remaining,
                tokens_used: improved.tokens_used,
                model: String::new(),
                plan: user.plan,
            },
        ))
    }

    pub async fn design_suggestions(&self, prompt: &str) -> AppResult<(serde_json::Value, i64)> {
        if prompt.trim().is_empty() {
            return Err(AppError::ValidationError("Prompt is required".to_string()));
        }

        let result = self.openai.design_suggestions(prompt).await?;
        Ok((result.suggestions, result.tokens_used))
    }

    pub async fn credits(&self, user_id: i64) -> AppResult<CreditsResponse> {
        let user = self.ledger.find_by_id(user_id).await?;

        Ok(CreditsResponse {
            credits: user.credits,
            plan: user.plan,
            unlimited: user.plan.is_unlimited(),
            usage: UsageStats {
                total: user.total_generations,
                this_month: user.this_month_generations,
            },
        })
    }

    fn check_gate(&self, user: &users::Model) -> AppResult<()> {
        if can_generate(user.plan, user.credits) {
            Ok(())
        } else {
            Err(AppError::QuotaExceeded {
                credits: user.credits,
                plan: user.plan.to_string(),
            })
        }
    }

    /// At-most-one decrement per successful generation. Enterprise records
    /// usage only; every other plan must win the conditional decrement,
    /// which closes the window between the advisory check and here.
    async fn settle(&self, user: &users::Model) -> AppResult<i64> {
        if user.plan.is_unlimited() {
            self.ledger.record_generation(user.id).await?;
            return Ok(user.credits);
        }

        if !self.ledger.try_consume_credit(user.id).await? {
            return Err(AppError::QuotaExceeded {
                credits: 0,
                plan: user.plan.to_string(),
            });
        }
        self.ledger.record_generation(user.id).await?;

        let fresh = self.ledger.find_by_id(user.id).await?;
        Ok(fresh.credits)
    }

    async fn save_project(
        &self,
        user_id: i64,
        name: &str,
        prompt: &str,
        site: &crate::external::openai::GeneratedSite,
    ) -> AppResult<SavedProjectRef> {
        let now = Utc::now();
        let model = projects::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            prompt: Set(prompt.to_string()),
            html_code: Set(site.html_code.clone()),
            css_code: Set(site.css_code.clone()),
            js_code: Set(site.js_code.clone()),
            site_type: Set(site.site_type),
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
        let project = model.insert(self.pool.as_ref()).await?;

        Ok(SavedProjectRef {
            id: project.id,
            name: project.name,
        })
    }
}
