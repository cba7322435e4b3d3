use crate::entities::users;
use crate::error::{AppError, AppResult};
use crate::external::GithubClient;
use crate::external::github::render_full_html;
use crate::models::{
    CreateRepoRequest, CreateRepoResponse, ReadRepoRequest, ReadRepoResponse, RepoInfo,
    UpdateRepoRequest,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use std::sync::Arc;

#[derive(Clone)]
pub struct GithubService {
    pool: Arc<DatabaseConnection>,
    client: GithubClient,
    frontend_url: String,
}

impl GithubService {
    pub fn new(pool: Arc<DatabaseConnection>, client: GithubClient, frontend_url: String) -> Self {
        Self {
            pool,
            client,
            frontend_url,
        }
    }

    pub fn authorize_url(&self) -> String {
        self.client.authorize_url()
    }

    /// Completes the OAuth dance and hands the access token back to the
    /// frontend through redirect query parameters. GitHub tokens and login
    /// names are URL-safe as issued.
    pub async fn callback(&self, code: &str) -> String {
        match self.exchange(code).await {
            Ok((token, login)) => format!(
                "{}/github-connected?token={token}&username={login}",
                self.frontend_url
            ),
            Err(e) => {
                log::error!("GitHub OAuth callback failed: {e}");
                format!("{}/github-connected?error=oauth_failed", self.frontend_url)
            }
        }
    }

    async fn exchange(&self, code: &str) -> AppResult<(String, String)> {
        let token = self.client.exchange_code(code).await?;
        let user = self.client.get_user(&token).await?;
        Ok((token, user.login))
    }

    /// Links the GitHub login to the signed-in account.
    pub async fn connect(&self, user_id: i64, github_token: &str) -> AppResult<String> {
        let login = self.client.get_user(github_token).await?.login;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut model = user.into_active_model();
        model.github_username = Set(Some(login.clone()));
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(login)
    }

    pub async fn disconnect(&self, user_id: i64) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut model = user.into_active_model();
        model.github_username = Set(None);
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn list_repositories(&self, github_token: &str) -> AppResult<Vec<RepoInfo>> {
        self.client.list_repositories(github_token).await
    }

    pub async fn read_repository(&self, request: ReadRepoRequest) -> AppResult<ReadRepoResponse> {
        let contents = self
            .client
            .read_site_files(&request.github_token, &request.repo_full_name)
            .await?;

        if contents.html_code.is_empty() {
            return Err(AppError::NotFound(
                "No HTML file found in repository".to_string(),
            ));
        }

        let repo_name = request
            .repo_full_name
            .rsplit('/')
            .next()
            .unwrap_or(&request.repo_full_name)
            .to_string();

        Ok(ReadRepoResponse {
            html_code: contents.html_code,
            css_code: contents.css_code,
            js_code: contents.js_code,
            repo_name,
        })
    }

    /// Creates a repository and pushes the site files into it.
    pub async fn create_repository(
        &self,
        request: CreateRepoRequest,
    ) -> AppResult<CreateRepoResponse> {
        let name = request.repo_name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Repository name is required".to_string(),
            ));
        }

        let repo = self
            .client
            .create_repository(
                &request.github_token,
                name,
                request
                    .repo_description
                    .as_deref()
                    .unwrap_or("Website built with WebForge"),
                request.is_private,
            )
            .await?;

        self.push_site_files(
            &request.github_token,
            &repo.full_name,
            &repo.name,
            request.html_code.as_deref().unwrap_or_default(),
            request.css_code.as_deref().unwrap_or_default(),
            request.js_code.as_deref().unwrap_or_default(),
            "Initial website commit",
        )
        .await?;

        Ok(CreateRepoResponse {
            repo_url: repo.html_url,
            repo_name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner,
        })
    }

    /// Pushes updated site files onto an existing repository.
    pub async fn update_repository(&self, request: UpdateRepoRequest) -> AppResult<()> {
        let repo_name = request
            .repo_full_name
            .rsplit('/')
            .next()
            .unwrap_or(&request.repo_full_name);
        let message = request
            .commit_message
            .as_deref()
            .unwrap_or("Update website");

        self.push_site_files(
            &request.github_token,
            &request.repo_full_name,
            repo_name,
            request.html_code.as_deref().unwrap_or_default(),
            request.css_code.as_deref().unwrap_or_default(),
            request.js_code.as_deref().unwrap_or_default(),
            message,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn push_site_files(
        &self,
        token: &str,
        repo_full_name: &str,
        title: &str,
        html: &str,
        css: &str,
        js: &str,
        message: &str,
    ) -> AppResult<()> {
        let full_html = render_full_html(title, html, css, js);

        let sha = self.client.file_sha(token, repo_full_name, "index.html").await?;
        self.client
            .put_file(
                token,
                repo_full_name,
                "index.html",
                message,
                &full_html,
                sha.as_deref(),
            )
            .await?;

        if !css.is_empty() {
            let sha = self.client.file_sha(token, repo_full_name, "styles.css").await?;
            self.client
                .put_file(token, repo_full_name, "styles.css", message, css, sha.as_deref())
                .await?;
        }
        if !js.is_empty() {
            let sha = self.client.file_sha(token, repo_full_name, "script.js").await?;
            self.client
                .put_file(token, repo_full_name, "script.js", message, js, sha.as_deref())
                .await?;
        }

        Ok(())
    }
}
