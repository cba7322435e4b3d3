use crate::config::GithubConfig;
use crate::error::{AppError, AppResult};
use crate::models::RepoInfo;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const API_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "webforge-backend";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Repo {
    id: i64,
    name: String,
    full_name: String,
    description: Option<String>,
    html_url: String,
    private: bool,
    language: Option<String>,
    updated_at: Option<String>,
    #[serde(default)]
    has_pages: bool,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
    download_url: Option<String>,
    sha: String,
}

#[derive(Debug, Clone)]
pub struct CreatedRepo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default)]
pub struct RepoContents {
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn authorize_url(&self) -> String {
        format!(
            "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope=repo,user",
            self.config.client_id, self.config.redirect_uri
        )
    }

    pub async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response = self
            .client
            .post("https://github.com/login/oauth/access_token")
            .header("Accept", "application/json")
            .json(&json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "code": code,
                "redirect_uri": self.config.redirect_uri,
            }))
            .send()
            .await?;

        let token: TokenResponse = response.json().await?;
        token.access_token.ok_or_else(|| {
            AppError::ExternalApiError("GitHub did not return an access token".to_string())
        })
    }

    pub async fn get_user(&self, token: &str) -> AppResult<GithubUser> {
        let response = self
            .client
            .get(format!("{API_BASE}/user"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(AppError::ExternalApiError(
                "Failed to fetch GitHub user".to_string(),
            ))
        }
    }

    pub async fn list_repositories(&self, token: &str) -> AppResult<Vec<RepoInfo>> {
        let response = self
            .client
            .get(format!("{API_BASE}/user/repos"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .query(&[("sort", "updated"), ("per_page", "100")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(
                "Failed to fetch repositories".to_string(),
            ));
        }

        let repos: Vec<Repo> = response.json().await?;
        Ok(repos
            .into_iter()
            .map(|repo| RepoInfo {
                id: repo.id,
                name: repo.name,
                full_name: repo.full_name,
                description: repo.description,
                url: repo.html_url,
                private: repo.private,
                language: repo.language,
                updated_at: repo.updated_at,
                has_pages: repo.has_pages,
            })
            .collect())
    }

    pub async fn create_repository(
        &self,
        token: &str,
        name: &str,
        description: &str,
        private: bool,
    ) -> AppResult<CreatedRepo> {
        let response = self
            .client
            .post(format!("{API_BASE}/user/repos"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .json(&json!({
                "name": name,
                "description": description,
                "private": private,
                "auto_init": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Failed to create repository: {text}"
            )));
        }

        let repo: Repo = response.json().await?;
        Ok(CreatedRepo {
            name: repo.name,
            full_name: repo.full_name,
            html_url: repo.html_url,
            owner: repo.owner.login,
        })
    }

    /// Creates or updates a file through the contents API. `sha` is required
    /// by GitHub when the file already exists.
    pub async fn put_file(
        &self,
        token: &str,
        repo_full_name: &str,
        path: &str,
        message: &str,
        content: &str,
        sha: Option<&str>,
    ) -> AppResult<()> {
        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .client
            .put(format!("{API_BASE}/repos/{repo_full_name}/contents/{path}"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalApiError(format!(
                "Failed to write {path}: {text}"
            )))
        }
    }

    pub async fn file_sha(
        &self,
        token: &str,
        repo_full_name: &str,
        path: &str,
    ) -> AppResult<Option<String>> {
        let response = self
            .client
            .get(format!("{API_BASE}/repos/{repo_full_name}/contents/{path}"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Failed to stat {path}"
            )));
        }

        let entry: ContentEntry = response.json().await?;
        Ok(Some(entry.sha))
    }

    /// Pulls the website files out of a repository root: the first HTML file
    /// plus concatenated CSS/JS files, falling back to inline style/script
    /// blocks embedded in the HTML.
    pub async fn read_site_files(
        &self,
        token: &str,
        repo_full_name: &str,
    ) -> AppResult<RepoContents> {
        let response = self
            .client
            .get(format!("{API_BASE}/repos/{repo_full_name}/contents"))
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(
                "Failed to read repository contents".to_string(),
            ));
        }

        let entries: Vec<ContentEntry> = response.json().await?;
        let mut contents = RepoContents::default();

        for entry in &entries {
            if entry.entry_type != "file" {
                continue;
            }
            let Some(download_url) = &entry.download_url else {
                continue;
            };

            let name = entry.name.as_str();
            let is_html = name == "index.html" || name.ends_with(".html");
            let is_css = name.ends_with(".css");
            let is_js = name.ends_with(".js")
                && !name.contains(".config")
                && !name.contains(".test");

            if !is_html && !is_css && !is_js {
                continue;
            }

            let body = self.client.get(download_url).send().await?.text().await?;
            if is_html && contents.html_code.is_empty() {
                contents.html_code = body;
            } else if is_css {
                contents.css_code.push_str(&body);
                contents.css_code.push('\n');
            } else if is_js {
                contents.js_code.push_str(&body);
                contents.js_code.push('\n');
            }
        }

        if !contents.html_code.is_empty() {
            if contents.css_code.is_empty() {
                if let Some(css) = extract_block(&contents.html_code, "style") {
                    contents.css_code = css;
                }
            }
            if contents.js_code.is_empty() {
                if let Some(js) = extract_block(&contents.html_code, "script") {
                    contents.js_code = js;
                }
            }
        }

        Ok(contents)
    }
}

fn extract_block(html: &str, tag: &str) -> Option<String> {
    let pattern = format!(r"(?s)<{tag}[^>]*>(.*?)</{tag}>");
    regex::Regex::new(&pattern)
        .ok()?
        .captures(html)
        .map(|c| c[1].to_string())
}

/// Assembles the single-file site pushed to `index.html`.
pub fn render_full_html(title: &str, html: &str, css: &str, js: &str) -> String {
    let style = if css.is_empty() {
        String::new()
    } else {
        format!("<style>{css}</style>")
    };
    let script = if js.is_empty() {
        String::new()
    } else {
        format!("<script>{js}</script>")
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         \x20   <meta charset=\"UTF-8\">\n\
         \x20   <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         \x20   <title>{title}</title>\n\
         \x20   {style}\n\
         </head>\n\
         <body>\n\
         {html}\n\
         {script}\n\
         </body>\n\
         </html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_html_includes_blocks() {
        let page = render_full_html("My Site", "<h1>Hi</h1>", "h1 { color: red; }", "alert(1);");
        assert!(page.contains("<title>My Site</title>"));
        assert!(page.contains("<style>h1 { color: red; }</style>"));
        assert!(page.contains("<script>alert(1);</script>"));
        assert!(page.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_render_full_html_omits_empty_blocks() {
        let page = render_full_html("Bare", "<p>x</p>", "", "");
        assert!(!page.contains("<style>"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_extract_block() {
        let html = "<html><style>a{}</style><script>b();</script></html>";
        assert_eq!(extract_block(html, "style").as_deref(), Some("a{}"));
        assert_eq!(extract_block(html, "script").as_deref(), Some("b();"));
        assert_eq!(extract_block("<html></html>", "style"), None);
    }
}
