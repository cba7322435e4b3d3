use crate::config::OpenAiConfig;
use crate::entities::projects::SiteType;
use crate::error::{AppError, AppResult};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    model: String,
    choices: Vec<ChatChoice>,
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: i64,
}

#[derive(Debug, Clone)]
pub struct GeneratedSite {
    pub html_code: String,
    pub css_code: String,
    pub js_code: String,
    pub site_type: SiteType,
    pub tokens_used: i64,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ImprovedSite {
    pub html_code: String,
    pub tokens_used: i64,
}

#[derive(Debug, Clone)]
pub struct DesignSuggestions {
    pub suggestions: serde_json::Value,
    pub tokens_used: i64,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub site_type: Option<SiteType>,
    pub style: Option<String>,
    pub include_js: bool,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        // The generation call runs a multi-thousand-token completion; the
        // timeout bounds it so a stuck provider cannot hold a request open.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub async fn generate_website_code(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> AppResult<GeneratedSite> {
        let requested_type = options.site_type.unwrap_or(SiteType::Custom);
        let style = options.style.as_deref().unwrap_or("modern");
        let js_rule = if options.include_js {
            "- Include minimal, vanilla JavaScript if needed for interactivity"
        } else {
            "- NO JavaScript unless absolutely necessary"
        };

        let system_prompt = format!(
            "You are an expert web developer. Generate complete, production-ready HTML code based on user requirements.\n\
             \n\
             REQUIREMENTS:\n\
             - Generate semantic, modern HTML5\n\
             - Include inline CSS within <style> tags (use modern CSS features like Grid, Flexbox)\n\
             - Make it fully responsive (mobile-first approach)\n\
             - Use modern design principles (clean, professional, accessible)\n\
             - NO external dependencies (no CDN links, no external libraries)\n\
             - Code must be complete and ready to use immediately\n\
             - Include proper meta tags for SEO\n\
             - Use CSS variables for theming\n\
             {js_rule}\n\
             \n\
             STYLE: {style}\n\
             TYPE: {requested_type:?}\n\
             \n\
             OUTPUT FORMAT:\n\
             Return ONLY valid HTML code, nothing else. No explanations, no markdown code blocks, just pure HTML."
        );

        let completion = self.chat(&system_prompt, prompt, 0.7, None).await?;
        let generated = completion.choices.first().map(|c| c.message.content.trim()).ok_or_else(
            || AppError::ExternalApiError("Empty completion from OpenAI".to_string()),
        )?;

        let html_code = extract_html(generated);
        let css_code = extract_css(generated);
        let js_code = extract_js(generated);

        let site_type = if requested_type == SiteType::Custom {
            detect_site_type(&html_code)
        } else {
            requested_type
        };

        Ok(GeneratedSite {
            html_code,
            css_code,
            js_code,
            site_type,
            tokens_used: completion.usage.total_tokens,
            model: completion.model,
        })
    }

    pub async fn improve_code(&self, current_code: &str, improvements: &str) -> AppResult<ImprovedSite> {
        let system_prompt = "You are an expert web developer. Improve the given HTML code based on user requirements.\n\nReturn ONLY the improved HTML code, nothing else.";
        let user_prompt =
            format!("Current code:\n\n{current_code}\n\nImprovements requested:\n{improvements}");

        let completion = self.chat(system_prompt, &user_prompt, 0.7, None).await?;
        let improved = completion.choices.first().map(|c| c.message.content.trim()).ok_or_else(
            || AppError::ExternalApiError("Empty completion from OpenAI".to_string()),
        )?;

        Ok(ImprovedSite {
            html_code: extract_html(improved),
            tokens_used: completion.usage.total_tokens,
        })
    }

    pub async fn design_suggestions(&self, prompt: &str) -> AppResult<DesignSuggestions> {
        let system_prompt = "You are a UX/UI design expert. Based on the user's website idea, suggest:\n\
             1. Color palette (3-5 colors with hex codes)\n\
             2. Font suggestions\n\
             3. Layout recommendations\n\
             4. Key features to include\n\
             \n\
             Return as JSON object with keys: colors, fonts, layout, features";

        let completion = self
            .chat(system_prompt, prompt, 0.8, Some(json!({ "type": "json_object" })))
            .await?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AppError::ExternalApiError("Empty completion from OpenAI".to_string()))?;

        Ok(DesignSuggestions {
            suggestions: serde_json::from_str(content)?,
            tokens_used: completion.usage.total_tokens,
        })
    }

    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        response_format: Option<serde_json::Value>,
    ) -> AppResult<ChatCompletion> {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            "temperature": temperature,
            "max_tokens": MAX_TOKENS,
        });
        if let Some(format) = response_format {
            body["response_format"] = format;
        }

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = match status.as_u16() {
                401 => "Invalid OpenAI API key".to_string(),
                429 => "OpenAI rate limit exceeded. Please try again later.".to_string(),
                500..=599 => "OpenAI service error. Please try again.".to_string(),
                _ => {
                    let text = response.text().await.unwrap_or_default();
                    format!("OpenAI request failed ({status}): {text}")
                }
            };
            Err(AppError::ExternalApiError(message))
        }
    }
}

fn extract_html(code: &str) -> String {
    if code.contains("<!DOCTYPE html>") || code.contains("<html") {
        return code.to_string();
    }

    // Strip a markdown fence if the model ignored the output format rule.
    let fence = Regex::new(r"(?s)```html\n(.*?)\n```").unwrap();
    if let Some(captures) = fence.captures(code) {
        return captures[1].to_string();
    }

    code.to_string()
}

fn extract_css(code: &str) -> String {
    let style = Regex::new(r"(?s)<style[^>]*>(.*?)</style>").unwrap();
    style
        .captures(code)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn extract_js(code: &str) -> String {
    let script = Regex::new(r"(?s)<script[^>]*>(.*?)</script>").unwrap();
    script
        .captures(code)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn detect_site_type(html_code: &str) -> SiteType {
    let lower = html_code.to_lowercase();

    if lower.contains("dashboard") || lower.contains("sidebar") || lower.contains("stats") {
        SiteType::Dashboard
    } else if lower.contains("portfolio") || lower.contains("projects") || lower.contains("gallery")
    {
        SiteType::Portfolio
    } else if lower.contains("blog") || lower.contains("article") || lower.contains("post") {
        SiteType::Blog
    } else if lower.contains("shop") || lower.contains("product") || lower.contains("cart") {
        SiteType::Ecommerce
    } else if lower.contains("hero") || lower.contains("cta") || lower.contains("features") {
        SiteType::Landing
    } else {
        SiteType::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_html_passthrough() {
        let code = "<!DOCTYPE html>\n<html><body>hi</body></html>";
        assert_eq!(extract_html(code), code);
    }

    #[test]
    fn test_extract_html_from_markdown_fence() {
        let code = "```html\n<div>hello</div>\n```";
        assert_eq!(extract_html(code), "<div>hello</div>");
    }

    #[test]
    fn test_extract_css_and_js() {
        let code = "<html><head><style>body { margin: 0; }</style></head>\
                    <body><script>console.log(1);</script></body></html>";
        assert_eq!(extract_css(code), "body { margin: 0; }");
        assert_eq!(extract_js(code), "console.log(1);");
    }

    #[test]
    fn test_extract_css_absent() {
        assert_eq!(extract_css("<html></html>"), "");
    }

    #[test]
    fn test_detect_site_type() {
        assert_eq!(
            detect_site_type("<div class=\"sidebar\">stats</div>"),
            SiteType::Dashboard
        );
        assert_eq!(
            detect_site_type("<section class=\"hero\"><a class=\"cta\">Go</a></section>"),
            SiteType::Landing
        );
        assert_eq!(detect_site_type("<p>plain page</p>"), SiteType::Custom);
    }
}
