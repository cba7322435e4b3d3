use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub openai: OpenAiConfig,
    pub paypal: PayPalConfig,
    #[serde(default)]
    pub github: GithubConfig,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_openai_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalConfig {
    pub client_id: String,
    pub secret: String,
    /// "live" or "sandbox"
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub basic_plan_id: String,
    #[serde(default)]
    pub pro_plan_id: String,
    #[serde(default)]
    pub enterprise_plan_id: String,
}

impl PayPalConfig {
    pub fn api_base(&self) -> &'static str {
        if self.mode == "live" {
            "https://api-m.paypal.com"
        } else {
            "https://api-m.sandbox.paypal.com"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| anyhow::anyhow!("failed to parse {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build entirely from environment variables.
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL is required when {config_path} is absent")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 604_800i64),
                    },
                    openai: OpenAiConfig {
                        api_key: get_env("OPENAI_API_KEY").unwrap_or_default(),
                        model: get_env("OPENAI_MODEL").unwrap_or_else(default_openai_model),
                        timeout_secs: get_env_parse("OPENAI_TIMEOUT_SECS", default_openai_timeout()),
                    },
                    paypal: PayPalConfig {
                        client_id: get_env("PAYPAL_CLIENT_ID").unwrap_or_default(),
                        secret: get_env("PAYPAL_SECRET").unwrap_or_default(),
                        mode: get_env("PAYPAL_MODE").unwrap_or_default(),
                        basic_plan_id: get_env("PAYPAL_BASIC_PLAN_ID").unwrap_or_default(),
                        pro_plan_id: get_env("PAYPAL_PRO_PLAN_ID").unwrap_or_default(),
                        enterprise_plan_id: get_env("PAYPAL_ENTERPRISE_PLAN_ID")
                            .unwrap_or_default(),
                    },
                    github: GithubConfig {
                        client_id: get_env("GITHUB_CLIENT_ID").unwrap_or_default(),
                        client_secret: get_env("GITHUB_CLIENT_SECRET").unwrap_or_default(),
                        redirect_uri: get_env("GITHUB_REDIRECT_URI").unwrap_or_default(),
                    },
                    frontend_url: get_env("FRONTEND_URL")
                        .unwrap_or_else(|| "http://localhost:5173".to_string()),
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("failed to read {config_path}: {e}"));
            }
        };

        // Environment variables override the file when both are present.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            config.openai.api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            config.openai.model = v;
        }
        if let Ok(v) = env::var("OPENAI_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.openai.timeout_secs = n;
        }
        if let Ok(v) = env::var("PAYPAL_CLIENT_ID") {
            config.paypal.client_id = v;
        }
        if let Ok(v) = env::var("PAYPAL_SECRET") {
            config.paypal.secret = v;
        }
        if let Ok(v) = env::var("PAYPAL_MODE") {
            config.paypal.mode = v;
        }
        if let Ok(v) = env::var("PAYPAL_BASIC_PLAN_ID") {
            config.paypal.basic_plan_id = v;
        }
        if let Ok(v) = env::var("PAYPAL_PRO_PLAN_ID") {
            config.paypal.pro_plan_id = v;
        }
        if let Ok(v) = env::var("PAYPAL_ENTERPRISE_PLAN_ID") {
            config.paypal.enterprise_plan_id = v;
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_ID") {
            config.github.client_id = v;
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_SECRET") {
            config.github.client_secret = v;
        }
        if let Ok(v) = env::var("GITHUB_REDIRECT_URI") {
            config.github.redirect_uri = v;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            config.frontend_url = v;
        }

        Ok(config)
    }
}
