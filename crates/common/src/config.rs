use std::env;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Environment-derived configuration, read once at process start.
/// No hot reload: changing a value requires a restart.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the generative-language endpoint. Chat degrades to
    /// canned fallbacks when absent; browsing is unaffected.
    pub gemini_api_key: Option<String>,
    /// Email that identifies the admin account.
    pub admin_email: Option<String>,
    /// Base URL of the backend that hosts the message and opportunity
    /// collections plus the job/internship/volunteer feeds.
    pub backend_base_url: String,
}

impl Config {
    /// Loads configuration from the environment, reading `.env` first if
    /// one is present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            gemini_api_key: read_non_empty("GEMINI_API_KEY"),
            admin_email: read_non_empty("ADMIN_EMAIL"),
            backend_base_url: read_non_empty("BACKEND_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            admin_email: None,
            backend_base_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

fn read_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
