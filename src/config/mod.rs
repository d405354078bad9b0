use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_LOG_FILE: &str = "obra_crm.log";

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Key for the generative service. AI tools fail gracefully without it.
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub gemini_model: String,
    #[serde(default = "default_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Deserialize a Config from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)?;

        // An empty API_KEY= line in .env means "not configured"
        if config.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            config.api_key = None;
        }

        Ok(config)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    Config::load()
}
