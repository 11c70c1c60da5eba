use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Pipeline configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub model: String,
    pub openai_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            model: env::var("PAGEWATCH_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            openai_base_url: env::var("PAGEWATCH_BASE_URL").ok(),
        })
    }
}
