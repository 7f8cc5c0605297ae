//! Configuration module
//!
//! Environment-driven configuration for the API and the media components.
//! Values are read once at startup and injected into the application state;
//! nothing in the request path reads the environment.

use std::env;

const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 16;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Maximum accepted upload size in bytes, enforced while streaming.
    pub max_upload_size_bytes: usize,
    /// Root prepended to relative media identifiers when rendering embeds.
    pub media_url_root: String,
    /// Directory the local storage backend writes stored media into.
    pub local_storage_path: String,
    /// Base URL stored media is served under.
    pub local_storage_base_url: String,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            media_url_root: env::var("MEDIA_URL_ROOT").unwrap_or_else(|_| "/media".to_string()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "media".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/media", SERVER_PORT)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.media_url_root.is_empty() {
            return Err(anyhow::anyhow!("MEDIA_URL_ROOT must not be empty"));
        }

        if self.local_storage_path.is_empty() || self.local_storage_base_url.is_empty() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            max_upload_size_bytes: 16 * 1024 * 1024,
            media_url_root: "/media".to_string(),
            local_storage_path: "media".to_string(),
            local_storage_base_url: "http://localhost:4000/media".to_string(),
        }
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://cms.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let mut config = base_config();
        config.max_upload_size_bytes = 0;
        assert!(config.validate().is_err());
    }
}
