use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::LuminaError;
use crate::executor::DEFAULT_CONCURRENCY;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BEDROCK_IMAGE_MODEL: &str = "amazon.titan-image-generator-v2:0";
pub const DEFAULT_BEDROCK_VISION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Gemini,
    Bedrock,
    Mock,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => write!(f, "gemini"),
            Backend::Bedrock => write!(f, "bedrock"),
            Backend::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for Backend {
    type Err = LuminaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Backend::Gemini),
            "bedrock" | "aws" => Ok(Backend::Bedrock),
            "mock" | "offline" => Ok(Backend::Mock),
            other => Err(LuminaError::ConfigError(format!(
                "Unknown backend '{}', expected gemini, bedrock or mock",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_model: String,
    pub vision_model: String,
    pub request_timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            vision_model: DEFAULT_GEMINI_VISION_MODEL.to_string(),
            request_timeout: None,
        }
    }

    /// `None` when neither `GEMINI_API_KEY` nor `API_KEY` is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("GEMINI_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Ok(model) = env::var("GEMINI_VISION_MODEL") {
            config.vision_model = model;
        }
        config.request_timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);
        Some(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, image_model: impl Into<String>, vision_model: impl Into<String>) -> Self {
        self.image_model = image_model.into();
        self.vision_model = vision_model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub image_model: String,
    pub vision_model: String,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
            image_model: DEFAULT_BEDROCK_IMAGE_MODEL.to_string(),
            vision_model: DEFAULT_BEDROCK_VISION_MODEL.to_string(),
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self {
            region: env::var("AWS_REGION")
                .or_else(|_| env::var("AWS_DEFAULT_REGION"))
                .ok(),
            access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            ..Default::default()
        };
        if let Ok(model) = env::var("BEDROCK_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Ok(model) = env::var("BEDROCK_VISION_MODEL") {
            config.vision_model = model;
        }
        config
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_models(mut self, image_model: impl Into<String>, vision_model: impl Into<String>) -> Self {
        self.image_model = image_model.into();
        self.vision_model = vision_model.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub max_concurrency: usize,
    pub unit_timeout: Option<Duration>,
    pub gemini: Option<GeminiConfig>,
    pub bedrock: Option<BedrockConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            max_concurrency: DEFAULT_CONCURRENCY,
            unit_timeout: None,
            gemini: None,
            bedrock: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self, LuminaError> {
        let backend = match env::var("LUMINA_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => Backend::default(),
        };

        let max_concurrency = match env::var("LUMINA_CONCURRENCY") {
            Ok(value) => value.parse::<usize>().map_err(|e| {
                LuminaError::ConfigError(format!("Invalid LUMINA_CONCURRENCY '{}': {}", value, e))
            })?,
            Err(_) => DEFAULT_CONCURRENCY,
        };

        let unit_timeout = env::var("LUMINA_UNIT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        Ok(Config {
            backend,
            max_concurrency: max_concurrency.max(1),
            unit_timeout,
            gemini: GeminiConfig::from_env(),
            bedrock: Some(BedrockConfig::from_env()),
        })
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = Some(timeout);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = Some(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.backend, Backend::Gemini);
        assert_eq!(config.max_concurrency, 3);
        assert!(config.unit_timeout.is_none());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("Bedrock".parse::<Backend>().unwrap(), Backend::Bedrock);
        assert_eq!("offline".parse::<Backend>().unwrap(), Backend::Mock);
        assert!("openai".parse::<Backend>().is_err());
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_backend(Backend::Mock)
            .with_concurrency(0)
            .with_unit_timeout(Duration::from_secs(30))
            .with_gemini(GeminiConfig::new("key").with_base_url("http://localhost:8080"));

        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.unit_timeout, Some(Duration::from_secs(30)));
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.base_url, "http://localhost:8080");
        assert_eq!(gemini.image_model, DEFAULT_GEMINI_IMAGE_MODEL);

        let bedrock = BedrockConfig::new()
            .with_region("eu-west-1")
            .with_credentials("ak", "sk");
        assert_eq!(bedrock.region.as_deref(), Some("eu-west-1"));
        assert_eq!(bedrock.image_model, DEFAULT_BEDROCK_IMAGE_MODEL);
    }
}
