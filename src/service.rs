use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    bedrock::BedrockClient,
    config::{Backend, Config},
    error::{LuminaError, Result},
    gemini::GeminiClient,
    mock::MockImageService,
    models::{AspectRatio, EncodedImage},
};

/// Remote multimodal capability the orchestrator talks to.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Describes `image` following `instruction`.
    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> Result<String>;

    /// One generation call. `Ok(None)` when the service answered without an image.
    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<S: ImageService + ?Sized> ImageService for Box<S> {
    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        (**self).analyze(image, instruction).await
    }

    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        (**self).generate(prompt, references, aspect_ratio).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<S: ImageService + ?Sized> ImageService for Arc<S> {
    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        (**self).analyze(image, instruction).await
    }

    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        (**self).generate(prompt, references, aspect_ratio).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Builds the backend selected in `config`.
pub async fn connect(config: &Config) -> Result<Box<dyn ImageService>> {
    let service: Box<dyn ImageService> = match config.backend {
        Backend::Gemini => {
            let gemini = config.gemini.clone().ok_or_else(|| {
                LuminaError::ConfigError("Gemini backend selected but not configured".into())
            })?;
            Box::new(GeminiClient::new(gemini)?)
        }
        Backend::Bedrock => {
            let bedrock = config.bedrock.clone().unwrap_or_default();
            Box::new(BedrockClient::new(bedrock).await?)
        }
        Backend::Mock => Box::new(MockImageService::new()),
    };

    log::info!("Using {} image service", service.name());
    Ok(service)
}
