use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::GeminiConfig,
    error::{LuminaError, Result},
    models::{
        AspectRatio, EncodedImage, GeminiContent, GeminiGenerationConfig, GeminiImageConfig,
        GeminiPart, GeminiRequest, GeminiResponse,
    },
    service::ImageService,
};

/// Gemini `generateContent` client: one model for images, one for analysis.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LuminaError::ConfigError("Gemini API key is required".into()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LuminaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LuminaError::TransportError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::debug!("Gemini error body: {}", error_text);
            return Err(LuminaError::TransportError(format!(
                "Gemini responded with {}: {}",
                status, error_text
            )));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| LuminaError::ResponseError(format!("Invalid Gemini response: {}", e)))
    }
}

fn inline_part(image: &EncodedImage) -> GeminiPart {
    GeminiPart::inline(image.media_type.clone(), image.to_base64())
}

#[async_trait]
impl ImageService for GeminiClient {
    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![inline_part(image), GeminiPart::text(instruction)],
            }],
            generation_config: None,
        };

        log::info!("Analyzing reference image with model: {}", self.config.vision_model);
        let response = self
            .generate_content(&self.config.vision_model, &request)
            .await
            .map_err(|e| LuminaError::AnalysisError(e.to_string()))?;

        Ok(response.text())
    }

    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        let mut parts: Vec<GeminiPart> = references.iter().map(inline_part).collect();
        parts.push(GeminiPart::text(prompt));

        let request = GeminiRequest {
            contents: vec![GeminiContent { role: None, parts }],
            generation_config: Some(GeminiGenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(GeminiImageConfig {
                    aspect_ratio: aspect_ratio.as_str().to_string(),
                }),
            }),
        };

        log::debug!("Generating image with model: {}", self.config.image_model);
        let response = self.generate_content(&self.config.image_model, &request).await?;

        match response.first_inline_data() {
            Some(inline) => EncodedImage::from_base64(&inline.data, inline.mime_type.clone()).map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let result = GeminiClient::new(GeminiConfig::new("  "));
        assert!(matches!(result, Err(LuminaError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_format() {
        let client = GeminiClient::new(GeminiConfig::new("key").with_base_url("http://localhost:9000/")).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash-image"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }
}
