use crate::{
    error::{LuminaError, Result},
    models::{AspectRatio, EncodedImage, TitanImageResponse},
};
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::json;

/// Titan's IMAGE_VARIATION task takes between one and five source images.
pub const MAX_VARIATION_IMAGES: usize = 5;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    model_id: String,
}

impl ImageClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("amazon.titan-image-generator-v2:0", "Titan Image Generator G1 v2", "Amazon"),
            ("amazon.titan-image-generator-v1", "Titan Image Generator G1", "Amazon"),
        ]
    }

    /// Closest Titan output size for each aspect ratio.
    pub fn dimensions(aspect_ratio: AspectRatio) -> (u32, u32) {
        match aspect_ratio {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait => (768, 1408),
            AspectRatio::Landscape => (1408, 768),
            AspectRatio::ClassicPortrait => (896, 1152),
            AspectRatio::ClassicLandscape => (1152, 896),
        }
    }

    fn build_payload(
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> serde_json::Value {
        let (width, height) = Self::dimensions(aspect_ratio);
        let generation_config = json!({
            "numberOfImages": 1,
            "quality": "standard",
            "cfgScale": 8.0,
            "width": width,
            "height": height
        });

        if references.is_empty() {
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": { "text": prompt },
                "imageGenerationConfig": generation_config
            })
        } else {
            if references.len() > MAX_VARIATION_IMAGES {
                log::warn!(
                    "Titan accepts at most {} variation images, sending the first {} of {}",
                    MAX_VARIATION_IMAGES,
                    MAX_VARIATION_IMAGES,
                    references.len()
                );
            }
            let images: Vec<String> = references
                .iter()
                .take(MAX_VARIATION_IMAGES)
                .map(EncodedImage::to_base64)
                .collect();
            json!({
                "taskType": "IMAGE_VARIATION",
                "imageVariationParams": {
                    "text": prompt,
                    "images": images,
                    "similarityStrength": 0.7
                },
                "imageGenerationConfig": generation_config
            })
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        if !self.model_id.starts_with("amazon.titan-image") {
            return Err(LuminaError::ConfigError(format!(
                "Unsupported image model: {}",
                self.model_id
            )));
        }

        let request_payload = Self::build_payload(prompt, references, aspect_ratio);
        let request_json = serde_json::to_string(&request_payload)?;

        log::debug!("Generating image with model: {}", self.model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_error) => LuminaError::TransportError(format!(
                    "Bedrock service error: {} - {}",
                    service_error.code().unwrap_or("unknown"),
                    service_error.message().unwrap_or("no message")
                )),
                None => LuminaError::TransportError(format!("AWS SDK error: {}", e)),
            })?;

        let response_bytes = response.body.into_inner();
        let titan_response: TitanImageResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| LuminaError::ResponseError(e.to_string()))?;

        if let Some(error) = titan_response.error.filter(|e| !e.is_empty()) {
            return Err(LuminaError::ResponseError(error));
        }

        match titan_response.images.first() {
            Some(image) => EncodedImage::from_base64(image, "image/png").map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_image_payload() {
        let payload = ImageClient::build_payload("a koi pond", &[], AspectRatio::Landscape);
        assert_eq!(payload["taskType"], "TEXT_IMAGE");
        assert_eq!(payload["textToImageParams"]["text"], "a koi pond");
        assert_eq!(payload["imageGenerationConfig"]["width"], 1408);
        assert_eq!(payload["imageGenerationConfig"]["height"], 768);
    }

    #[test]
    fn test_references_switch_to_image_variation() {
        let reference = EncodedImage::new(vec![1, 2, 3], "image/png");
        let payload = ImageClient::build_payload("a koi pond", &[reference], AspectRatio::Square);
        assert_eq!(payload["taskType"], "IMAGE_VARIATION");
        assert_eq!(payload["imageVariationParams"]["images"][0], "AQID");
    }

    #[test]
    fn test_variation_images_limited_to_five() {
        let references: Vec<EncodedImage> = (0..7u8)
            .map(|i| EncodedImage::new(vec![i], "image/png"))
            .collect();
        let payload = ImageClient::build_payload("a koi pond", &references, AspectRatio::Square);

        let images = payload["imageVariationParams"]["images"].as_array().unwrap();
        assert_eq!(images.len(), MAX_VARIATION_IMAGES);
        assert_eq!(images[0], EncodedImage::new(vec![0], "image/png").to_base64());
        assert_eq!(images[4], EncodedImage::new(vec![4], "image/png").to_base64());
    }

    #[test]
    fn test_every_ratio_has_matching_orientation() {
        for ratio in AspectRatio::ALL {
            let (width, height) = ImageClient::dimensions(ratio);
            match ratio {
                AspectRatio::Square => assert_eq!(width, height),
                AspectRatio::Portrait | AspectRatio::ClassicPortrait => assert!(height > width),
                AspectRatio::Landscape | AspectRatio::ClassicLandscape => assert!(width > height),
            }
        }
    }
}
