pub mod image_client;
pub mod text_client;

use crate::{
    config::BedrockConfig,
    error::Result,
    models::{AspectRatio, EncodedImage},
    service::ImageService,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_bedrockruntime::Client;

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// AWS Bedrock backend: Titan for generation, Claude for analysis.
#[derive(Clone)]
pub struct BedrockClient {
    image_client: ImageClient,
    text_client: TextClient,
}

impl BedrockClient {
    pub async fn new(bedrock_config: BedrockConfig) -> Result<Self> {
        let aws_config = load_sdk_config(&bedrock_config).await;
        let client = Client::new(&aws_config);

        Ok(Self {
            image_client: ImageClient::new(client.clone(), bedrock_config.image_model),
            text_client: TextClient::new(client, bedrock_config.vision_model),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }
}

/// Explicit credentials win; otherwise the default AWS provider chain applies.
async fn load_sdk_config(bedrock_config: &BedrockConfig) -> SdkConfig {
    if let (Some(access_key), Some(secret_key)) =
        (&bedrock_config.access_key, &bedrock_config.secret_key)
    {
        aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "lumina",
            ))
            .region(aws_sdk_bedrockruntime::config::Region::new(
                bedrock_config
                    .region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string()),
            ))
            .load()
            .await
    } else {
        aws_config::load_defaults(BehaviorVersion::latest()).await
    }
}

#[async_trait]
impl ImageService for BedrockClient {
    async fn analyze(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        self.text_client.describe(image, instruction).await
    }

    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        self.image_client
            .generate(prompt, references, aspect_ratio)
            .await
    }

    fn name(&self) -> &str {
        "bedrock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_credentials_build_sdk_config() {
        let config = BedrockConfig::new()
            .with_region("eu-west-1")
            .with_credentials("AKIDEXAMPLE", "secret");

        let sdk_config = load_sdk_config(&config).await;
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert!(sdk_config.credentials_provider().is_some());
        assert!(sdk_config.behavior_version().is_some());

        let client = BedrockClient::new(config).await.unwrap();
        assert_eq!(client.name(), "bedrock");
    }

    #[tokio::test]
    async fn test_region_defaults_with_explicit_credentials() {
        let config = BedrockConfig::new().with_credentials("AKIDEXAMPLE", "secret");
        let sdk_config = load_sdk_config(&config).await;
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("us-east-1"));
    }
}
