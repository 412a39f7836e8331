use crate::{
    error::{LuminaError, Result},
    models::{ClaudeMessageResponse, EncodedImage},
};
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::json;

const ANALYSIS_MAX_TOKENS: u32 = 1024;

/// Vision-capable text model used to describe reference images.
#[derive(Clone)]
pub struct TextClient {
    client: Client,
    model_id: String,
}

impl TextClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("anthropic.claude-3-haiku-20240307-v1:0", "Claude 3 Haiku", "Anthropic"),
            ("anthropic.claude-3-sonnet-20240229-v1:0", "Claude 3 Sonnet", "Anthropic"),
            ("anthropic.claude-3-5-sonnet-20240620-v1:0", "Claude 3.5 Sonnet", "Anthropic"),
        ]
    }

    fn build_payload(image: &EncodedImage, instruction: &str) -> serde_json::Value {
        json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": ANALYSIS_MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": image.media_type,
                                "data": image.to_base64()
                            }
                        },
                        { "type": "text", "text": instruction }
                    ]
                }
            ]
        })
    }

    pub async fn describe(&self, image: &EncodedImage, instruction: &str) -> Result<String> {
        let model_id = self.model_id.as_str();
        if !(model_id.starts_with("anthropic.claude") || model_id.starts_with("arn:aws:bedrock")) {
            return Err(LuminaError::ConfigError(format!(
                "Unsupported vision model: {}",
                model_id
            )));
        }

        let request_json = serde_json::to_string(&Self::build_payload(image, instruction))?;

        log::info!("Invoking vision model: {}", model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("AWS SDK analysis error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    LuminaError::AnalysisError(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    LuminaError::AnalysisError(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        let message: ClaudeMessageResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| LuminaError::AnalysisError(format!("Invalid analysis response: {}", e)))?;

        log::debug!("Analysis stop reason: {:?}", message.stop_reason);
        Ok(message.text())
    }
}
