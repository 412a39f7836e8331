//! Suggests a prompt from an uploaded reference image.

use crate::{
    error::{LuminaError, Result},
    models::EncodedImage,
    service::ImageService,
};

pub const ANALYSIS_INSTRUCTION: &str = "Analyze this image and provide a highly detailed, \
artistic prompt used to generate it. Focus on style, lighting, camera angle, and subject \
details. Return ONLY the prompt text.";

/// Asks the service for a prompt describing `image`.
pub async fn analyze_reference<S>(service: &S, image: &EncodedImage) -> Result<String>
where
    S: ImageService + ?Sized,
{
    let text = service
        .analyze(image, ANALYSIS_INSTRUCTION)
        .await
        .map_err(|e| match e {
            analysis @ LuminaError::AnalysisError(_) => analysis,
            other => LuminaError::AnalysisError(format!("Failed to analyze image: {}", other)),
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(LuminaError::AnalysisError(
            "Analysis returned no text".into(),
        ));
    }
    Ok(text.to_string())
}

/// Fills an empty prompt from the first uploaded reference.
///
/// Returns `None` when the prompt is already set, nothing was uploaded, or the
/// analysis failed. Failures are logged, never retried.
pub async fn autofill_prompt<S>(
    service: &S,
    current_prompt: &str,
    uploaded: &[EncodedImage],
) -> Option<String>
where
    S: ImageService + ?Sized,
{
    if !current_prompt.is_empty() {
        return None;
    }
    let first = uploaded.first()?;

    match analyze_reference(service, first).await {
        Ok(prompt) => {
            log::info!("Suggested prompt from reference image ({} chars)", prompt.len());
            Some(prompt)
        }
        Err(e) => {
            log::error!("Auto-analysis failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockImageService;

    fn reference() -> EncodedImage {
        EncodedImage::new(vec![1, 2, 3], "image/png")
    }

    #[tokio::test]
    async fn test_analysis_trims_reply() {
        let service = MockImageService::new().with_analysis("  neon city at dusk \n");
        let prompt = analyze_reference(&service, &reference()).await.unwrap();
        assert_eq!(prompt, "neon city at dusk");
    }

    #[tokio::test]
    async fn test_empty_reply_is_analysis_error() {
        let service = MockImageService::new().with_empty_analysis();
        let result = analyze_reference(&service, &reference()).await;
        assert!(matches!(result, Err(LuminaError::AnalysisError(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_analysis_error() {
        let service = MockImageService::new().with_failing_analysis();
        let result = analyze_reference(&service, &reference()).await;
        assert!(matches!(result, Err(LuminaError::AnalysisError(_))));
    }

    #[tokio::test]
    async fn test_autofill_only_when_prompt_empty() {
        let service = MockImageService::new().with_analysis("a red bicycle");

        assert_eq!(
            autofill_prompt(&service, "", &[reference()]).await.as_deref(),
            Some("a red bicycle")
        );
        assert_eq!(autofill_prompt(&service, "keep me", &[reference()]).await, None);
        assert_eq!(autofill_prompt(&service, "", &[]).await, None);
        assert_eq!(service.analyze_calls(), 1);
    }

    #[tokio::test]
    async fn test_autofill_swallows_failure() {
        let service = MockImageService::new().with_failing_analysis();
        assert_eq!(autofill_prompt(&service, "", &[reference()]).await, None);
        assert_eq!(service.generate_calls(), 0);
    }
}
