use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{LuminaError, Result},
    models::{AspectRatio, GeneratedImage, GenerationBatch, GenerationMode},
};

/// Packages successful image URLs into a batch record with fresh ids.
///
/// `requested` is the number of units that were dispatched; it is reported
/// back when none of them produced an image.
pub fn assemble_batch(
    prompt: &str,
    mode: GenerationMode,
    aspect_ratio: AspectRatio,
    reference_count: usize,
    requested: usize,
    urls: Vec<String>,
) -> Result<GenerationBatch> {
    if urls.is_empty() {
        return Err(LuminaError::NoOutputError { requested });
    }

    let images = urls
        .into_iter()
        .map(|url| GeneratedImage {
            id: Uuid::new_v4().to_string(),
            url,
            prompt: prompt.to_string(),
            aspect_ratio,
        })
        .collect();

    Ok(GenerationBatch::new(
        Uuid::new_v4().to_string(),
        Utc::now(),
        mode,
        prompt.to_string(),
        reference_count,
        images,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_url_gets_a_unique_id() {
        let urls: Vec<String> = (0..25).map(|i| format!("data:image/png;base64,{}", i)).collect();
        let batch = assemble_batch(
            "lighthouse in a storm",
            GenerationMode::TextToImage,
            AspectRatio::Landscape,
            0,
            30,
            urls.clone(),
        )
        .unwrap();

        assert_eq!(batch.len(), 25);
        let ids: HashSet<&str> = batch.images().iter().map(|img| img.id.as_str()).collect();
        assert_eq!(ids.len(), 25);
        assert!(!ids.contains(batch.id()));

        let returned: Vec<&str> = batch.images().iter().map(|img| img.url.as_str()).collect();
        assert_eq!(returned, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(batch
            .images()
            .iter()
            .all(|img| img.prompt == "lighthouse in a storm" && img.aspect_ratio == AspectRatio::Landscape));
    }

    #[test]
    fn test_metadata_is_carried() {
        let batch = assemble_batch(
            "x",
            GenerationMode::ImageToImage,
            AspectRatio::Square,
            3,
            1,
            vec!["data:image/png;base64,AA==".into()],
        )
        .unwrap();
        assert_eq!(batch.mode(), GenerationMode::ImageToImage);
        assert_eq!(batch.reference_count(), 3);
        assert_eq!(batch.prompt(), "x");
    }

    #[test]
    fn test_empty_success_list_is_no_output() {
        let result = assemble_batch("x", GenerationMode::TextToImage, AspectRatio::Square, 0, 8, vec![]);
        assert!(matches!(result, Err(LuminaError::NoOutputError { requested: 8 })));
    }
}
