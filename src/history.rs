//! Caller-owned record of completed batches.

use std::path::{Path, PathBuf};

use crate::{
    error::Result,
    models::{EncodedImage, GeneratedImage, GenerationBatch},
};

#[derive(Debug, Clone, Default)]
pub struct History {
    /// Newest first.
    batches: Vec<GenerationBatch>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, batch: GenerationBatch) {
        log::debug!("Recorded batch {} with {} images", batch.id(), batch.len());
        self.batches.insert(0, batch);
    }

    pub fn batches(&self) -> &[GenerationBatch] {
        &self.batches
    }

    pub fn latest(&self) -> Option<&GenerationBatch> {
        self.batches.first()
    }

    /// Every image across all batches, newest batch first.
    pub fn gallery(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.batches.iter().flat_map(|batch| batch.images().iter())
    }

    pub fn image_count(&self) -> usize {
        self.batches.iter().map(GenerationBatch::len).sum()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Writes every gallery image to `dir` as `lumina-<image id>.<ext>`.
    pub async fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await?;

        let mut written = Vec::with_capacity(self.image_count());
        for image in self.gallery() {
            let decoded = EncodedImage::from_data_url(&image.url)?;
            let path = dir.join(format!("lumina-{}.{}", image.id, decoded.extension()));
            tokio::fs::write(&path, &decoded.data).await?;
            written.push(path);
        }

        log::info!("Exported {} images to {}", written.len(), dir.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble_batch;
    use crate::models::{AspectRatio, GenerationMode};

    fn batch(prompt: &str, count: usize) -> GenerationBatch {
        let image = EncodedImage::new(vec![0x89, b'P', b'N', b'G'], "image/png");
        assemble_batch(
            prompt,
            GenerationMode::TextToImage,
            AspectRatio::Square,
            0,
            count,
            vec![image.to_data_url(); count],
        )
        .unwrap()
    }

    #[test]
    fn test_newest_batch_first() {
        let mut history = History::new();
        history.record(batch("first", 2));
        history.record(batch("second", 3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().prompt(), "second");
        assert_eq!(history.image_count(), 5);

        let prompts: Vec<&str> = history.gallery().map(|img| img.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "second", "second", "first", "first"]);
    }

    #[tokio::test]
    async fn test_export_writes_one_file_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("gallery");

        let mut history = History::new();
        history.record(batch("export me", 3));

        let written = history.export(&target).await.unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("lumina-") && name.ends_with(".png"));
            assert_eq!(std::fs::read(path).unwrap(), vec![0x89, b'P', b'N', b'G']);
        }
    }
}
