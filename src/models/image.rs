use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LuminaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "3:4")]
    ClassicPortrait,
    #[serde(rename = "4:3")]
    ClassicLandscape,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::ClassicPortrait,
        AspectRatio::ClassicLandscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
            AspectRatio::ClassicPortrait => "3:4",
            AspectRatio::ClassicLandscape => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = LuminaError;

    fn from_str(s: &str) -> Result<Self> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                LuminaError::ValidationError(format!(
                    "Unsupported aspect ratio '{}', expected one of 1:1, 9:16, 16:9, 3:4, 4:3",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationMode {
    #[default]
    TextToImage,
    ImageToImage,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::ImageToImage => "image-to-image",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = LuminaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "t2i" | "text-to-image" | "text_to_image" => Ok(GenerationMode::TextToImage),
            "image" | "i2i" | "image-to-image" | "image_to_image" => {
                Ok(GenerationMode::ImageToImage)
            }
            other => Err(LuminaError::ValidationError(format!(
                "Unknown generation mode '{}'",
                other
            ))),
        }
    }
}

/// An image payload ready to be sent inline to a multimodal model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Decodes a base64 payload, tolerating a leading `data:<type>;base64,` prefix.
    pub fn from_base64(encoded: &str, media_type: impl Into<String>) -> Result<Self> {
        let payload = match encoded.split_once(',') {
            Some((_, rest)) => rest,
            None => encoded,
        };
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| LuminaError::ResponseError(format!("Invalid base64 payload: {}", e)))?;
        Ok(Self::new(data, media_type))
    }

    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| LuminaError::ResponseError("Not a data URL".into()))?;

        let media_type = header.strip_suffix(";base64").ok_or_else(|| {
            LuminaError::ResponseError("Only base64 data URLs are supported".into())
        })?;

        Self::from_base64(payload, media_type)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }

    /// File extension matching the media type, `bin` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "bin",
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub references: Vec<EncodedImage>,
    pub mode: GenerationMode,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            ..Default::default()
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_references(mut self, references: Vec<EncodedImage>) -> Self {
        self.references = references;
        self
    }

    /// Checks the dispatch preconditions. Runs before any remote call.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(LuminaError::ValidationError("Please enter a prompt.".into()));
        }
        if self.mode == GenerationMode::ImageToImage && self.references.is_empty() {
            return Err(LuminaError::ValidationError(
                "Please upload at least one reference image for Image-to-Image mode.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// A completed generation run. Only built by the result assembler, with at least one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBatch {
    id: String,
    created_at: DateTime<Utc>,
    mode: GenerationMode,
    prompt: String,
    reference_count: usize,
    images: Vec<GeneratedImage>,
}

impl GenerationBatch {
    pub(crate) fn new(
        id: String,
        created_at: DateTime<Utc>,
        mode: GenerationMode,
        prompt: String,
        reference_count: usize,
        images: Vec<GeneratedImage>,
    ) -> Self {
        Self {
            id,
            created_at,
            mode,
            prompt,
            reference_count,
            images,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
