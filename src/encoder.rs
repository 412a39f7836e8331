//! Turns raw reference inputs into inline image payloads.

use std::path::{Path, PathBuf};

use crate::{
    error::{LuminaError, Result},
    models::EncodedImage,
};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A reference image as the caller holds it.
#[derive(Debug, Clone)]
pub enum ReferenceSource {
    File(PathBuf),
    Bytes {
        data: Vec<u8>,
        media_type: Option<String>,
    },
    /// Base64 text, with or without a `data:<type>;base64,` prefix.
    Base64 {
        data: String,
        media_type: Option<String>,
    },
}

impl ReferenceSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ReferenceSource::File(path.into())
    }
}

impl From<PathBuf> for ReferenceSource {
    fn from(path: PathBuf) -> Self {
        ReferenceSource::File(path)
    }
}

impl From<&Path> for ReferenceSource {
    fn from(path: &Path) -> Self {
        ReferenceSource::File(path.to_path_buf())
    }
}

pub async fn encode(source: &ReferenceSource) -> Result<EncodedImage> {
    match source {
        ReferenceSource::File(path) => {
            let data = tokio::fs::read(path).await.map_err(|e| {
                log::error!("Failed to read reference image {}: {}", path.display(), e);
                LuminaError::IoError(e)
            })?;
            let media_type = detect_media_type(&data, Some(path));
            log::debug!(
                "Encoded reference {} ({} bytes, {})",
                path.display(),
                data.len(),
                media_type
            );
            Ok(EncodedImage::new(data, media_type))
        }
        ReferenceSource::Bytes { data, media_type } => {
            let media_type = media_type
                .clone()
                .unwrap_or_else(|| detect_media_type(data, None).to_string());
            Ok(EncodedImage::new(data.clone(), media_type))
        }
        ReferenceSource::Base64 { data, media_type } => {
            let declared = media_type.clone().or_else(|| data_url_media_type(data));
            let mut image = EncodedImage::from_base64(data, declared.clone().unwrap_or_default())?;
            if declared.is_none() {
                image.media_type = detect_media_type(&image.data, None).to_string();
            }
            Ok(image)
        }
    }
}

/// Encodes every source in order; the first unreadable input aborts.
pub async fn encode_all(sources: &[ReferenceSource]) -> Result<Vec<EncodedImage>> {
    let mut encoded = Vec::with_capacity(sources.len());
    for source in sources {
        encoded.push(encode(source).await?);
    }
    Ok(encoded)
}

/// Magic bytes first, then the file extension.
pub fn detect_media_type(data: &[u8], path: Option<&Path>) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    let extension = path
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

fn data_url_media_type(data: &str) -> Option<String> {
    data.strip_prefix("data:")
        .and_then(|rest| rest.split_once(';'))
        .map(|(media_type, _)| media_type.to_string())
        .filter(|media_type| !media_type.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_media_type_prefers_magic_bytes() {
        assert_eq!(detect_media_type(&PNG_HEADER, Some(Path::new("x.jpg"))), "image/png");
        assert_eq!(detect_media_type(&[0xFF, 0xD8, 0xFF, 0xE0], None), "image/jpeg");
        assert_eq!(detect_media_type(b"RIFF\0\0\0\0WEBPVP8 ", None), "image/webp");
        assert_eq!(detect_media_type(b"????", Some(Path::new("a.HEIC"))), "image/heic");
        assert_eq!(detect_media_type(b"????", None), FALLBACK_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_encode_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&PNG_HEADER).unwrap();

        let image = encode(&ReferenceSource::file(file.path())).await.unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, PNG_HEADER.to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = encode(&ReferenceSource::file("/definitely/not/here.png")).await;
        assert!(matches!(result, Err(LuminaError::IoError(_))));
    }

    #[tokio::test]
    async fn test_encode_base64_data_url_keeps_declared_type() {
        let source = ReferenceSource::Base64 {
            data: "data:image/webp;base64,AQID".to_string(),
            media_type: None,
        };
        let image = encode(&source).await.unwrap();
        assert_eq!(image.media_type, "image/webp");
        assert_eq!(image.data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_encode_all_preserves_order() {
        let sources = vec![
            ReferenceSource::Bytes {
                data: vec![1],
                media_type: Some("image/gif".into()),
            },
            ReferenceSource::Bytes {
                data: PNG_HEADER.to_vec(),
                media_type: None,
            },
        ];
        let images = encode_all(&sources).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].media_type, "image/gif");
        assert_eq!(images[1].media_type, "image/png");
    }
}
