//! Image intake: accepts a single JPEG or PNG upload and decodes its header.
//!
//! The original bytes are kept for the outbound call; decoding only confirms
//! the file is a readable bitmap and records its dimensions for the preview.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// File extensions the picker accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("No image was uploaded")]
    Empty,

    #[error("Unsupported file type '{0}': upload a .jpg, .jpeg or .png image")]
    UnsupportedExtension(String),

    #[error("The uploaded file is not a JPEG or PNG image")]
    UnsupportedFormat,

    #[error("The uploaded image could not be decoded: {0}")]
    Undecodable(String),
}

/// Formats the intake control allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }

    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
        }
    }
}

/// An uploaded image held for the current session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub file_name: String,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    #[serde(with = "base64_bytes")]
    bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadedImage {
    /// Validate and decode an upload.
    ///
    /// The extension must be one the picker offers and the content must sniff
    /// as JPEG or PNG. The declared content type is ignored; browsers report it
    /// inconsistently.
    pub fn decode(file_name: &str, bytes: Vec<u8>) -> Result<Self, IntakeError> {
        if bytes.is_empty() {
            return Err(IntakeError::Empty);
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(IntakeError::UnsupportedExtension(file_name.to_string()));
        }

        let kind = image::guess_format(&bytes)
            .ok()
            .and_then(ImageKind::from_format)
            .ok_or(IntakeError::UnsupportedFormat)?;

        let (width, height) = ImageReader::with_format(Cursor::new(&bytes), kind.image_format())
            .into_dimensions()
            .map_err(|e| IntakeError::Undecodable(e.to_string()))?;

        Ok(Self {
            file_name: file_name.to_string(),
            kind,
            width,
            height,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    /// Base64 payload for inline transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URI used by the page preview.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    pub(crate) fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn accepts_jpeg_and_records_dimensions() {
        let image = UploadedImage::decode("pack.JPG", encoded(12, 7, ImageFormat::Jpeg)).unwrap();
        assert_eq!(image.kind, ImageKind::Jpeg);
        assert_eq!((image.width, image.height), (12, 7));
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[test]
    fn accepts_png() {
        let image = UploadedImage::decode("rx.png", encoded(4, 4, ImageFormat::Png)).unwrap();
        assert_eq!(image.kind, ImageKind::Png);
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn content_wins_over_extension_between_allowed_types() {
        let image = UploadedImage::decode("photo.jpeg", encoded(3, 3, ImageFormat::Png)).unwrap();
        assert_eq!(image.kind, ImageKind::Png);
    }

    #[test]
    fn rejects_other_extensions() {
        let err = UploadedImage::decode("scan.gif", encoded(2, 2, ImageFormat::Png)).unwrap_err();
        assert_eq!(err, IntakeError::UnsupportedExtension("scan.gif".into()));

        let err = UploadedImage::decode("noext", encoded(2, 2, ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedExtension(_)));
    }

    #[test]
    fn rejects_non_image_content() {
        let err = UploadedImage::decode("fake.png", b"not an image at all".to_vec()).unwrap_err();
        assert_eq!(err, IntakeError::UnsupportedFormat);
    }

    #[test]
    fn rejects_truncated_image() {
        let bytes = encoded(8, 8, ImageFormat::Png);
        let err = UploadedImage::decode("cut.png", bytes[..12].to_vec()).unwrap_err();
        assert!(matches!(err, IntakeError::Undecodable(_)));
    }

    #[test]
    fn rejects_empty_upload() {
        assert_eq!(UploadedImage::decode("a.png", Vec::new()).unwrap_err(), IntakeError::Empty);
    }

    #[test]
    fn survives_session_serialization() {
        let image = UploadedImage::decode("a.png", encoded(5, 6, ImageFormat::Png)).unwrap();
        let json = serde_json::to_value(&image).unwrap();
        let back: UploadedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn debug_omits_bytes() {
        let image = UploadedImage::decode("a.png", encoded(5, 6, ImageFormat::Png)).unwrap();
        let debug = format!("{:?}", image);
        assert!(debug.contains("size"));
        assert!(!debug.contains("bytes"));
    }
}
