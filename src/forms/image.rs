//! Profile picture acceptance checks.
//!
//! A candidate file is first screened on its declared metadata (size, MIME
//! type, file extension) and then decoded in full. Both phases
//! must succeed before the image is attached to a contact form, so a renamed
//! non-image payload is rejected even when its name and MIME type look right.

use std::fmt::{Debug, Formatter};

use thiserror::Error;

const MIB: f64 = 1024.0 * 1024.0;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

pub const DEFAULT_ACCEPTED_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/gif",
    "image/webp",
];

pub const DEFAULT_ACCEPTED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Why an image was not attached.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ImageRejection {
    #[error(
        "O arquivo é muito grande ({:.2}MB). O tamanho máximo permitido é {}MB.",
        mebibytes(.size),
        mebibytes(.max)
    )]
    TooLarge { size: u64, max: u64 },

    #[error("O tipo de arquivo não é suportado. Por favor, selecione uma imagem válida.")]
    UnsupportedType(String),

    #[error("A extensão do arquivo não é suportada. Formatos aceitos: {accepted}")]
    UnsupportedExtension { accepted: String },

    #[error("O arquivo selecionado não é uma imagem válida.")]
    CorruptImage,
}

fn mebibytes(bytes: &u64) -> f64 {
    *bytes as f64 / MIB
}

/// Limits applied to every candidate image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageLimits {
    pub accepted_types: Vec<String>,
    pub accepted_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            accepted_types: DEFAULT_ACCEPTED_TYPES.iter().map(|s| s.to_string()).collect(),
            accepted_extensions: DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Declared metadata of a file the user picked.
#[derive(Clone, Copy, Debug)]
pub struct ImageCandidate<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub size: u64,
}

/// First phase: size, MIME type and extension, checked in that order.
pub fn check_candidate(
    candidate: &ImageCandidate<'_>,
    limits: &ImageLimits,
) -> Result<(), ImageRejection> {
    if candidate.size > limits.max_bytes {
        return Err(ImageRejection::TooLarge {
            size: candidate.size,
            max: limits.max_bytes,
        });
    }

    if !limits
        .accepted_types
        .iter()
        .any(|accepted| accepted == candidate.mime_type)
    {
        return Err(ImageRejection::UnsupportedType(
            candidate.mime_type.to_string(),
        ));
    }

    let file_name = candidate.file_name.to_lowercase();
    if !limits
        .accepted_extensions
        .iter()
        .any(|ext| file_name.ends_with(&ext.to_lowercase()))
    {
        return Err(ImageRejection::UnsupportedExtension {
            accepted: limits.accepted_extensions.join(", "),
        });
    }

    Ok(())
}

/// Image bytes picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn candidate(&self) -> ImageCandidate<'_> {
        ImageCandidate {
            file_name: &self.file_name,
            mime_type: &self.mime_type,
            size: self.bytes.len() as u64,
        }
    }
}

impl Debug for ImageFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    fn from_decoder(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Result of a successful decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Second phase: attempts to load the payload as an image.
pub trait ImageProbe {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, ImageRejection>;
}

/// Probe that decodes PNG, JPEG, GIF and WebP payloads with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeProbe;

impl ImageProbe for DecodeProbe {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, ImageRejection> {
        let detected = image::guess_format(bytes).map_err(|err| {
            log::debug!("Unrecognized image payload: {err}");
            ImageRejection::CorruptImage
        })?;
        let format = ImageFormat::from_decoder(detected).ok_or_else(|| {
            log::debug!("Decoded format {detected:?} is not accepted");
            ImageRejection::CorruptImage
        })?;

        let decoded = image::load_from_memory_with_format(bytes, detected).map_err(|err| {
            log::debug!("Failed to decode {detected:?} image: {err}");
            ImageRejection::CorruptImage
        })?;

        match (decoded.width(), decoded.height()) {
            (0, _) | (_, 0) => Err(ImageRejection::CorruptImage),
            (width, height) => Ok(ImageInfo {
                format,
                width,
                height,
            }),
        }
    }
}

/// Runs both phases and returns the decoded image description on success.
pub fn accept_image(
    file: &ImageFile,
    limits: &ImageLimits,
    probe: &dyn ImageProbe,
) -> Result<ImageInfo, ImageRejection> {
    check_candidate(&file.candidate(), limits)?;
    probe.probe(&file.bytes)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{encoded, png_bytes};
    use super::*;

    fn candidate(size: u64) -> ImageCandidate<'static> {
        ImageCandidate {
            file_name: "photo.PNG",
            mime_type: "image/png",
            size,
        }
    }

    #[test]
    fn oversized_file_reports_size_with_two_decimals() {
        let limits = ImageLimits::default();
        let err = check_candidate(&candidate(3 * 1024 * 1024), &limits).unwrap_err();

        assert!(matches!(err, ImageRejection::TooLarge { .. }));
        let message = err.to_string();
        assert!(message.contains("3.00MB"), "{message}");
        assert!(message.contains("máximo permitido é 2MB"), "{message}");
    }

    #[test]
    fn size_exactly_at_limit_is_accepted() {
        let limits = ImageLimits::default();
        assert!(check_candidate(&candidate(DEFAULT_MAX_IMAGE_BYTES), &limits).is_ok());
    }

    #[test]
    fn mime_and_extension_must_both_match() {
        let limits = ImageLimits::default();

        let wrong_mime = ImageCandidate {
            mime_type: "application/pdf",
            ..candidate(10)
        };
        assert_eq!(
            check_candidate(&wrong_mime, &limits),
            Err(ImageRejection::UnsupportedType("application/pdf".to_string()))
        );

        let wrong_ext = ImageCandidate {
            file_name: "photo.bmp",
            ..candidate(10)
        };
        let err = check_candidate(&wrong_ext, &limits).unwrap_err();
        assert!(err.to_string().ends_with(".jpg, .jpeg, .png, .gif, .webp"));
    }

    #[test]
    fn decodes_png_dimensions() {
        let info = DecodeProbe.probe(&png_bytes(64, 32)).expect("valid png");
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width, info.height), (64, 32));
    }

    #[test]
    fn decodes_gif_dimensions() {
        let bytes = encoded(image::ImageFormat::Gif, 10, 20);
        let info = DecodeProbe.probe(&bytes).expect("valid gif");
        assert_eq!(info.format, ImageFormat::Gif);
        assert_eq!((info.width, info.height), (10, 20));
    }

    #[test]
    fn spoofed_payload_is_corrupt() {
        let file = ImageFile::new("avatar.png", "image/png", b"%PDF-1.7 not an image".to_vec());
        assert_eq!(
            accept_image(&file, &ImageLimits::default(), &DecodeProbe),
            Err(ImageRejection::CorruptImage)
        );
    }

    #[test]
    fn png_cut_after_header_is_corrupt() {
        let bytes = png_bytes(16, 16);
        // Signature (8) plus the IHDR chunk (25): dimensions readable, no pixel data.
        assert_eq!(
            DecodeProbe.probe(&bytes[..33]),
            Err(ImageRejection::CorruptImage)
        );
    }
}
