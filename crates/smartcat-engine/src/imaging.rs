use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};
use sha2::{Digest, Sha256};
use smartcat_contracts::errors::RelayError;

const JPEG_QUALITY: u8 = 90;

/// Codec used to re-encode an image for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Jpeg,
    Png,
    WebP,
}

impl WireFormat {
    /// Unknown or empty mime types fall back to PNG.
    pub fn from_mime(mime_type: &str) -> Self {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => WireFormat::Jpeg,
            "image/webp" => WireFormat::WebP,
            _ => WireFormat::Png,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            WireFormat::Jpeg => "image/jpeg",
            WireFormat::Png => "image/png",
            WireFormat::WebP => "image/webp",
        }
    }
}

/// Re-encoded image ready to embed in a request.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: WireFormat,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), self.base64())
    }

    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Decode a base64 payload into a three-channel sample.
pub fn decode_base64_image(image_base64: &str) -> Result<RgbImage, RelayError> {
    let binary = BASE64
        .decode(image_base64.trim())
        .map_err(|err| RelayError::input(format!("Failed to decode base64 image: {err}")))?;
    let image = image::load_from_memory(&binary)
        .map_err(|err| RelayError::input(format!("Failed to load image: {err}")))?;
    Ok(image.to_rgb8())
}

/// Downscale so the longer side is at most `max_side`, keeping aspect ratio.
///
/// Both sides are scaled by `max_side / longer_side` in exact integer
/// arithmetic and truncated, so the longer side lands on `max_side`. Images
/// already within bounds are returned unchanged.
pub fn resize_to_max_side(image: RgbImage, max_side: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let largest = width.max(height);
    if largest <= max_side || largest == 0 {
        return image;
    }
    let scaled = |side: u32| -> u32 {
        ((u64::from(side) * u64::from(max_side)) / u64::from(largest)).max(1) as u32
    };
    let (target_width, target_height) = (scaled(width), scaled(height));
    log::debug!("resize {width}x{height} -> {target_width}x{target_height}");
    image::imageops::resize(&image, target_width, target_height, FilterType::Lanczos3)
}

pub fn encode_image(image: &RgbImage, mime_type: &str) -> Result<EncodedImage, RelayError> {
    let format = WireFormat::from_mime(mime_type);
    let mut bytes = Vec::new();
    let encoded = match format {
        WireFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            encoder.encode_image(image)
        }
        WireFormat::Png => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png),
        WireFormat::WebP => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP),
    };
    encoded.map_err(|err| {
        RelayError::Image(format!("failed to encode {}: {err}", format.mime()))
    })?;
    Ok(EncodedImage { format, bytes })
}

/// `encode_image` followed by standard (padded) base64.
pub fn encode_base64(image: &RgbImage, mime_type: &str) -> Result<String, RelayError> {
    Ok(encode_image(image, mime_type)?.base64())
}
