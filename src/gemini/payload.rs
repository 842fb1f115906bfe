//! Converts chat history into the ordered content blocks the API expects.
//!
//! Every image part, whatever raster format it arrived in, is re-decoded and
//! re-encoded to PNG before inclusion. An undecodable image fails the whole
//! turn; the caller must not have mutated history yet.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;
use std::fs;
use std::io::Cursor;

use crate::error::GenerateError;
use crate::models::chat::{ ChatTurn, ImageData, Part };
use super::types::{ Content, ContentPart };

/// Every image is normalized to this encoding before hitting the wire.
pub const NORMALIZED_IMAGE_MIME: &str = "image/png";

/// Build the ordered request contents from prior history plus the new user
/// turn. The new turn carries the enhanced prompt text; stored history is
/// sent as-is.
pub fn build_contents(
    history: &[ChatTurn],
    new_turn: &ChatTurn
) -> Result<Vec<Content>, GenerateError> {
    let mut contents = Vec::with_capacity(history.len() + 1);
    for turn in history {
        contents.push(turn_to_content(turn)?);
    }
    contents.push(turn_to_content(new_turn)?);
    Ok(contents)
}

fn turn_to_content(turn: &ChatTurn) -> Result<Content, GenerateError> {
    let mut parts = Vec::with_capacity(turn.parts.len());
    for part in &turn.parts {
        match part {
            Part::Text(text) => parts.push(ContentPart::text(text.clone())),
            Part::Image { data, .. } => {
                let raw = load_image_bytes(data)?;
                let png = normalize_to_png(&raw, data)?;
                parts.push(
                    ContentPart::inline_data(NORMALIZED_IMAGE_MIME, BASE64.encode(&png))
                );
            }
        }
    }
    Ok(Content {
        role: Some(turn.role),
        parts,
    })
}

fn load_image_bytes(data: &ImageData) -> Result<Vec<u8>, GenerateError> {
    match data {
        ImageData::Bytes(bytes) => Ok(bytes.clone()),
        ImageData::File(path) =>
            fs
                ::read(path)
                .map_err(|e| GenerateError::image_decode(path.display().to_string(), e.to_string())),
    }
}

/// Decode any supported raster format and re-encode as RGB PNG, dropping
/// alpha the same way the upstream pipeline expects.
fn normalize_to_png(raw: &[u8], source: &ImageData) -> Result<Vec<u8>, GenerateError> {
    let decoded = image
        ::load_from_memory(raw)
        .map_err(|e| GenerateError::image_decode(source.describe(), e.to_string()))?;

    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| GenerateError::image_decode(source.describe(), e.to_string()))?;
    Ok(buffer.into_inner())
}
