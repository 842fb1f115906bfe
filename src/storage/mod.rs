//! Writes generated images and their metadata sidecars to the output
//! directory. Filenames combine a timestamp, a per-session monotonic
//! sequence, and the candidate/part indices, so names stay unique even for
//! several images saved within the same second.

use chrono::Utc;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{ Path, PathBuf };

use crate::config::style::StylePreset;
use crate::error::GenerateError;

/// Context recorded next to each saved image.
#[derive(Clone, Debug)]
pub struct GenerationMeta {
    pub prompt: String,
    pub style: StylePreset,
}

/// Sidecar document written as `{stem}_metadata.json` next to each image.
#[derive(Debug, Serialize)]
pub struct ImageMetadata {
    pub filename: String,
    pub timestamp: String,
    pub prompt: String,
    pub style: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        _ => ".png",
    }
}

pub fn image_filename(
    stamp: &str,
    sequence: u64,
    candidate_index: usize,
    part_index: usize,
    mime_type: &str
) -> String {
    format!(
        "nanobanana_{}_{:04}_{}_{}{}",
        stamp,
        sequence,
        candidate_index,
        part_index,
        extension_for_mime(mime_type)
    )
}

pub struct ImageStore {
    output_dir: PathBuf,
}

impl ImageStore {
    /// Opens the store, creating the output directory if absent.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, GenerateError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the image bytes plus the metadata sidecar, returning the image
    /// path.
    pub fn save_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
        meta: &GenerationMeta
    ) -> Result<PathBuf, GenerateError> {
        let path = self.output_dir.join(filename);
        fs::write(&path, bytes)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let sidecar = path.with_file_name(format!("{}_metadata.json", stem));
        let metadata = ImageMetadata {
            filename: filename.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            prompt: meta.prompt.clone(),
            style: meta.style.label().to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len(),
        };
        fs::write(&sidecar, serde_json::to_string_pretty(&metadata)?)?;

        info!("saved image {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Sidecar path for a saved image, mirroring the naming in `save_image`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    image_path.with_file_name(format!("{}_metadata.json", stem))
}

pub fn timestamp_stamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}
