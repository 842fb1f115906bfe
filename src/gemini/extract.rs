//! Walks a generateContent response in order, saving image parts to disk and
//! collecting text parts. Output ordering matches the order parts appeared
//! in the response.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::debug;
use std::path::PathBuf;

use crate::error::{ ApiErrorKind, GenerateError };
use crate::models::chat::{ ImageData, Part };
use crate::session::SessionContext;
use crate::storage::{ image_filename, timestamp_stamp, GenerationMeta, ImageStore };
use super::types::GenerateContentResponse;

#[derive(Debug, Default)]
pub struct ExtractedContent {
    pub saved_images: Vec<PathBuf>,
    pub texts: Vec<String>,
    /// Ordered parts for the model turn, interleaving images and texts the
    /// way the response did.
    pub model_parts: Vec<Part>,
}

impl ExtractedContent {
    /// True when the response carried neither image nor text parts; callers
    /// report this as "no content generated", not as an error.
    pub fn is_empty(&self) -> bool {
        self.saved_images.is_empty() && self.texts.is_empty()
    }
}

pub fn extract_response(
    response: &GenerateContentResponse,
    store: &ImageStore,
    ctx: &mut SessionContext,
    meta: &GenerationMeta
) -> Result<ExtractedContent, GenerateError> {
    let stamp = timestamp_stamp();
    let mut extracted = ExtractedContent::default();

    for (candidate_index, candidate) in response.candidates.iter().enumerate() {
        let Some(content) = &candidate.content else {
            continue;
        };

        for (part_index, part) in content.parts.iter().enumerate() {
            if let Some(inline) = &part.inline_data {
                if !inline.data.is_empty() {
                    let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e|
                        GenerateError::api(
                            ApiErrorKind::Other,
                            format!("undecodable image payload in response: {}", e)
                        )
                    )?;
                    let sequence = ctx.next_image_seq();
                    let filename = image_filename(
                        &stamp,
                        sequence,
                        candidate_index,
                        part_index,
                        &inline.mime_type
                    );
                    let path = store.save_image(&bytes, &inline.mime_type, &filename, meta)?;
                    extracted.model_parts.push(Part::Image {
                        data: ImageData::File(path.clone()),
                        caption: format!("Generated: {}", filename),
                    });
                    extracted.saved_images.push(path);
                }
            }

            if let Some(text) = &part.text {
                if !text.is_empty() {
                    extracted.texts.push(text.clone());
                    extracted.model_parts.push(Part::Text(text.clone()));
                }
            }
        }
    }

    debug!(
        "extracted {} image(s) and {} text part(s)",
        extracted.saved_images.len(),
        extracted.texts.len()
    );
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::style::StylePreset;
    use crate::gemini::types::{ Candidate, Content, ContentPart };
    use crate::storage::sidecar_path;
    use tempfile::tempdir;

    fn meta() -> GenerationMeta {
        GenerationMeta {
            prompt: "two bananas and a caption".to_string(),
            style: StylePreset::Default,
        }
    }

    fn image_part(payload: &[u8]) -> ContentPart {
        ContentPart::inline_data("image/png", BASE64.encode(payload))
    }

    #[test]
    fn two_images_and_one_text_extract_in_order() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();

        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![
                        image_part(b"png-bytes-one"),
                        image_part(b"png-bytes-two"),
                        ContentPart::text("A pair of bananas.")
                    ],
                }),
                finish_reason: None,
            }],
            ..Default::default()
        };

        let extracted = extract_response(&response, &store, &mut ctx, &meta()).unwrap();

        assert_eq!(extracted.saved_images.len(), 2);
        assert_eq!(extracted.texts, vec!["A pair of bananas.".to_string()]);
        assert_eq!(extracted.model_parts.len(), 3);
        assert!(matches!(extracted.model_parts[0], Part::Image { .. }));
        assert!(matches!(extracted.model_parts[2], Part::Text(_)));

        for path in &extracted.saved_images {
            assert!(path.exists(), "missing image {}", path.display());
            assert!(sidecar_path(path).exists(), "missing sidecar for {}", path.display());
        }

        // Filenames differ via the sequence and part index.
        assert_ne!(extracted.saved_images[0], extracted.saved_images[1]);
        assert_eq!(std::fs::read(&extracted.saved_images[0]).unwrap(), b"png-bytes-one");
    }

    #[test]
    fn zero_part_response_extracts_nothing() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();

        let extracted = extract_response(
            &GenerateContentResponse::default(),
            &store,
            &mut ctx,
            &meta()
        ).unwrap();

        assert!(extracted.is_empty());
        assert!(extracted.model_parts.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_inline_data_is_skipped_not_saved() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();

        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![
                        ContentPart::inline_data("image/png", ""),
                        ContentPart::text("only text survives")
                    ],
                }),
                finish_reason: None,
            }],
            ..Default::default()
        };

        let extracted = extract_response(&response, &store, &mut ctx, &meta()).unwrap();
        assert!(extracted.saved_images.is_empty());
        assert_eq!(extracted.texts.len(), 1);
    }

    #[test]
    fn a_part_carrying_both_image_and_text_yields_both() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        let mut ctx = SessionContext::new();

        let mut part = image_part(b"bytes");
        part.text = Some("caption text".to_string());
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: None, parts: vec![part] }),
                finish_reason: None,
            }],
            ..Default::default()
        };

        let extracted = extract_response(&response, &store, &mut ctx, &meta()).unwrap();
        assert_eq!(extracted.saved_images.len(), 1);
        assert_eq!(extracted.texts, vec!["caption text".to_string()]);
    }
}
