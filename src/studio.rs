//! Orchestrates one generation turn: validate → enhance → build payload →
//! call the model → extract/save → update session state. One turn at a time;
//! the front-ends await each submission before accepting the next.

use log::{ info, warn };
use std::path::{ Path, PathBuf };
use std::sync::Arc;

use crate::cli::Args;
use crate::config::style::{ enhance_prompt, AspectRatio, StylePreset };
use crate::cost::estimate_cost;
use crate::error::GenerateError;
use crate::gemini::client::{ GeminiClient, ImageModelClient };
use crate::gemini::payload::build_contents;
use crate::gemini::extract::extract_response;
use crate::gemini::types::{ GenerateContentRequest, GenerationConfig };
use crate::models::chat::{ ChatTurn, ImageData, Part, Role };
use crate::session::{ clamp_reference_images, SessionContext };
use crate::storage::{ GenerationMeta, ImageStore };

/// One user submission.
#[derive(Clone, Debug)]
pub struct TurnRequest {
    pub prompt: String,
    pub style: StylePreset,
    pub aspect_ratio: AspectRatio,
    pub reference_images: Vec<PathBuf>,
}

/// What a completed submission produced.
#[derive(Debug)]
pub struct TurnOutcome {
    pub saved_images: Vec<PathBuf>,
    pub texts: Vec<String>,
    /// Cost of this generation alone; 0.0 when no images were produced.
    pub cost: f64,
    /// True when more than the allowed number of reference images were given
    /// and the extras were dropped.
    pub truncated_references: bool,
}

impl TurnOutcome {
    pub fn is_empty(&self) -> bool {
        self.saved_images.is_empty() && self.texts.is_empty()
    }
}

pub struct Studio {
    client: Arc<dyn ImageModelClient>,
    store: ImageStore,
}

impl Studio {
    pub fn new(args: &Args) -> Result<Self, GenerateError> {
        let client = GeminiClient::new(
            args.api_key.clone(),
            Some(args.model.clone()),
            args.base_url.clone()
        )?;
        let store = ImageStore::new(&args.output_dir)?;
        info!("output directory: {}", store.output_dir().display());
        Ok(Self {
            client: Arc::new(client),
            store,
        })
    }

    /// Construct around any backend; tests use this with a scripted client.
    pub fn with_client(client: Arc<dyn ImageModelClient>, store: ImageStore) -> Self {
        Self { client, store }
    }

    pub async fn submit(
        &self,
        ctx: &mut SessionContext,
        request: TurnRequest
    ) -> Result<TurnOutcome, GenerateError> {
        let prompt = request.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let (references, truncated_references) = clamp_reference_images(
            request.reference_images
        );
        let enhanced = enhance_prompt(&prompt, request.style, request.aspect_ratio);

        // The wire turn carries the enhanced prompt; image parts precede the
        // text, matching the order references were attached.
        let mut wire_parts: Vec<Part> = references
            .iter()
            .map(|path| Part::Image {
                data: ImageData::File(path.clone()),
                caption: reference_caption(path),
            })
            .collect();
        wire_parts.push(Part::Text(enhanced.clone()));
        let wire_turn = ChatTurn::new(Role::User, wire_parts.clone());

        // Build the payload before touching history so an undecodable image
        // leaves the session exactly as it was.
        let contents = build_contents(&ctx.turns, &wire_turn)?;

        let display_text = if enhanced != prompt {
            format!("Original prompt: {}\n\nEnhanced prompt: {}", prompt, enhanced)
        } else {
            prompt.clone()
        };
        let mut display_parts = wire_parts;
        display_parts.pop();
        display_parts.push(Part::Text(display_text));
        ctx.push_turn(ChatTurn::new(Role::User, display_parts));

        info!(
            "generating (session {}): {} content block(s), {} reference image(s)",
            ctx.id,
            contents.len(),
            references.len()
        );

        let response = self.client.generate(GenerateContentRequest {
            contents,
            generation_config: GenerationConfig::default(),
        }).await?;

        let meta = GenerationMeta {
            prompt: prompt.clone(),
            style: request.style,
        };
        let extracted = extract_response(&response, &self.store, ctx, &meta)?;

        ctx.record_generation();
        let cost = if extracted.saved_images.is_empty() {
            0.0
        } else {
            estimate_cost(extracted.saved_images.len())
        };
        ctx.record_saved_images(extracted.saved_images.len());

        if extracted.is_empty() {
            warn!("no content generated for session {}", ctx.id);
        } else {
            ctx.push_turn(ChatTurn::new(Role::Model, extracted.model_parts));
        }

        Ok(TurnOutcome {
            saved_images: extracted.saved_images,
            texts: extracted.texts,
            cost,
            truncated_references,
        })
    }
}

fn reference_caption(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    format!("Reference: {}", name)
}
