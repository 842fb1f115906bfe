use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{ Arc, Mutex };

use nano_banana::config::style::{ AspectRatio, StylePreset };
use nano_banana::error::{ ApiErrorKind, GenerateError };
use nano_banana::gemini::client::ImageModelClient;
use nano_banana::gemini::types::{
    Candidate,
    Content,
    ContentPart,
    GenerateContentRequest,
    GenerateContentResponse,
};
use nano_banana::models::chat::{ Part, Role };
use nano_banana::session::export::export_session;
use nano_banana::session::SessionContext;
use nano_banana::storage::{ sidecar_path, ImageStore };
use nano_banana::studio::{ Studio, TurnRequest };

/// Backend double that records every request and replays scripted responses.
struct ScriptedClient {
    captured: Mutex<Vec<GenerateContentRequest>>,
    responses: Mutex<VecDeque<Result<GenerateContentResponse, GenerateError>>>,
}

impl ScriptedClient {
    fn new(
        responses: Vec<Result<GenerateContentResponse, GenerateError>>
    ) -> Arc<Self> {
        Arc::new(Self {
            captured: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().collect()),
        })
    }

    fn captured(&self) -> Vec<GenerateContentRequest> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageModelClient for ScriptedClient {
    async fn generate(
        &self,
        request: GenerateContentRequest
    ) -> Result<GenerateContentResponse, GenerateError> {
        self.captured.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
    }
}

fn image_response(image_payloads: &[&[u8]], texts: &[&str]) -> GenerateContentResponse {
    let mut parts: Vec<ContentPart> = image_payloads
        .iter()
        .map(|bytes| ContentPart::inline_data("image/png", BASE64.encode(bytes)))
        .collect();
    parts.extend(texts.iter().map(|t| ContentPart::text(*t)));

    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content { role: Some(Role::Model), parts }),
            finish_reason: Some("STOP".to_string()),
        }],
        ..Default::default()
    }
}

fn studio_with(
    client: Arc<ScriptedClient>,
    output_dir: &Path
) -> Studio {
    let store = ImageStore::new(output_dir).unwrap();
    Studio::with_client(client, store)
}

fn request(prompt: &str) -> TurnRequest {
    TurnRequest {
        prompt: prompt.to_string(),
        style: StylePreset::Default,
        aspect_ratio: AspectRatio::Square,
        reference_images: Vec::new(),
    }
}

fn tiny_png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, 20, 30, 255]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage
        ::ImageRgba8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn write_tiny_png(path: &Path) {
    std::fs::write(path, tiny_png_bytes(10)).unwrap();
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![]);
    let studio = studio_with(client.clone(), dir.path());
    let mut ctx = SessionContext::new();

    let err = studio.submit(&mut ctx, request("   ")).await.unwrap_err();
    assert!(matches!(err, GenerateError::EmptyPrompt));
    assert!(ctx.turns.is_empty());
    assert!(client.captured().is_empty());
}

#[tokio::test]
async fn successful_generation_saves_images_and_updates_stats() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(
        vec![Ok(image_response(&[b"one", b"two"], &["A pair of bananas."]))]
    );
    let studio = studio_with(client.clone(), dir.path().join("out").as_path());
    let mut ctx = SessionContext::new();

    let outcome = studio.submit(&mut ctx, request("two bananas")).await.unwrap();

    assert_eq!(outcome.saved_images.len(), 2);
    assert_eq!(outcome.texts, vec!["A pair of bananas.".to_string()]);
    assert!((outcome.cost - 0.078).abs() < 1e-12);
    assert!(!outcome.truncated_references);

    for path in &outcome.saved_images {
        assert!(path.exists());
        assert!(sidecar_path(path).exists());
    }

    assert_eq!(ctx.stats.image_count, 2);
    assert_eq!(ctx.stats.generation_count, 1);
    assert!((ctx.stats.total_cost - 0.078).abs() < 1e-12);

    // User turn plus model turn, parts in response order.
    assert_eq!(ctx.turns.len(), 2);
    assert_eq!(ctx.turns[0].role, Role::User);
    assert_eq!(ctx.turns[1].role, Role::Model);
    assert_eq!(ctx.turns[1].parts.len(), 3);
    assert!(matches!(ctx.turns[1].parts[0], Part::Image { .. }));
    assert!(matches!(ctx.turns[1].parts[2], Part::Text(_)));
}

#[tokio::test]
async fn enhanced_prompt_goes_on_the_wire_not_into_history() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![Ok(GenerateContentResponse::default())]);
    let studio = studio_with(client.clone(), dir.path());
    let mut ctx = SessionContext::new();

    let turn = TurnRequest {
        prompt: "a banana".to_string(),
        style: StylePreset::Cartoon,
        aspect_ratio: AspectRatio::Widescreen,
        reference_images: Vec::new(),
    };
    studio.submit(&mut ctx, turn).await.unwrap();

    let captured = client.captured();
    assert_eq!(captured.len(), 1);
    let wire_text = captured[0].contents[0].parts[0].text.clone().unwrap();
    let prefix = StylePreset::Cartoon.prompt_prefix().unwrap();
    assert_eq!(
        wire_text,
        format!("{} a banana The image should be in 16:9 aspect ratio format.", prefix)
    );

    // The stored turn shows both the original and the enhanced prompt.
    let Part::Text(stored) = &ctx.turns[0].parts[0] else {
        panic!("expected text part");
    };
    assert!(stored.starts_with("Original prompt: a banana"));
    assert!(stored.contains("Enhanced prompt:"));
}

#[tokio::test]
async fn reference_images_are_normalized_and_capped_at_three() {
    let dir = tempfile::tempdir().unwrap();
    let mut refs = Vec::new();
    for i in 0..5 {
        let path = dir.path().join(format!("ref-{}.png", i));
        write_tiny_png(&path);
        refs.push(path);
    }

    let client = ScriptedClient::new(vec![Ok(GenerateContentResponse::default())]);
    let studio = studio_with(client.clone(), dir.path().join("out").as_path());
    let mut ctx = SessionContext::new();

    let turn = TurnRequest {
        prompt: "combine these".to_string(),
        style: StylePreset::Default,
        aspect_ratio: AspectRatio::Square,
        reference_images: refs,
    };
    let outcome = studio.submit(&mut ctx, turn).await.unwrap();
    assert!(outcome.truncated_references);

    let captured = client.captured();
    let parts = &captured[0].contents[0].parts;
    // Exactly 3 inline images followed by the prompt text.
    assert_eq!(parts.len(), 4);
    for part in &parts[..3] {
        let inline = part.inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert!(!inline.data.is_empty());
    }
    assert_eq!(parts[3].text.as_deref(), Some("combine these"));
}

#[tokio::test]
async fn undecodable_reference_aborts_without_history_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("not-an-image.png");
    std::fs::write(&bad, b"plain text").unwrap();

    let client = ScriptedClient::new(vec![]);
    let studio = studio_with(client.clone(), dir.path().join("out").as_path());
    let mut ctx = SessionContext::new();

    let turn = TurnRequest {
        prompt: "use this".to_string(),
        style: StylePreset::Default,
        aspect_ratio: AspectRatio::Square,
        reference_images: vec![bad],
    };
    let err = studio.submit(&mut ctx, turn).await.unwrap_err();

    assert!(matches!(err, GenerateError::ImageDecode { .. }));
    assert!(ctx.turns.is_empty());
    assert_eq!(ctx.stats.generation_count, 0);
    assert!(client.captured().is_empty());
}

#[tokio::test]
async fn empty_response_only_moves_the_generation_counter() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(vec![Ok(GenerateContentResponse::default())]);
    let studio = studio_with(client.clone(), dir.path());
    let mut ctx = SessionContext::new();

    let outcome = studio.submit(&mut ctx, request("anything")).await.unwrap();

    assert!(outcome.is_empty());
    assert_eq!(outcome.cost, 0.0);
    assert_eq!(ctx.stats.generation_count, 1);
    assert_eq!(ctx.stats.image_count, 0);
    assert_eq!(ctx.stats.total_cost, 0.0);
    // No model turn was appended.
    assert_eq!(ctx.turns.len(), 1);
    assert_eq!(ctx.turns[0].role, Role::User);
}

#[tokio::test]
async fn api_failures_surface_their_classified_kind() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(
        vec![Err(GenerateError::api(ApiErrorKind::Quota, "Quota exceeded for requests"))]
    );
    let studio = studio_with(client.clone(), dir.path());
    let mut ctx = SessionContext::new();

    let err = studio.submit(&mut ctx, request("a banana")).await.unwrap_err();
    match err {
        GenerateError::Api { kind, .. } => assert_eq!(kind, ApiErrorKind::Quota),
        other => panic!("expected Api error, got {:?}", other),
    }
    // The failed call never completed, so the counter stays put.
    assert_eq!(ctx.stats.generation_count, 0);
}

#[tokio::test]
async fn chat_history_accumulates_and_exports_across_turns() {
    let dir = tempfile::tempdir().unwrap();
    let first_png = tiny_png_bytes(40);
    let second_png = tiny_png_bytes(80);
    let client = ScriptedClient::new(
        vec![
            Ok(image_response(&[&first_png], &[])),
            Ok(image_response(&[&second_png], &["Done."]))
        ]
    );
    let studio = studio_with(client.clone(), dir.path().join("out").as_path());
    let mut ctx = SessionContext::new();

    studio.submit(&mut ctx, request("first prompt")).await.unwrap();
    studio.submit(&mut ctx, request("second prompt")).await.unwrap();

    // The second request replays the full history: user, model, user.
    let captured = client.captured();
    assert_eq!(captured[1].contents.len(), 3);
    assert_eq!(captured[1].contents[0].role, Some(Role::User));
    assert_eq!(captured[1].contents[1].role, Some(Role::Model));
    assert_eq!(captured[1].contents[2].role, Some(Role::User));
    // The historical model image is re-sent as normalized inline data.
    assert!(captured[1].contents[1].parts[0].inline_data.is_some());
    assert_eq!(captured[1].contents[2].parts[0].text.as_deref(), Some("second prompt"));

    assert_eq!(ctx.stats.generation_count, 2);
    assert_eq!(ctx.stats.image_count, 2);
    assert!((ctx.stats.total_cost - 2.0 * 0.039).abs() < 1e-12);

    let doc = export_session(&ctx);
    assert_eq!(doc.messages.len(), 4);
    assert_eq!(doc.generation_count, 2);
    assert_eq!(doc.image_count, 2);
}
