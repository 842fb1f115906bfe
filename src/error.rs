use std::fmt;
use thiserror::Error;

/// Classification of a remote API failure. Each kind maps to a distinct
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Quota,
    Auth,
    SafetyFilter,
    Other,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ApiErrorKind::Quota =>
                "API quota exceeded; check your usage limits or try again later",
            ApiErrorKind::Auth =>
                "authentication failed; verify the API key is correct and active",
            ApiErrorKind::SafetyFilter =>
                "request was blocked by safety filters; try rephrasing the prompt",
            ApiErrorKind::Other => "API error",
        };
        write!(f, "{}", msg)
    }
}

/// Classify a remote failure. Structured fields (HTTP status, the error
/// body's `status` code) win over message-content heuristics; the heuristics
/// only run when no structured code matched.
pub fn classify_api_error(
    http_status: Option<u16>,
    api_status: Option<&str>,
    message: &str
) -> ApiErrorKind {
    if let Some(status) = api_status {
        match status {
            "RESOURCE_EXHAUSTED" => {
                return ApiErrorKind::Quota;
            }
            "UNAUTHENTICATED" | "PERMISSION_DENIED" => {
                return ApiErrorKind::Auth;
            }
            _ => {}
        }
    }

    match http_status {
        Some(429) => {
            return ApiErrorKind::Quota;
        }
        Some(401) | Some(403) => {
            return ApiErrorKind::Auth;
        }
        _ => {}
    }

    let lower = message.to_lowercase();
    if lower.contains("quota") || lower.contains("limit") {
        ApiErrorKind::Quota
    } else if lower.contains("key") || lower.contains("auth") {
        ApiErrorKind::Auth
    } else if lower.contains("safety") {
        ApiErrorKind::SafetyFilter
    } else {
        ApiErrorKind::Other
    }
}

/// Everything that can go wrong between a user action and a rendered result.
/// All of these are recovered at the triggering action; none are fatal to the
/// running process.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no API key configured; set GEMINI_API_KEY or pass --api-key")]
    MissingCredential,

    #[error("prompt is empty; enter a prompt before generating")]
    EmptyPrompt,

    #[error("failed to read reference image {source_desc}: {reason}")]
    ImageDecode {
        source_desc: String,
        reason: String,
    },

    #[error("{kind}: {message}")]
    Api {
        kind: ApiErrorKind,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid response payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerateError {
    pub fn api(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        GenerateError::Api { kind, message: message.into() }
    }

    pub fn image_decode(source_desc: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerateError::ImageDecode {
            source_desc: source_desc.into(),
            reason: reason.into(),
        }
    }
}
