use chrono::Utc;
use serde::{ Serialize, Deserialize };
use std::path::PathBuf;

/// Conversation role, serialized the way the generateContent API spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Image payload of a part: raw bytes (uploaded reference) or a file on disk
/// (saved generation output, or a reference given by path).
#[derive(Clone, Debug)]
pub enum ImageData {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl ImageData {
    /// Human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ImageData::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
            ImageData::File(path) => path.display().to_string(),
        }
    }
}

/// One content unit within a turn. Insertion order is preserved everywhere.
#[derive(Clone, Debug)]
pub enum Part {
    Text(String),
    Image {
        data: ImageData,
        caption: String,
    },
}

/// One message exchange unit (user or model) in the conversation.
#[derive(Clone, Debug)]
pub struct ChatTurn {
    pub role: Role,
    pub parts: Vec<Part>,
    pub timestamp: i64,
}

impl ChatTurn {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role,
            parts,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Running totals for the session. Cost and image count only move after a
/// successful response that contained at least one image; the generation
/// counter moves after every completed API call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionStats {
    pub total_cost: f64,
    pub image_count: u32,
    pub generation_count: u32,
}
