//! Serializes the full chat history plus session statistics into a single
//! JSON document. Image parts are represented by their captions only; raw
//! bytes never leave the session.

use chrono::{ DateTime, Utc };
use serde::Serialize;
use uuid::Uuid;

use crate::models::chat::{ ChatTurn, Part };
use super::SessionContext;

const IMAGE_NOT_EXPORTED_NOTE: &str = "Image data not exported";

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub session_id: Uuid,
    pub timestamp: String,
    pub total_cost: f64,
    pub image_count: u32,
    pub generation_count: u32,
    pub messages: Vec<ExportMessage>,
}

#[derive(Debug, Serialize)]
pub struct ExportMessage {
    pub role: &'static str,
    pub timestamp: String,
    pub content: Vec<ExportPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportPart {
    Text {
        data: String,
    },
    Image {
        caption: String,
        note: &'static str,
    },
}

pub fn export_session(ctx: &SessionContext) -> ExportDocument {
    ExportDocument {
        session_id: ctx.id,
        timestamp: Utc::now().to_rfc3339(),
        total_cost: ctx.stats.total_cost,
        image_count: ctx.stats.image_count,
        generation_count: ctx.stats.generation_count,
        messages: ctx.turns.iter().map(export_message).collect(),
    }
}

pub fn export_session_json(ctx: &SessionContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_session(ctx))
}

fn export_message(turn: &ChatTurn) -> ExportMessage {
    ExportMessage {
        role: turn.role.as_str(),
        timestamp: rfc3339(turn.timestamp),
        content: turn.parts
            .iter()
            .map(|part| {
                match part {
                    Part::Text(text) =>
                        ExportPart::Text {
                            data: text.clone(),
                        },
                    Part::Image { caption, .. } =>
                        ExportPart::Image {
                            caption: caption.clone(),
                            note: IMAGE_NOT_EXPORTED_NOTE,
                        },
                }
            })
            .collect(),
    }
}

fn rfc3339(epoch_seconds: i64) -> String {
    DateTime::<Utc>
        ::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
