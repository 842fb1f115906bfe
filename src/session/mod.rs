//! Explicit session state passed to each handler: conversation turns,
//! running stats, and the image sequence counter. Nothing here is persisted
//! beyond process lifetime.

pub mod export;

use log::warn;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cost::estimate_cost;
use crate::models::chat::{ ChatTurn, SessionStats };

/// Reference images beyond this count are dropped, with a warning.
pub const MAX_REFERENCE_IMAGES: usize = 3;

pub struct SessionContext {
    pub id: Uuid,
    pub turns: Vec<ChatTurn>,
    pub stats: SessionStats,
    next_image_seq: u64,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            stats: SessionStats::default(),
            next_image_seq: 0,
        }
    }

    /// Clears history and stats. The image sequence is not reset; it keeps
    /// counting across clears.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.stats = SessionStats::default();
    }

    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn message_count(&self) -> usize {
        self.turns.len()
    }

    /// Next value of the strictly monotonic image sequence.
    pub fn next_image_seq(&mut self) -> u64 {
        let seq = self.next_image_seq;
        self.next_image_seq += 1;
        seq
    }

    /// Called once per completed API call, whatever it returned.
    pub fn record_generation(&mut self) {
        self.stats.generation_count += 1;
    }

    /// Called only when a response produced saved images.
    pub fn record_saved_images(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.stats.image_count += count as u32;
        self.stats.total_cost += estimate_cost(count);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Enforces the reference-image cap. Returns the (possibly truncated) list
/// and whether truncation happened, so front-ends can tell the user.
pub fn clamp_reference_images(references: Vec<PathBuf>) -> (Vec<PathBuf>, bool) {
    if references.len() <= MAX_REFERENCE_IMAGES {
        return (references, false);
    }
    warn!(
        "{} reference images given; only the first {} will be used",
        references.len(),
        MAX_REFERENCE_IMAGES
    );
    let mut references = references;
    references.truncate(MAX_REFERENCE_IMAGES);
    (references, true)
}
