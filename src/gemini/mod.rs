pub mod client;
pub mod extract;
pub mod payload;
pub mod types;

pub use client::{ GeminiClient, ImageModelClient, DEFAULT_BASE_URL, DEFAULT_MODEL };
