use clap::Parser;
use std::path::PathBuf;

use crate::config::style::{ AspectRatio, StylePreset };
use crate::gemini::client::DEFAULT_MODEL;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Credentials & endpoint ---
    /// API key for the generative image API. Read from the environment when
    /// not given; never written to disk.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Model identifier used for generation.
    #[arg(long, env = "NANOBANANA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the generative language API (e.g. a regional or proxy
    /// endpoint). The client falls back to the public endpoint when unset.
    #[arg(long, env = "NANOBANANA_BASE_URL")]
    pub base_url: Option<String>,

    // --- Output ---
    /// Directory where generated images and their metadata sidecars are
    /// written. Created if absent.
    #[arg(long, env = "NANOBANANA_OUTPUT_DIR", default_value = "outputs")]
    pub output_dir: String,

    // --- Generation settings ---
    /// Style preset (default, photorealistic, artistic, cartoon, sketch,
    /// digital-art, minimalist).
    #[arg(long, env = "NANOBANANA_STYLE", default_value = "default")]
    pub style: StylePreset,

    /// Aspect ratio for generated images (1:1, 16:9, 4:3, 3:4, 9:16).
    #[arg(long, env = "NANOBANANA_ASPECT_RATIO", default_value = "1:1")]
    pub aspect_ratio: AspectRatio,

    /// Reference image path, repeatable (up to 3; extras are dropped with a
    /// warning).
    #[arg(long = "ref", value_name = "PATH")]
    pub reference_images: Vec<PathBuf>,

    /// Prompt for one-shot generation (nano-banana-gen). The chat REPL reads
    /// prompts interactively instead.
    #[arg(long, env = "NANOBANANA_PROMPT")]
    pub prompt: Option<String>,

    /// Suppress the estimated-cost line printed after each generation.
    #[arg(long, env = "NANOBANANA_HIDE_COST", default_value = "false")]
    pub hide_cost: bool,
}
