pub mod cli;
pub mod config;
pub mod cost;
pub mod error;
pub mod gemini;
pub mod models;
pub mod repl;
pub mod session;
pub mod storage;
pub mod studio;

use cli::Args;
use log::info;
use std::error::Error;

/// Runs the interactive chat front-end.
pub async fn run_chat(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Configuration ---");
    info!("Model: {}", args.model);
    info!("Output Directory: {}", args.output_dir);
    info!("Style Preset: {}", args.style);
    info!("Aspect Ratio: {}", args.aspect_ratio);
    if !args.reference_images.is_empty() {
        info!("Reference Images: {}", args.reference_images.len());
    }
    info!("---------------------");

    repl::run(args).await
}
