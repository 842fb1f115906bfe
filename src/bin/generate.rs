//! One-shot front-end: prompt and options in, saved files and returned text
//! out. No chat history beyond the single turn.

use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::error::Error;

use nano_banana::cli::Args;
use nano_banana::cost::estimate_cost;
use nano_banana::session::{ SessionContext, MAX_REFERENCE_IMAGES };
use nano_banana::studio::{ Studio, TurnRequest };

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("--- Configuration ---");
    info!("Model: {}", args.model);
    info!("Output Directory: {}", args.output_dir);
    info!("Style Preset: {}", args.style);
    info!("Aspect Ratio: {}", args.aspect_ratio);
    info!("---------------------");

    let studio = match Studio::new(&args) {
        Ok(studio) => studio,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut ctx = SessionContext::new();
    let request = TurnRequest {
        prompt: args.prompt.clone().unwrap_or_default(),
        style: args.style,
        aspect_ratio: args.aspect_ratio,
        reference_images: args.reference_images.clone(),
    };

    match studio.submit(&mut ctx, request).await {
        Ok(outcome) => {
            if outcome.truncated_references {
                println!(
                    "Warning: only the first {} reference images were used.",
                    MAX_REFERENCE_IMAGES
                );
            }
            if outcome.saved_images.is_empty() {
                println!(
                    "No images generated. Try a more specific prompt, or check the API key and quotas."
                );
                if !args.hide_cost {
                    println!("Estimated cost: ${:.4}", estimate_cost(0));
                }
            } else {
                println!("Success: {} image(s) generated.", outcome.saved_images.len());
                for path in &outcome.saved_images {
                    println!("saved {}", path.display());
                }
                if !args.hide_cost {
                    println!("Estimated cost: ${:.4}", outcome.cost);
                }
            }
            if !outcome.texts.is_empty() {
                println!("--- Returned text ---");
                for text in &outcome.texts {
                    println!("{}", text);
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
