//! Interactive chat front-end: a prompt line generates, slash commands
//! manage the session.

use log::info;
use std::error::Error;
use std::io::Write as _;
use std::path::PathBuf;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::cli::Args;
use crate::config::style::{ AspectRatio, StylePreset };
use crate::session::export::export_session_json;
use crate::session::{ SessionContext, MAX_REFERENCE_IMAGES };
use crate::studio::{ Studio, TurnRequest };

const HELP: &str = "\
Commands:
  /style [preset]   show or set the style preset
  /ratio [ratio]    show or set the aspect ratio
  /ref [paths...]   attach reference images for the next prompt (no args: show, 'clear': drop)
  /stats            show session statistics
  /clear            clear chat history and statistics
  /export [path]    export the session as JSON (to stdout when no path is given)
  /help             show this help
  /quit             exit
Anything else is sent as a generation prompt.";

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let studio = match Studio::new(&args) {
        Ok(studio) => studio,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut ctx = SessionContext::new();
    let mut style = args.style;
    let mut ratio = args.aspect_ratio;
    let mut pending_refs: Vec<PathBuf> = args.reference_images.clone();

    info!("chat session {} started", ctx.id);
    println!("nano-banana chat. Type a prompt to generate, /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix('/') {
            let mut words = rest.split_whitespace();
            let command = words.next().unwrap_or("");
            match command {
                "help" => println!("{}", HELP),
                "quit" | "exit" => {
                    break;
                }
                "clear" => {
                    ctx.reset();
                    pending_refs.clear();
                    println!("Chat history and statistics cleared.");
                }
                "stats" => {
                    println!(
                        "Total cost: ${:.4} | Images: {} | Generations: {} | Messages: {}",
                        ctx.stats.total_cost,
                        ctx.stats.image_count,
                        ctx.stats.generation_count,
                        ctx.message_count()
                    );
                }
                "style" => {
                    match words.next() {
                        None => println!("Style preset: {}", style),
                        Some(value) =>
                            match value.parse::<StylePreset>() {
                                Ok(parsed) => {
                                    style = parsed;
                                    println!("Style preset set to {}", style);
                                }
                                Err(e) => println!("{}", e),
                            }
                    }
                }
                "ratio" => {
                    match words.next() {
                        None => println!("Aspect ratio: {}", ratio),
                        Some(value) =>
                            match value.parse::<AspectRatio>() {
                                Ok(parsed) => {
                                    ratio = parsed;
                                    println!("Aspect ratio set to {}", ratio);
                                }
                                Err(e) => println!("{}", e),
                            }
                    }
                }
                "ref" => {
                    let values: Vec<&str> = words.collect();
                    if values.is_empty() {
                        if pending_refs.is_empty() {
                            println!("No reference images attached.");
                        } else {
                            for path in &pending_refs {
                                println!("attached: {}", path.display());
                            }
                        }
                    } else if values == ["clear"] {
                        pending_refs.clear();
                        println!("Reference images cleared.");
                    } else {
                        pending_refs = values.into_iter().map(PathBuf::from).collect();
                        if pending_refs.len() > MAX_REFERENCE_IMAGES {
                            println!(
                                "Warning: only the first {} reference images will be used.",
                                MAX_REFERENCE_IMAGES
                            );
                        }
                        println!("{} reference image(s) attached to the next prompt.", pending_refs
                            .len()
                            .min(MAX_REFERENCE_IMAGES));
                    }
                }
                "export" => {
                    if ctx.turns.is_empty() {
                        println!("Nothing to export yet.");
                        continue;
                    }
                    let json = export_session_json(&ctx)?;
                    match words.next() {
                        Some(path) => {
                            std::fs::write(path, &json)?;
                            println!("Session exported to {}", path);
                        }
                        None => println!("{}", json),
                    }
                }
                other => println!("Unknown command /{}; try /help.", other),
            }
            continue;
        }

        let request = TurnRequest {
            prompt: input.to_string(),
            style,
            aspect_ratio: ratio,
            reference_images: std::mem::take(&mut pending_refs),
        };

        match studio.submit(&mut ctx, request).await {
            Ok(outcome) => {
                if outcome.truncated_references {
                    println!(
                        "Warning: only the first {} reference images were used.",
                        MAX_REFERENCE_IMAGES
                    );
                }
                if outcome.is_empty() {
                    println!(
                        "No content generated. Try a more specific prompt or check your API quotas."
                    );
                    continue;
                }
                for text in &outcome.texts {
                    println!("{}", text);
                }
                for path in &outcome.saved_images {
                    println!("saved {}", path.display());
                }
                if !args.hide_cost && outcome.cost > 0.0 {
                    println!(
                        "Generation complete. Cost: ${:.4} | Session total: ${:.4}",
                        outcome.cost,
                        ctx.stats.total_cost
                    );
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    info!("chat session {} ended", ctx.id);
    Ok(())
}
