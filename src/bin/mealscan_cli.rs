use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mealscan::analyzer::{AnalysisSession, NutritionAnalyzer, NutritionCard, SelectedImage};
use mealscan::config::ClientConfig;

/// Analyze a meal photo through the mealscan gateway.
#[derive(Debug, Parser)]
#[command(name = "mealscan-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a photo and print its nutrition card.
    Analyze {
        /// Path to a JPG, PNG, WebP or HEIC file (max 10MB).
        image: PathBuf,
        /// Print the normalized result as JSON instead of the card.
        #[arg(long)]
        json: bool,
    },
    /// Check whether the gateway answers.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "mealscan=warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let analyzer = NutritionAnalyzer::new(ClientConfig::from_env()?);

    match cli.command {
        Command::Health => {
            if analyzer.health_check().await {
                println!("available");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("unavailable");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Analyze { image, json } => {
            let mut session = AnalysisSession::new();
            session.select_image(SelectedImage::open(&image).await?)?;
            println!("Analizando los valores nutricionales...");
            session.analyze_with(&analyzer).await?;

            if let Some(error) = session.error() {
                eprintln!("Error: {}", error);
                return Ok(ExitCode::FAILURE);
            }
            if let Some(result) = session.result() {
                if json {
                    println!("{}", serde_json::to_string_pretty(result)?);
                } else {
                    print!("{}", NutritionCard::new(result));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
