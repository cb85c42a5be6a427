use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;

use ingres_chatbot::api::AppState;
use ingres_chatbot::{ChatbotConfig, ChatPipeline, build_pipeline, telemetry, web};

/// Sample questions in the languages the chatbot was built for
const DEMO_QUERIES: [&str; 6] = [
    "पुणे में पानी का स्तर क्या है?",
    "What is the water level at Delhi?",
    "¿Cuál es el nivel de agua en Dhond?",
    "पुण्यातील पाण्याची पातळी काय आहे?",
    "டெல்லியில் தண்ணீரின் அளவு என்ன?",
    "Quel est le niveau d'eau à Pune ?",
];

#[derive(Parser)]
#[command(name = "ingres", version, about = "INGRES multilingual water-level chatbot")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single question and exit
    Ask {
        /// Question in any language
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Run the built-in multilingual sample questions
    Demo,
    /// List the loaded stations
    Stations,
}

#[tokio::main]
async fn main() -> Result<()> {
    // reqwest and axum-server both pull in rustls; pin one crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let mut config = ChatbotConfig::load_from_path(cli.config.clone())?;
    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;

    let pipeline = build_pipeline(&config).context("Failed to build chat pipeline")?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState {
                pipeline: Arc::new(pipeline),
            };
            web::run(&config.server, state).await?;
        }
        Command::Ask { text } => {
            let reply = pipeline.respond_text(&text.join(" ")).await;
            println!("{reply}");
        }
        Command::Demo => run_demo(&pipeline).await,
        Command::Stations => {
            for station in pipeline.matcher().registry().all_stations() {
                println!(
                    "{}  {:<12} {} {}  ({})",
                    station.station_code,
                    station.station_name,
                    station.data_value,
                    station.unit,
                    station.data_time
                );
            }
        }
    }

    Ok(())
}

async fn run_demo(pipeline: &ChatPipeline) {
    println!("🌍 INGRES Multilingual Chatbot Demo\n");

    let replies = join_all(DEMO_QUERIES.iter().map(|q| pipeline.respond_text(q))).await;

    for (query, reply) in DEMO_QUERIES.iter().zip(replies) {
        println!("👤 User: {query}");
        println!("🤖 Bot: {reply}\n");
    }
}
