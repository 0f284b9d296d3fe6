//! Knowledge base chat frontend.
//!
//! Thin presentation layer: reads one line per turn from stdin, hands it
//! to the ingestion pipeline, prints the outcome's message. All decision
//! logic lives in factbase-knowledge.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use factbase_core::Config;
use factbase_gateway::{Provider, build_provider};
use factbase_knowledge::{Pipeline, QdrantStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    factbase_core::load_dotenv();

    // Load configuration first; the log level lives in it.
    let config = Config::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.settings.logging.level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Configuration loaded (provider: {})", config.provider());

    let provider: Arc<dyn Provider> = Arc::from(build_provider(&config)?);
    let store = Arc::new(
        QdrantStore::connect(&config.settings.vectorstore, Arc::clone(&provider)).await?,
    );
    let pipeline = Pipeline::new(provider, store, &config.settings);

    println!("Hello! How can I help you today?");
    println!("Enter a statement or question (exit to quit).");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        info!("User input: {input}");
        match pipeline.handle_input(input).await {
            Ok(outcome) => {
                info!("Turn finished: {}", outcome.kind());
                println!("{}", outcome.message());
            }
            Err(e) => {
                error!("Turn failed: {e}");
                println!("Something went wrong while handling that input. Please try again.");
            }
        }
    }

    Ok(())
}
