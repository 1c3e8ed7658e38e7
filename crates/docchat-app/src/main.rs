mod cli;
mod conversation;
mod export;
mod repl;

use docchat_ai::{DocumentSource, GeminiClient, GeminiConfig};
use tracing_subscriber::EnvFilter;

use conversation::Conversation;

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let candidates = [
        std::path::PathBuf::from(".env"),
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before reading any environment variable
    load_dotenv();

    let args = cli::parse();

    // Load config (CLI --config wins over the platform default path)
    let config = match &args.config {
        Some(path) => docchat_config::toml_loader::load_from_path(path),
        None => docchat_config::load_config(),
    }
    .unwrap_or_else(|e| {
        eprintln!("config load failed, using defaults: {e}");
        docchat_config::DocChatConfig::default()
    });

    // Initialize logging (CLI flag wins over the config file)
    let log_directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "docchat=info".parse().expect("static directive")),
            ),
        )
        .init();

    tracing::info!("docchat v{} starting", env!("CARGO_PKG_VERSION"));

    // The key is not validated here; a missing key surfaces as an HTTP
    // error on the first remote call.
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let model = args.model.clone().unwrap_or_else(|| config.api.model.clone());

    let client = GeminiClient::new(
        GeminiConfig::new(api_key)
            .with_model(&model)
            .with_max_output_tokens(config.api.max_output_tokens)
            .with_temperature(config.api.temperature),
    );

    // Initial upload batch
    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match DocumentSource::from_path(path).await {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("upload rejected: {e}");
                std::process::exit(1);
            }
        }
    }

    let mut conversation = Conversation::new(&model);
    if let Err(e) = conversation.load_documents(&sources).await {
        eprintln!("upload rejected: {e}");
        std::process::exit(1);
    }
    println!(
        "loaded {} document(s): {}",
        conversation.documents().len(),
        conversation
            .documents()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if args.summary {
        println!("\n{}\n", conversation.summarize(&client).await);
    }

    println!("chat ready -- type a question, or /help for commands");
    let export_dir = std::path::PathBuf::from(&config.export.directory);
    if let Err(e) = repl::run(&mut conversation, &client, &export_dir).await {
        tracing::error!("chat loop error: {e}");
    }
    tracing::info!("shutdown complete");
}
