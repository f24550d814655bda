use anyhow::Result;
use clap::Parser;
use tracing::info;
use ustaad_ai::config::Config;
use ustaad_ai::history;
use ustaad_ai::llm::Correlation;
use ustaad_ai::server;
use ustaad_ai::strategy::{Strategy, StrategyVersion};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ustaad-ai")]
#[command(about = "Construction industry Q&A assistant")]
struct Args {
    /// The question to ask
    question: String,

    /// Strategy version: v1 (retrieval chain) or v2 (tool-using agent)
    #[arg(short, long, default_value = "v2")]
    version: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = Config::from_env()?;
    let state = server::build_state(&config).await?;

    let version = StrategyVersion::parse(&args.version)?;
    let question = history::sanitize_question(&args.question);
    let correlation = Correlation {
        request_id: Uuid::new_v4().to_string(),
        user_id: "cli".to_string(),
        user_type: "internal".to_string(),
    };

    info!("Asking ({:?}): {}", version, question);

    let answer = state
        .registry
        .resolve(version)
        .respond(&question, &[], &correlation)
        .await?;

    println!("\n{}", answer);

    Ok(())
}
