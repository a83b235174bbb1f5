use anyhow::Result;
use clap::{Parser, Subcommand};
use lookbook_backend::api;
use lookbook_backend::bootstrap;
use lookbook_backend::config::LookbookConfig;
use lookbook_backend::seed;
use lookbook_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Lookbook backend daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
    /// Load demo authors, posts, and catalogue products
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = LookbookConfig::from_env()?;
    let bootstrap = bootstrap::initialize(&config).await?;
    tracing::info!(
        directories_created = ?bootstrap.directories_created,
        database_initialized = bootstrap.database_initialized,
        "bootstrap complete"
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, bootstrap.database).await,
        Command::Seed => {
            let summary = seed::load_demo(&bootstrap.database)?;
            tracing::info!(
                authors = summary.authors,
                posts = summary.posts,
                products = summary.products,
                "demo data loaded"
            );
            Ok(())
        }
    }
}
