use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xarchive::app::AppContext;
use xarchive::cli::{commands, Cli, Commands};
use xarchive::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config, cli.data_dir)?;
    tracing::debug!(data_dir = %ctx.data_dir.display(), "Using data directory");

    match cli.command {
        Commands::Crawl {
            max_posts,
            delay_ms,
        } => {
            commands::crawl(&ctx, max_posts, delay_ms).await?;
        }
        Commands::Extract => {
            commands::extract(&ctx)?;
        }
        Commands::Run {
            max_posts,
            delay_ms,
        } => {
            commands::run(&ctx, max_posts, delay_ms).await?;
        }
        Commands::List { page, page_size } => {
            commands::list_posts(&ctx, page, page_size)?;
        }
        Commands::Show { id } => {
            commands::show_post(&ctx, &id)?;
        }
        Commands::Tui => {
            xarchive::tui::run(&ctx)?;
        }
    }

    Ok(())
}
