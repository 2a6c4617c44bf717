use clap::Parser;
use es_mcp_server::{config::Cli, logging::init_logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    server::run(cli).await
}
