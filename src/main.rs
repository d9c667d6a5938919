use clap::Parser;
use push_gateway::cli::{self, Cli, execute_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, environment) = cli::load_and_merge_config(&cli)?;

    cli::init_logger_from_settings(&cli, &settings)?;

    if let Err(e) = execute_command(&cli, settings, environment).await {
        tracing::error!(error = %e, "Command failed");
        return Err(e.into());
    }

    Ok(())
}
