use std::process::ExitCode;

use clap::Parser;
use storefront_client::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    storefront_observability::init(cli.settings.log_format);

    match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("storefront failed: {err:?}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
