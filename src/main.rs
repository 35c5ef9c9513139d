use anyhow::Error;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use datasift_preview_grabber::cli::command::{preview::results_json, PreviewCommand};
use datasift_preview_grabber::cli::Cli;
use datasift_preview_grabber::configuration::get_configuration;
use datasift_preview_grabber::telemetry::{get_subscriber, init_subscriber, log_file};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = get_configuration(cli.config.as_deref())?;
    let subscriber = get_subscriber(
        env!("CARGO_PKG_NAME").to_string(),
        settings.logging.level.clone(),
        log_file(&settings.logging.file)?,
    );
    init_subscriber(subscriber)?;

    let cancel = CancellationToken::new();
    let command = PreviewCommand::new(cli, &settings)?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling preview polling");
            cancel.cancel();
        }
    });

    let preview_results = command.run().await?;

    info!("Dumping the results to stdout...");
    println!("{}", results_json(&preview_results)?);

    Ok(())
}
