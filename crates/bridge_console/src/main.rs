mod app;
mod cli;
mod client;
mod config;
mod events;
mod logging;
mod recording;
mod report;
mod session;
mod streaming;


use anyhow::Result;
use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::setup_logging(args.verbose);
    app::terminal::run(args).await
}
