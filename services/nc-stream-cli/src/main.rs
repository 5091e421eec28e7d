//! NetCDF streaming command-line tool.
//!
//! Fetches one NetCDF object from S3, decodes it in memory and prints the
//! dataset to stdout. Logs go to stderr.

mod args;

use anyhow::Result;
use clap::Parser;
use nc_stream::NetCdfStreamer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (AWS_* variables for the S3 client)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json);

    let location = args.location()?;
    let options = args.stream_options();
    info!(location = %location, "Streaming NetCDF object");

    let dataset = NetCdfStreamer::new()
        .stream(&location.bucket, &location.key, &options)
        .await?;

    println!("{}", dataset);
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
