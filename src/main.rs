mod cli;

use segstream::{
    config::{self, Config},
    fetch::SegmentFetcher,
    pipeline::{StreamRequest, StreamSession},
    report,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn size_report(config: &Config, server_url: &str, movie: &str, output: &Path) -> Result<()> {
    let fetcher = SegmentFetcher::new(server_url, movie, &config.origin)?;
    report::write_size_report(&fetcher, output).await?;
    println!("Results written to {}", output.display());
    Ok(())
}

async fn download(
    config: &Config,
    server_url: &str,
    movie: &str,
    output: &Path,
    dest: &Path,
) -> Result<()> {
    let fetcher = SegmentFetcher::new(server_url, movie, &config.origin)?;
    let timings = report::write_download_report(&fetcher, dest, output).await?;

    for (index, timing) in timings.iter().enumerate() {
        println!(
            "Track {}: {:.2}s, {:.2} bytes/s",
            index,
            timing.elapsed.as_secs_f64(),
            timing.throughput()
        );
    }
    println!("Results written to {}", output.display());
    Ok(())
}

async fn stream(config: &Config, request: StreamRequest, player: Option<String>) -> Result<()> {
    let mut session = StreamSession::new(request, config);
    if let Some(address) = player {
        session = session.with_player_address(address);
    }

    let summary = session.run().await?;
    println!(
        "Streaming complete: {} segments, {} bytes of {}",
        summary.segments, summary.bytes, summary.filename
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "segstream=trace,segstream_manifest=debug,segstream_common=debug".to_string()
        } else {
            "segstream=info,segstream_manifest=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::SizeReport {
            server_url,
            movie,
            output,
        } => rt.block_on(size_report(&config, &server_url, &movie, &output)),
        Commands::Download {
            server_url,
            movie,
            output,
            dest,
        } => rt.block_on(download(&config, &server_url, &movie, &output, &dest)),
        Commands::Stream {
            base_url,
            movie,
            track,
            player,
        } => {
            let request = StreamRequest {
                base_url,
                movie,
                track,
            };
            rt.block_on(stream(&config, request, player))
        }
    }
}
