#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::Level;

use subforge::cli::Args;
use subforge::convert::Converter;
use subforge::settings::Settings;
use subforge::sources::{NodeSource, fetch_subscription};
use subforge::subconverter::Subconverter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => Settings::load(path).await?,
        None => Settings::default(),
    };

    // Remote conversion by URL hands the whole job to the external service.
    if args.remote
        && let Some(url) = &args.url
    {
        let service = Subconverter::new(
            &settings.subconverter_url,
            Duration::from_secs(settings.request_timeout),
        );
        let document = service.convert_url(url).await?;
        return write_output(args.output.as_deref(), &document).await;
    }

    let content = gather_content(&args, &settings).await?;

    if args.remote {
        let service = Subconverter::new(
            &settings.subconverter_url,
            Duration::from_secs(settings.request_timeout),
        );
        let document = service.convert_content(&content).await?;
        return write_output(args.output.as_deref(), &document).await;
    }

    let converter = Converter::with_settings(&settings);
    let outcome = converter.convert(&content, !args.skip_validate).await?;

    if !outcome.failures.is_empty() {
        tracing::warn!(
            "{} of {} line(s) skipped:",
            outcome.failures.len(),
            outcome.failures.len() + outcome.proxy_count
        );
        for failure in &outcome.failures {
            tracing::warn!("  {}: {}", failure.reason, failure.line);
        }
    }
    tracing::info!("Converted {} proxy node(s)", outcome.proxy_count);

    write_output(args.output.as_deref(), &outcome.document).await
}

/// Collect raw share-link content from whichever source the CLI selected.
async fn gather_content(args: &Args, settings: &Settings) -> anyhow::Result<String> {
    if args.nodes {
        if settings.nodes.is_empty() {
            anyhow::bail!("--nodes requires a settings file with a non-empty `nodes` list");
        }
        let source = NodeSource::new(
            &settings.source_bin,
            Duration::from_secs(settings.request_timeout),
        );
        let enumeration = source.enumerate(&settings.nodes).await?;
        for error in &enumeration.errors {
            tracing::warn!("{}", error);
        }
        if enumeration.links.is_empty() {
            anyhow::bail!("node enumeration produced no share links");
        }
        return Ok(enumeration.links.join("\n"));
    }

    if let Some(url) = &args.url {
        let content =
            fetch_subscription(url, Duration::from_secs(settings.request_timeout)).await?;
        return Ok(content);
    }

    if let Some(path) = &args.input {
        if path == "-" {
            let mut content = String::new();
            tokio::io::stdin().read_to_string(&mut content).await?;
            return Ok(content);
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return Ok(content);
    }

    anyhow::bail!("one of --input, --url or --nodes is required")
}

async fn write_output(path: Option<&str>, document: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = std::path::Path::new(path).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, document).await?;
            tracing::info!("Config written to {}", path);
        }
        None => {
            println!("{document}");
        }
    }
    Ok(())
}
