use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cli::{Args, Command};
use serde::Serialize;
use streamdl::download::DownloadManager;
use streamdl::providers::{DispatchProvider, Provider, ProviderConfig, ProviderRegistry};
use streamdl::ytdlp::{DownloaderConfig, YtDlp};

mod cli;
mod dirs;
mod logger;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse arguments
    let args = cli::Args::parse();

    // Set up logger
    if let Err(err) = logger::init(args.debug) {
        eprintln!("Failed to set up logger: {err}");
        std::process::exit(1);
    }

    // Provider origins
    let provider_config = match ProviderConfig::new(
        env_string(ProviderConfig::CATALOG_ORIGIN_VAR).as_deref(),
        env_string(ProviderConfig::SITE_ORIGIN_VAR).as_deref(),
    ) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid provider origin: {:#}", err);
            std::process::exit(1);
        }
    };

    let registry = ProviderRegistry::new(&provider_config);
    let provider = registry.find(args.provider.as_deref());
    log::debug!("Using provider {}", provider.name());

    match run(provider, &args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            let upstream = err
                .downcast_ref::<streamdl::error::Error>()
                .is_some_and(streamdl::error::Error::is_upstream);

            if upstream {
                log::error!("Upstream request failed: {:#}", err);
            } else {
                log::error!("{:#}", err);
            }

            std::process::exit(1);
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_os_string(name: &str) -> Option<OsString> {
    std::env::var_os(name).filter(|value| !value.is_empty())
}

/// Returns `false` when the command finished but some episodes failed.
async fn run(provider: &DispatchProvider, args: &Args) -> Result<bool, anyhow::Error> {
    match args.selected_command() {
        Command::Search => {
            let query = args.query.as_deref().context("--query is required for search")?;
            let titles = provider
                .search(query, args.limit)
                .await
                .with_context(|| format!("failed to search for \"{query}\""))?;

            print_or_json(args.json, &titles, || titles.iter().map(output::title_line).collect())?;
        }
        Command::Info => {
            let title_id = required_title_id(args)?;
            let details = provider
                .get_details(title_id)
                .await
                .with_context(|| format!("failed to get details of {title_id}"))?;

            print_or_json(args.json, &details, || output::details_lines(&details))?;
        }
        Command::List => {
            let title_id = required_title_id(args)?;
            let episodes = provider
                .get_episodes(title_id)
                .await
                .with_context(|| format!("failed to get episodes of {title_id}"))?;
            let episodes = args.episode_filter().apply(&episodes);

            print_or_json(args.json, &episodes, || {
                episodes.iter().map(output::episode_line).collect()
            })?;
        }
        Command::Download => return download(provider, args).await,
    }

    Ok(true)
}

async fn download(provider: &DispatchProvider, args: &Args) -> Result<bool, anyhow::Error> {
    let title_id = required_title_id(args)?;

    // Fail fast if yt-dlp is missing
    let downloader_config = DownloaderConfig::resolve(
        env_os_string(DownloaderConfig::EXECUTABLE_VAR).map(PathBuf::from),
        env_os_string(DownloaderConfig::PLUGIN_DIRS_VAR).as_deref(),
    )?;

    let save_directory = dirs::get_save_directory(args.out_dir.clone())?;

    let details = provider
        .get_details(title_id)
        .await
        .with_context(|| format!("failed to get details of {title_id}"))?;
    let episodes = args.episode_filter().apply(&details.episodes);

    if episodes.is_empty() {
        log::warn!("Nothing to download for {}", details.title.name);
        return Ok(true);
    }

    log::info!(
        "Downloading {} episode(s) of {} to {}",
        episodes.len(),
        details.title.name,
        save_directory.display()
    );

    let downloader = YtDlp::new(downloader_config).quiet(args.json);
    let manager = DownloadManager::new(downloader, save_directory);
    let report = manager.download_all(&details.title.name, &episodes).await;

    print_or_json(args.json, &report, || output::report_lines(&report))?;

    Ok(report.is_success())
}

fn required_title_id(args: &Args) -> Result<&str, anyhow::Error> {
    args.title_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .context("--titleId is required")
}

fn print_or_json<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    lines: impl FnOnce() -> Vec<String>,
) -> Result<(), anyhow::Error> {
    if json {
        let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
        println!("{text}");
    } else {
        for line in lines() {
            println!("{line}");
        }
    }

    Ok(())
}
