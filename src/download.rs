use std::collections::HashSet;
use std::num::{NonZeroU32, NonZeroUsize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::DownloadError;
use crate::providers::Episode;
use crate::utils::remove_file_ignore_not_exists;

pub const OUTPUT_EXTENSION: &str = "mp4";

/// Narrows an episode list down to what the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFilter {
    pub season: Option<u32>,
    pub episodes: Option<Vec<RangeInclusive<u32>>>,
    pub max: Option<NonZeroUsize>,
}

impl EpisodeFilter {
    fn matches(&self, episode: &Episode) -> bool {
        let season_matches = match self.season {
            Some(season) => episode.season == Some(season),
            None => true,
        };

        let episode_matches = match (&self.episodes, episode.episode) {
            (None, _) => true,
            (Some(ranges), Some(number)) => ranges.iter().any(|range| range.contains(&number)),
            (Some(_), None) => false,
        };

        season_matches && episode_matches
    }

    /// Applies season and episode constraints, then the maximum count.
    ///
    /// If the season and episode constraints leave nothing, the whole list is
    /// used instead.
    pub fn apply(&self, episodes: &[Episode]) -> Vec<Episode> {
        let filtered = episodes
            .iter()
            .filter(|episode| self.matches(episode))
            .cloned()
            .collect::<Vec<_>>();

        let mut selected = if filtered.is_empty() && !episodes.is_empty() {
            log::warn!("No episode matches the season/episode filter, using all {} episodes", episodes.len());
            episodes.to_vec()
        } else {
            filtered
        };

        if let Some(max) = self.max {
            selected.truncate(max.get());
        }

        selected
    }
}

/// Replaces characters that are not allowed in file names on common file
/// systems with `-` and cleans up whitespace.
pub fn sanitize_file_name(name: &str) -> String {
    const NAME_LIMIT: usize = 160;

    static MULTIPLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

    let no_special_spaces = name.replace(char::is_whitespace, " ");
    let no_control_chars = no_special_spaces.replace(|c: char| c.is_control(), "");
    let no_illegal = no_control_chars.replace(['<', '>', ':', '"', '/', '\\', '|', '?', '*'], "-");
    let no_multiple_space = MULTIPLE_SPACE.replace_all(&no_illegal, " ");
    let no_dot_or_space_at_ends = no_multiple_space.trim_matches(|c: char| c == ' ' || c == '.');

    if no_dot_or_space_at_ends.is_empty() {
        return "Untitled".to_owned();
    }

    let mut total_bytes = 0;
    let limited = no_dot_or_space_at_ends
        .chars()
        .take_while(|c| {
            total_bytes += c.len_utf8();
            total_bytes <= NAME_LIMIT
        })
        .collect::<String>();

    limited.trim_end_matches(|c: char| c == ' ' || c == '.').to_owned()
}

/// `<base>/<show>/Season NN/<show> - SNNENN.<ext>` when both numbers are known,
/// `<base>/<show>/<show>.<ext>` otherwise.
pub fn build_output_path(
    base: &Path,
    show_name: &str,
    season: Option<u32>,
    episode: Option<u32>,
    extension: &str,
) -> PathBuf {
    let show = sanitize_file_name(show_name);
    let show_directory = base.join(&show);

    match (season, episode) {
        (Some(season), Some(episode)) => show_directory
            .join(format!("Season {season:02}"))
            .join(format!("{show} - S{season:02}E{episode:02}.{extension}")),
        _ => show_directory.join(format!("{show}.{extension}")),
    }
}

async fn is_already_downloaded(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

async fn remove_leftover(path: &Path) {
    if let Err(err) = remove_file_ignore_not_exists(path).await {
        log::warn!("Failed to remove leftover file {}: {}", path.display(), err);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: NonZeroU32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: NonZeroU32::new(3).unwrap(),
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait time after the failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub output_path: PathBuf,
    pub attempt: u32,
}

/// The program that fetches a player url into a local file.
#[allow(async_fn_in_trait)]
pub trait ExternalDownloader {
    async fn download(&self, task: &DownloadTask) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub name: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<DownloadFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum EpisodeOutcome {
    Downloaded,
    Skipped,
}

/// Downloads episodes one after another, skipping finished files and
/// retrying failed ones.
pub struct DownloadManager<D> {
    downloader: D,
    save_directory: PathBuf,
    retry_policy: RetryPolicy,
}

impl<D: ExternalDownloader> DownloadManager<D> {
    pub fn new(downloader: D, save_directory: PathBuf) -> Self {
        DownloadManager {
            downloader,
            save_directory,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn output_path(&self, show_name: &str, episode: &Episode) -> PathBuf {
        build_output_path(
            &self.save_directory,
            show_name,
            episode.season,
            episode.episode,
            OUTPUT_EXTENSION,
        )
    }

    pub async fn download_all(&self, show_name: &str, episodes: &[Episode]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut seen_paths = HashSet::new();

        for (i, episode) in episodes.iter().enumerate() {
            let output_path = self.output_path(show_name, episode);
            log::info!("[{}/{}] {}", i + 1, episodes.len(), episode.name);

            if !seen_paths.insert(output_path.clone()) {
                log::warn!(
                    "{} ({}) has the same output path as an earlier episode: {}",
                    episode.name,
                    episode.url,
                    output_path.display()
                );
            }

            match self.download_episode(episode, &output_path).await {
                Ok(EpisodeOutcome::Downloaded) => report.downloaded.push(output_path),
                Ok(EpisodeOutcome::Skipped) => report.skipped.push(output_path),
                Err(reason) => {
                    log::error!("Failed download of {}: {}", episode.name, reason);
                    report.failures.push(DownloadFailure {
                        name: episode.name.clone(),
                        url: episode.url.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    async fn download_episode(&self, episode: &Episode, output_path: &Path) -> Result<EpisodeOutcome, String> {
        if is_already_downloaded(output_path).await {
            log::info!("Skipping, already exists: {}", output_path.display());
            return Ok(EpisodeOutcome::Skipped);
        }

        if let Some(parent) = output_path.parent() {
            if let Err(source) = tokio::fs::create_dir_all(parent).await {
                let err = DownloadError::OutputDir {
                    path: parent.to_owned(),
                    source,
                };
                return Err(format!("{:#}", anyhow::Error::new(err)));
            }
        }

        let attempts = self.retry_policy.attempts.get();
        let mut last_error = None;

        for attempt in 1..=attempts {
            // Only an empty file or the leftover of a failed attempt can be there
            remove_leftover(output_path).await;

            let task = DownloadTask {
                url: episode.url.clone(),
                output_path: output_path.to_owned(),
                attempt,
            };

            match self.downloader.download(&task).await {
                Ok(()) => {
                    log::info!("Downloaded {}", output_path.display());
                    return Ok(EpisodeOutcome::Downloaded);
                }
                Err(err) => {
                    let err = anyhow::Error::new(err);
                    log::warn!("Attempt {}/{} for {} failed: {:#}", attempt, attempts, episode.name, err);

                    if attempt < attempts {
                        let delay = self.retry_policy.delay_for(attempt);
                        log::info!("Retrying in {}s", delay.as_secs_f32());
                        tokio::time::sleep(delay).await;
                    }

                    last_error = Some(err);
                }
            }
        }

        remove_leftover(output_path).await;

        Err(match last_error {
            Some(err) => format!("failed after retries ({} attempts): {:#}", attempts, err),
            None => format!("failed after retries ({} attempts)", attempts),
        })
    }
}
