use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use streamdl::download::EpisodeFilter;

#[derive(Parser, Debug)]
#[command(version)]
/// Search streaming catalogs and download episodes with yt-dlp
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,

    /// Provider to use (catalog, frenchstream/fs)
    #[arg(long, global = true, value_name = "NAME")]
    pub(crate) provider: Option<String>,

    /// Provider specific title id
    #[arg(long = "titleId", global = true, value_name = "ID")]
    pub(crate) title_id: Option<String>,

    /// Search query
    #[arg(long, global = true)]
    pub(crate) query: Option<String>,

    /// Maximum number of search results
    #[arg(long, global = true, default_value_t = 10)]
    pub(crate) limit: usize,

    /// Only use episodes of this season
    #[arg(long, global = true)]
    pub(crate) season: Option<u32>,

    /// Only use specific episodes, e.g. 1,3,5-8
    #[arg(long, global = true, value_parser = parse_ranges, value_name = "RANGES")]
    pub(crate) episode: Option<Ranges>,

    /// Maximum number of episodes
    #[arg(long, global = true)]
    pub(crate) max: Option<NonZeroUsize>,

    /// Output directory [default: current directory]
    #[arg(long = "outDir", global = true, value_name = "DIR")]
    pub(crate) out_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub(crate) json: bool,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// Search titles
    Search,
    /// Show title metadata
    Info,
    /// List episodes
    List,
    /// Download episodes (default)
    Download,
}

impl Args {
    pub(crate) fn selected_command(&self) -> Command {
        self.command.unwrap_or(Command::Download)
    }

    pub(crate) fn episode_filter(&self) -> EpisodeFilter {
        EpisodeFilter {
            season: self.season,
            episodes: self.episode.as_ref().map(|ranges| ranges.0.clone()),
            max: self.max,
        }
    }
}

/// Merged, sorted, non-overlapping ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ranges(pub(crate) Vec<RangeInclusive<u32>>);

fn parse_ranges(input: &str) -> Result<Ranges, String> {
    const BEFORE_LAST: u32 = u32::MAX - 1;

    let no_space = input.replace(' ', "");
    let parts = no_space.split(',').filter(|part| !part.is_empty());
    let mut ranges: Vec<RangeInclusive<u32>> = Vec::new();

    for part in parts {
        if let Some((begin, end)) = part.split_once('-') {
            let Ok(begin @ ..=BEFORE_LAST) = begin.parse::<u32>() else {
                return Err(format!("failed to parse \"{begin}\" as integer in range \"{part}\""));
            };

            let Ok(end @ ..=BEFORE_LAST) = end.parse::<u32>() else {
                return Err(format!("failed to parse \"{end}\" as integer in range \"{part}\""));
            };

            if begin > end {
                return Err(format!("range start cannot be bigger than range end: \"{part}\""));
            }

            ranges.push(begin..=end);
        } else {
            let Ok(episode @ ..=BEFORE_LAST) = part.parse::<u32>() else {
                return Err(format!("failed to parse \"{part}\" as integer"));
            };

            ranges.push(episode..=episode);
        }
    }

    if ranges.is_empty() {
        return Err("no episode given".to_owned());
    }

    let mut lapper = rust_lapper::Lapper::new(
        ranges
            .iter()
            .map(|range| rust_lapper::Interval {
                start: *range.start(),
                stop: *range.end() + 1,
                val: (),
            })
            .collect(),
    );
    lapper.merge_overlaps();
    let merged_ranges = lapper
        .intervals
        .into_iter()
        .map(|interval| interval.start..=(interval.stop - 1))
        .collect();

    Ok(Ranges(merged_ranges))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::{parse_ranges, Args, Command, Ranges};

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_ranges() {
        assert_eq!(parse_ranges("3").unwrap(), Ranges(vec![3..=3]));
        assert_eq!(parse_ranges("1, 5-7,6").unwrap(), Ranges(vec![1..=1, 5..=7]));
        assert_eq!(parse_ranges("4-6,1,5").unwrap(), Ranges(vec![1..=1, 4..=6]));
        assert!(parse_ranges("7-3").is_err());
        assert!(parse_ranges("a").is_err());
        assert!(parse_ranges("").is_err());
    }

    #[test]
    fn test_default_command_is_download() {
        let args = Args::try_parse_from(["streamdl", "--titleId", "42"]).unwrap();
        assert_eq!(args.selected_command(), Command::Download);
        assert_eq!(args.title_id.as_deref(), Some("42"));
        assert_eq!(args.limit, 10);
    }

    #[test]
    fn test_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "streamdl",
            "list",
            "--provider",
            "fs",
            "--titleId",
            "/15-show.html",
            "--season",
            "2",
            "--episode",
            "1,3",
            "--max",
            "1",
            "--outDir",
            "/tmp/out",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.selected_command(), Command::List);
        assert_eq!(args.provider.as_deref(), Some("fs"));
        assert_eq!(args.out_dir, Some(PathBuf::from("/tmp/out")));
        assert!(args.json);

        let filter = args.episode_filter();
        assert_eq!(filter.season, Some(2));
        assert_eq!(filter.episodes, Some(vec![1..=1, 3..=3]));
        assert_eq!(filter.max.map(|max| max.get()), Some(1));
    }

    #[test]
    fn test_max_must_be_positive() {
        assert!(Args::try_parse_from(["streamdl", "--max", "0"]).is_err());
    }
}
