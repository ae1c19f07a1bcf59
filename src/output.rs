use streamdl::download::BatchReport;
use streamdl::providers::{Episode, Title, TitleDetails};

pub(crate) fn title_line(title: &Title) -> String {
    match title.year {
        Some(year) => format!("{}\t{} ({}) [{}]", title.id, title.name, year, title.kind),
        None => format!("{}\t{} [{}]", title.id, title.name, title.kind),
    }
}

pub(crate) fn episode_code(episode: &Episode) -> String {
    match (episode.season, episode.episode) {
        (Some(season), Some(number)) => format!("S{season:02}E{number:02}"),
        (None, Some(number)) => format!("E{number:02}"),
        _ => "-".to_owned(),
    }
}

pub(crate) fn episode_line(episode: &Episode) -> String {
    match &episode.language {
        Some(language) => format!(
            "{}  {}  [{}]  {}",
            episode_code(episode),
            episode.name,
            language,
            episode.url
        ),
        None => format!("{}  {}  {}", episode_code(episode), episode.name, episode.url),
    }
}

pub(crate) fn details_lines(details: &TitleDetails) -> Vec<String> {
    let title = &details.title;
    let mut lines = vec![
        format!("Id: {}", title.id),
        format!("Name: {}", title.name),
        format!("Type: {}", title.kind),
    ];

    if let Some(year) = title.year {
        lines.push(format!("Year: {year}"));
    }

    if let Some(season_count) = details.season_count {
        lines.push(format!("Seasons: {season_count}"));
    }

    let episode_count = details.episode_count.unwrap_or(details.episodes.len() as u32);
    lines.push(format!("Episodes: {episode_count}"));

    if let Some(poster) = &title.poster {
        lines.push(format!("Poster: {poster}"));
    }

    lines
}

pub(crate) fn report_lines(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Downloaded: {}, skipped: {}, failed: {}",
        report.downloaded.len(),
        report.skipped.len(),
        report.failures.len()
    )];

    for failure in &report.failures {
        lines.push(format!("FAILED {} ({}): {}", failure.name, failure.url, failure.reason));
    }

    lines
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use streamdl::download::{BatchReport, DownloadFailure};
    use streamdl::providers::{Episode, Title, TitleKind};

    use super::{episode_line, report_lines, title_line};

    fn episode(season: Option<u32>, number: Option<u32>, language: Option<&str>) -> Episode {
        Episode {
            id: "vf-s1e2".to_owned(),
            name: "Show - S01E02".to_owned(),
            season,
            episode: number,
            url: "https://uqload.cx/embed-abc.html".to_owned(),
            language: language.map(str::to_owned),
        }
    }

    #[test]
    fn test_title_line() {
        let mut title = Title {
            id: "42".to_owned(),
            name: "Show".to_owned(),
            year: Some(2021),
            kind: TitleKind::Series,
            poster: None,
        };
        assert_eq!(title_line(&title), "42\tShow (2021) [series]");

        title.year = None;
        title.kind = TitleKind::Movie;
        assert_eq!(title_line(&title), "42\tShow [movie]");
    }

    #[test]
    fn test_episode_line() {
        assert_eq!(
            episode_line(&episode(Some(1), Some(2), Some("VF"))),
            "S01E02  Show - S01E02  [VF]  https://uqload.cx/embed-abc.html"
        );
        assert_eq!(
            episode_line(&episode(None, None, None)),
            "-  Show - S01E02  https://uqload.cx/embed-abc.html"
        );
    }

    #[test]
    fn test_report_lines() {
        let report = BatchReport {
            downloaded: vec![PathBuf::from("a.mp4")],
            skipped: Vec::new(),
            failures: vec![DownloadFailure {
                name: "Show - S01E03".to_owned(),
                url: "https://uqload.cx/embed-x.html".to_owned(),
                reason: "failed after retries (3 attempts): downloader exited with code 1".to_owned(),
            }],
        };

        let lines = report_lines(&report);
        assert_eq!(lines[0], "Downloaded: 1, skipped: 0, failed: 1");
        assert!(lines[1].contains("after retries"));
        assert!(lines[1].contains("https://uqload.cx/embed-x.html"));
    }
}
