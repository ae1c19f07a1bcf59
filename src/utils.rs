use std::io::ErrorKind;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) async fn remove_file_ignore_not_exists(path: impl AsRef<Path>) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Finds an `S01E02`-style token anywhere in `label` and returns `(season, episode)`.
///
/// The season may have one or two digits, the episode one to three, and
/// whitespace is allowed between both parts.
pub fn parse_season_episode(label: &str) -> Option<(u32, u32)> {
    static SEASON_EPISODE_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)s(\d{1,2})\s*e(\d{1,3})").unwrap());

    let captures = SEASON_EPISODE_REGEX.captures(label)?;
    let season = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let episode = captures.get(2)?.as_str().parse::<u32>().ok()?;

    Some((season, episode))
}

/// Splits a trailing `(2021)` off a display name.
pub(crate) fn split_trailing_year(name: &str) -> (String, Option<u32>) {
    static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\((\d{4})\)\s*$").unwrap());

    match YEAR_REGEX.captures(name) {
        Some(captures) => {
            let year = captures.get(1).and_then(|year| year.as_str().parse::<u32>().ok());
            let start = captures.get(0).map(|whole| whole.start()).unwrap_or(name.len());
            (name[..start].trim().to_owned(), year)
        }
        None => (name.trim().to_owned(), None),
    }
}

/// Converts an HTML snippet to a single line of text.
pub(crate) fn html_to_text(html: &str) -> String {
    let text = nanohtml2text::html2text(html);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{html_to_text, parse_season_episode, split_trailing_year};

    #[test]
    fn test_parse_season_episode() {
        let tests = [
            ("S01E02", Some((1, 2))),
            ("s1e2", Some((1, 2))),
            ("Show S03 E115 - Finale", Some((3, 115))),
            ("Show.S12E007.1080p", Some((12, 7))),
            ("[s2e10]", Some((2, 10))),
            ("Episode 5", None),
            ("S123E01", None),
            ("S01E1234", Some((1, 123))),
            ("Season 1 Episode 2", None),
            ("", None),
        ];

        for (input, expected) in tests {
            assert_eq!(parse_season_episode(input), expected, "failed for {}", input);
        }
    }

    #[test]
    fn test_split_trailing_year() {
        assert_eq!(split_trailing_year("Dune (2021)"), ("Dune".to_owned(), Some(2021)));
        assert_eq!(split_trailing_year("Dune"), ("Dune".to_owned(), None));
        assert_eq!(
            split_trailing_year("Blade Runner (2049) Extended"),
            ("Blade Runner (2049) Extended".to_owned(), None)
        );
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("<span>Tom &amp; Jerry</span>\n  Saison 1"), "Tom & Jerry Saison 1");
    }
}
