use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{Episode, Provider, Title, TitleDetails, TitleKind};
use crate::error::Result;
use crate::extractors::{select_player_url, PlayerLinks, PLAYER_PRIORITY};
use crate::http;
use crate::utils::{html_to_text, split_trailing_year};

pub(crate) const DEFAULT_ORIGIN: &str = "https://french-stream.one";

const UNKNOWN_NAME: &str = "Unknown";

static SEASON_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)saison[\s_-]*(\d+)").unwrap());

/// Provider scraping a server rendered streaming site.
pub struct FrenchStream {
    origin: Url,
}

impl FrenchStream {
    pub fn new(origin: Url) -> Self {
        FrenchStream { origin }
    }

    /// Accepts an absolute url or a path on the site.
    fn page_url(&self, title_id: &str) -> Result<Url> {
        let title_id = title_id.trim();

        match Url::parse(title_id) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(url),
            _ => Ok(self.origin.join(title_id)?),
        }
    }

    fn episode_data_url(&self, numeric_id: &str) -> Result<Url> {
        let mut url = self.origin.join("/ep-data.php")?;
        url.query_pairs_mut().append_pair("id", numeric_id);
        Ok(url)
    }
}

impl Provider for FrenchStream {
    fn name(&self) -> &'static str {
        "frenchstream"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Title>> {
        let url = self.origin.join("/engine/ajax/search.php")?;
        let html = http::post_form(&url, &[("query", query), ("page", "1")], Some(self.origin.as_str())).await?;

        let mut titles = parse_search_results(&html);
        titles.truncate(limit);
        Ok(titles)
    }

    async fn get_details(&self, title_id: &str) -> Result<TitleDetails> {
        let page_url = self.page_url(title_id)?;
        let html = http::get_text(&page_url, None).await?;
        let page = parse_detail_page(&html, &page_url);

        let episodes = match &page.numeric_id {
            Some(numeric_id) => {
                let data_url = self.episode_data_url(numeric_id)?;
                let data = http::get_json::<EpisodeData>(&data_url, Some(page_url.as_str())).await?;
                resolve_episodes(&data, page.season, &page.name)
            }
            None => {
                log::debug!("No numeric id in {}, no episodes to resolve", page_url);
                Vec::new()
            }
        };

        let episode_count = Some(episodes.len() as u32);

        Ok(TitleDetails {
            title: Title {
                id: title_id.trim().to_owned(),
                name: page.name,
                year: page.year,
                kind: page.kind,
                poster: page.poster,
            },
            episodes,
            season_count: None,
            episode_count,
        })
    }
}

fn has_season_marker(input: &str) -> bool {
    SEASON_REGEX.is_match(input)
}

fn parse_search_results(html: &str) -> Vec<Title> {
    static CARD_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"onclick\s*=\s*["'](?:window\.)?location(?:\.href)?\s*=\s*(?:&#0?39;|\\?')([^'"&\\]+)"#).unwrap()
    });
    static TITLE_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"(?s)<div[^>]*class\s*=\s*["'][^"']*search-title[^"']*["'][^>]*>(.*?)</div>"#).unwrap());
    static POSTER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img[^>]*\ssrc\s*=\s*["']([^"']+)["']"#).unwrap());

    let cards = CARD_REGEX.captures_iter(html).collect::<Vec<_>>();
    let mut titles = Vec::with_capacity(cards.len());

    for (i, card) in cards.iter().enumerate() {
        let (Some(whole), Some(path)) = (card.get(0), card.get(1)) else {
            continue;
        };

        let end = cards
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|next| next.start())
            .unwrap_or(html.len());
        let chunk = &html[whole.end()..end];

        let Some(raw_title) = TITLE_REGEX.captures(chunk).and_then(|captures| captures.get(1)) else {
            log::debug!("Search result without title: {}", path.as_str());
            continue;
        };

        let path = path.as_str().trim();
        let text = html_to_text(raw_title.as_str());
        let (name, year) = split_trailing_year(&text);

        if name.is_empty() || path.is_empty() {
            continue;
        }

        let kind = if has_season_marker(&name) || has_season_marker(path) {
            TitleKind::Series
        } else {
            TitleKind::Movie
        };

        titles.push(Title {
            id: path.to_owned(),
            name,
            year,
            kind,
            poster: POSTER_REGEX
                .captures(chunk)
                .and_then(|captures| captures.get(1))
                .map(|poster| poster.as_str().to_owned()),
        });
    }

    titles
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailPage {
    name: String,
    year: Option<u32>,
    kind: TitleKind,
    season: u32,
    numeric_id: Option<String>,
    poster: Option<String>,
}

fn strip_decorations(name: &str) -> String {
    static DECORATION_REGEXES: Lazy<[Regex; 4]> = Lazy::new(|| {
        [
            Regex::new(r"(?i)^\s*(?:regarder|voir)\s+(?:le\s+film\s+|la\s+s[ée]rie\s+)?").unwrap(),
            Regex::new(r"(?i)\s*[|–—-]?\s*french[\s-]?stream.*$").unwrap(),
            Regex::new(r"(?i)\s*(?:en\s+)?(?:streaming|t[ée]l[ée]chargement)\b.*$").unwrap(),
            Regex::new(r"(?i)\s+(?:vf|vostfr|hd|gratuit|complet)(?:\s+(?:vf|vostfr|hd|gratuit|complet))*\s*$").unwrap(),
        ]
    });

    let mut output = name.to_owned();
    for regex in DECORATION_REGEXES.iter() {
        output = regex.replace(&output, "").into_owned();
    }

    output
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '|' | '–' | '—' | ':'))
        .to_owned()
}

fn parse_detail_page(html: &str, page_url: &Url) -> DetailPage {
    static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
    static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
    static NUMERIC_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(\d+)(?:[-./]|$)").unwrap());
    static POSTER_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"<meta[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#).unwrap()
    });

    let raw_name = [&*HEADING_REGEX, &*TITLE_REGEX]
        .into_iter()
        .filter_map(|regex| regex.captures(html).and_then(|captures| captures.get(1)))
        .map(|raw| strip_decorations(&html_to_text(raw.as_str())))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned());
    let (name, year) = split_trailing_year(&raw_name);
    let name = if name.is_empty() { raw_name } else { name };

    let path = page_url.path();
    let numeric_id = NUMERIC_ID_REGEX
        .captures(path)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_owned());

    let season_captures = SEASON_REGEX.captures(path).or_else(|| SEASON_REGEX.captures(&name));
    let season = season_captures
        .as_ref()
        .and_then(|captures| captures.get(1))
        .and_then(|season| season.as_str().parse::<u32>().ok())
        .unwrap_or(1);
    let kind = if season_captures.is_some() {
        TitleKind::Series
    } else {
        TitleKind::Movie
    };

    DetailPage {
        name,
        year,
        kind,
        season,
        numeric_id,
        poster: POSTER_REGEX
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|poster| poster.as_str().to_owned()),
    }
}

/// Language tracks of the episode-data endpoint, in merge order: a later
/// track replaces an earlier one for the same episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Original,
    Subtitled,
    Dubbed,
}

impl Track {
    const MERGE_ORDER: [Track; 3] = [Track::Original, Track::Subtitled, Track::Dubbed];

    fn key(&self) -> &'static str {
        match self {
            Track::Original => "vo",
            Track::Subtitled => "vostfr",
            Track::Dubbed => "vf",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Track::Original => "VO",
            Track::Subtitled => "VOSTFR",
            Track::Dubbed => "VF",
        }
    }
}

/// Per track, episode number as text to the player links of that episode.
///
/// Tracks that are missing or not objects (the endpoint answers `[]` for
/// empty ones) become empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
struct EpisodeData {
    tracks: HashMap<&'static str, Vec<(String, PlayerLinks)>>,
}

impl EpisodeData {
    fn track(&self, track: Track) -> &[(String, PlayerLinks)] {
        self.tracks.get(track.key()).map(Vec::as_slice).unwrap_or_default()
    }
}

impl From<serde_json::Value> for EpisodeData {
    fn from(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut object) = value else {
            return EpisodeData::default();
        };

        let tracks = Track::MERGE_ORDER
            .iter()
            .map(|track| {
                let episodes = match object.remove(track.key()) {
                    Some(serde_json::Value::Object(episodes)) => episodes
                        .into_iter()
                        .filter_map(|(number, links)| match links {
                            serde_json::Value::Object(links) => {
                                Some((number, PlayerLinks::from(links.into_iter().collect::<HashMap<_, _>>())))
                            }
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                (track.key(), episodes)
            })
            .collect();

        EpisodeData { tracks }
    }
}

fn resolve_episodes(data: &EpisodeData, season: u32, show_name: &str) -> Vec<Episode> {
    let mut merged = BTreeMap::new();

    for track in Track::MERGE_ORDER {
        for (number, links) in data.track(track) {
            let Ok(episode_number) = number.trim().parse::<u32>() else {
                log::debug!("Ignoring episode key \"{}\" of track {}", number, track.tag());
                continue;
            };

            let Some(player) = select_player_url(links) else {
                log::debug!(
                    "No usable player ({}) for S{:02}E{:02} in track {}",
                    PLAYER_PRIORITY.join(", "),
                    season,
                    episode_number,
                    track.tag()
                );
                continue;
            };

            log::debug!(
                "Using {} for S{:02}E{:02} in track {}",
                player.name,
                season,
                episode_number,
                track.tag()
            );

            let episode = Episode {
                id: format!("{}-s{}e{}", track.key(), season, episode_number),
                name: format!("{} - S{:02}E{:02}", show_name, season, episode_number),
                season: Some(season),
                episode: Some(episode_number),
                url: player.url,
                language: Some(track.tag().to_owned()),
            };

            merged.insert((season, episode_number), episode);
        }
    }

    merged.into_values().collect()
}
