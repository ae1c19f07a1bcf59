use std::collections::HashSet;

use serde::Deserialize;
use url::Url;

use super::{Episode, Provider, Title, TitleDetails, TitleKind};
use crate::error::{Error, Result};
use crate::extractors::uqload::Uqload;
use crate::extractors::{is_embed_url, PlayerHost};
use crate::http;
use crate::utils::parse_season_episode;

pub(crate) const DEFAULT_ORIGIN: &str = "https://api.mtdb.tv";

const SUCCESS_STATUS: &str = "success";

/// Provider backed by a JSON catalog API.
pub struct Catalog {
    origin: Url,
}

impl Catalog {
    pub fn new(origin: Url) -> Self {
        Catalog { origin }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url> {
        let mut url = self.endpoint(&["secure", "search", query])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        Ok(url)
    }

    fn details_url(&self, title_id: &str) -> Result<Url> {
        let (id, slug) = split_title_id(title_id);
        let mut url = self.endpoint(&["secure", "titles", id])?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("titleId", id);
            if let Some(slug) = slug {
                query.append_pair("titleName", slug);
            }
        }

        Ok(url)
    }
}

impl Provider for Catalog {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Title>> {
        let url = self.search_url(query, limit)?;
        let envelope = http::get_json::<SearchEnvelope>(&url, None).await?;
        let mut titles = parse_search(envelope, &url)?;
        titles.truncate(limit);
        Ok(titles)
    }

    async fn get_details(&self, title_id: &str) -> Result<TitleDetails> {
        let url = self.details_url(title_id)?;
        let envelope = http::get_json::<DetailsEnvelope>(&url, None).await?;
        parse_details(envelope, &url)
    }
}

/// Splits `"123-some-slug"` into the numeric id and the slug hint.
fn split_title_id(title_id: &str) -> (&str, Option<&str>) {
    let title_id = title_id.trim();

    match title_id.split_once('-') {
        Some((id, slug)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !slug.is_empty() => {
            (id, Some(slug))
        }
        _ => (title_id, None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Number(u64),
    Text(String),
    Bool(bool),
}

impl LooseValue {
    fn into_string(self) -> String {
        match self {
            LooseValue::Number(number) => number.to_string(),
            LooseValue::Text(text) => text,
            LooseValue::Bool(value) => value.to_string(),
        }
    }

    fn as_u32(&self) -> Option<u32> {
        match self {
            LooseValue::Number(number) => u32::try_from(*number).ok(),
            LooseValue::Text(text) => text.trim().parse().ok(),
            LooseValue::Bool(_) => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            LooseValue::Number(number) => Some(*number != 0),
            LooseValue::Text(text) => match text.trim() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
            LooseValue::Bool(value) => Some(*value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: Option<String>,
    #[serde(default)]
    results: Vec<TitleRecord>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: Option<String>,
    title: Option<TitleRecord>,
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
    id: LooseValue,
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    model_type: Option<String>,
    year: Option<LooseValue>,
    is_series: Option<LooseValue>,
    poster: Option<String>,
    season_count: Option<LooseValue>,
    episode_count: Option<LooseValue>,
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

#[derive(Debug, Deserialize)]
struct VideoRecord {
    id: Option<LooseValue>,
    name: Option<String>,
    #[serde(alias = "url")]
    src: Option<String>,
    language: Option<String>,
}

impl TitleRecord {
    fn kind(&self) -> TitleKind {
        let is_series = self.is_series.as_ref().and_then(LooseValue::as_bool).unwrap_or_else(|| {
            [self.kind.as_deref(), self.model_type.as_deref()]
                .into_iter()
                .flatten()
                .any(|kind| kind.eq_ignore_ascii_case("series"))
        });

        if is_series {
            TitleKind::Series
        } else {
            TitleKind::Movie
        }
    }

    fn into_title(self) -> (Title, Option<u32>, Option<u32>, Vec<VideoRecord>) {
        let kind = self.kind();
        let title = Title {
            id: self.id.into_string(),
            name: self.name.trim().to_owned(),
            year: self.year.as_ref().and_then(LooseValue::as_u32),
            kind,
            poster: self.poster.filter(|poster| !poster.trim().is_empty()),
        };
        let season_count = self.season_count.as_ref().and_then(LooseValue::as_u32);
        let episode_count = self.episode_count.as_ref().and_then(LooseValue::as_u32);

        (title, season_count, episode_count, self.videos)
    }
}

fn check_status(status: Option<&str>, url: &Url) -> Result<()> {
    match status {
        Some(SUCCESS_STATUS) => Ok(()),
        other => Err(Error::Envelope {
            url: url.to_string(),
            reason: format!("status is {:?} instead of \"{}\"", other, SUCCESS_STATUS),
        }),
    }
}

fn parse_search(envelope: SearchEnvelope, url: &Url) -> Result<Vec<Title>> {
    check_status(envelope.status.as_deref(), url)?;

    Ok(envelope
        .results
        .into_iter()
        .map(|record| record.into_title().0)
        .collect())
}

fn parse_details(envelope: DetailsEnvelope, url: &Url) -> Result<TitleDetails> {
    check_status(envelope.status.as_deref(), url)?;

    let record = envelope.title.ok_or_else(|| Error::Envelope {
        url: url.to_string(),
        reason: "missing title".to_owned(),
    })?;
    let (title, season_count, episode_count, nested_videos) = record.into_title();

    let mut seen_urls = HashSet::new();
    let mut seen_numbers = HashSet::new();
    let mut episodes = Vec::new();

    for (index, video) in envelope.videos.into_iter().chain(nested_videos).enumerate() {
        let Some(episode) = video_to_episode(video, index, &title.name) else {
            continue;
        };

        if !seen_urls.insert(episode.url.clone()) {
            continue;
        }

        // First occurrence wins: top-level videos before nested ones, then response order
        if let (Some(season), Some(number)) = (episode.season, episode.episode) {
            if !seen_numbers.insert((season, number)) {
                log::debug!("Dropping duplicate S{:02}E{:02}: {}", season, number, episode.url);
                continue;
            }
        }

        episodes.push(episode);
    }

    episodes.sort_by_key(Episode::sort_key);

    let episode_count = episode_count.or(Some(episodes.len() as u32));

    Ok(TitleDetails {
        title,
        episodes,
        season_count,
        episode_count,
    })
}

fn video_to_episode(video: VideoRecord, index: usize, title_name: &str) -> Option<Episode> {
    let url = video.src?.trim().to_owned();

    if !is_embed_url::<Uqload>(&url) {
        log::debug!("Skipping video not hosted on {}: {}", Uqload::DISPLAY_NAME, url);
        return None;
    }

    let name = video
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| title_name.to_owned());
    let numbers = parse_season_episode(&name);

    Some(Episode {
        id: video
            .id
            .map(LooseValue::into_string)
            .unwrap_or_else(|| index.to_string()),
        name,
        season: numbers.map(|(season, _)| season),
        episode: numbers.map(|(_, episode)| episode),
        url,
        language: video.language.filter(|language| !language.trim().is_empty()),
    })
}
