use std::collections::HashMap;

use url::Url;

use crate::extractors::netu::Netu;
use crate::extractors::uqload::Uqload;
use crate::extractors::vidzy::Vidzy;
use crate::extractors::voe::Voe;

pub mod netu;
pub mod uqload;
pub mod vidzy;
pub mod voe;

macro_rules! select_player_url {
    ($links:expr, $host:ty $(, $tail:ty)* $(,)?) => {
        match $links.get_any(<$host>::NAMES).and_then(normalize_embed_url::<$host>) {
            Some(url) => Some(SelectedPlayer { name: <$host>::DISPLAY_NAME, url }),
            None => select_player_url!($links, $($tail),*),
        }
    };
    ($links:expr $(,)?) => {
        None
    };
}

macro_rules! create_functions_for_players {
    ($( $host:ty ),* $(,)?) => {
        /// Player backends, most preferred first.
        pub const PLAYER_PRIORITY: &[&str] = &[$(<$host>::DISPLAY_NAME),*];

        /// Picks the first backend in priority order that has a usable url.
        pub fn select_player_url(links: &PlayerLinks) -> Option<SelectedPlayer> {
            select_player_url!(links, $($host),*)
        }
    };
    () => {};
}

create_functions_for_players! {
    Uqload,
    Vidzy,
    Netu,
    Voe,
}

/// A hosting service serving embeddable player pages.
pub trait PlayerHost {
    const DISPLAY_NAME: &'static str;
    const NAMES: &'static [&'static str];
    /// Substring every accepted host name contains.
    const DOMAIN_TOKEN: &'static str;
    const ORIGIN: &'static str;
    /// Path prefix of an embed page, e.g. `/embed-`.
    const EMBED_PREFIX: &'static str;
    const EMBED_SUFFIX: &'static str = "";

    fn canonical_url(id: &str) -> String {
        format!("{}{}{}{}", Self::ORIGIN, Self::EMBED_PREFIX, id, Self::EMBED_SUFFIX)
    }

    fn id_from_path(path: &str) -> Option<&str> {
        let (_, rest) = path.split_once(Self::EMBED_PREFIX)?;
        let rest = rest.trim_end_matches('/');
        let id = rest.strip_suffix(Self::EMBED_SUFFIX).unwrap_or(rest);

        if is_bare_id(id) {
            Some(id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPlayer {
    pub name: &'static str,
    pub url: String,
}

/// Backend name to raw player link, as delivered by an episode-data endpoint.
///
/// Only string values survive deserialization; `null`, numbers and nested
/// values are dropped at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(from = "HashMap<String, serde_json::Value>")]
pub struct PlayerLinks(HashMap<String, String>);

impl PlayerLinks {
    /// The link under the first of `names` present, compared case-insensitively.
    fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }
}

impl From<HashMap<String, serde_json::Value>> for PlayerLinks {
    fn from(value: HashMap<String, serde_json::Value>) -> Self {
        PlayerLinks(
            value
                .into_iter()
                .filter_map(|(key, value)| match value {
                    serde_json::Value::String(link) if !link.trim().is_empty() => Some((key, link)),
                    _ => None,
                })
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlayerLinks {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        PlayerLinks(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// Whether `url` is an embed page of `H`: host contains the domain token and
/// the path starts with the embed prefix.
pub fn is_embed_url<H: PlayerHost>(url: &str) -> bool {
    Url::parse(url)
        .map(|url| {
            let is_http = url.scheme() == "https" || url.scheme() == "http";
            let is_host = url
                .host_str()
                .map(|host| host.to_ascii_lowercase().contains(H::DOMAIN_TOKEN))
                .unwrap_or(false);

            is_http && is_host && url.path().starts_with(H::EMBED_PREFIX)
        })
        .unwrap_or(false)
}

/// Turns a bare id, an embed path fragment or a full url into the canonical
/// embed url of `H`.
pub fn normalize_embed_url<H: PlayerHost>(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let candidate = if raw.is_empty() {
        return None;
    } else if is_bare_id(raw) && !starts_with_embed_fragment::<H>(raw) {
        H::canonical_url(raw)
    } else if raw.starts_with("https://") || raw.starts_with("http://") {
        raw.to_owned()
    } else if let Some(no_scheme) = raw.strip_prefix("//") {
        format!("https://{no_scheme}")
    } else {
        let first_segment = raw.split('/').next().unwrap_or_default();

        if first_segment.contains('.') && first_segment.to_ascii_lowercase().contains(H::DOMAIN_TOKEN) {
            format!("https://{raw}")
        } else {
            format!("{}/{}", H::ORIGIN, raw.trim_start_matches('/'))
        }
    };

    let url = Url::parse(&candidate).ok()?;
    let is_host = url
        .host_str()
        .map(|host| host.to_ascii_lowercase().contains(H::DOMAIN_TOKEN))
        .unwrap_or(false);

    if !is_host || !url.path().contains(H::EMBED_PREFIX) {
        return None;
    }

    match H::id_from_path(url.path()) {
        Some(id) => Some(H::canonical_url(id)),
        None => Some(url.to_string()),
    }
}

fn starts_with_embed_fragment<H: PlayerHost>(input: &str) -> bool {
    input.starts_with(H::EMBED_PREFIX.trim_start_matches('/'))
}

fn is_bare_id(input: &str) -> bool {
    !input.is_empty()
        && input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::{select_player_url, PlayerLinks, PLAYER_PRIORITY};

    #[test]
    fn test_priority_order() {
        assert_eq!(PLAYER_PRIORITY, &["Uqload", "Vidzy", "Netu", "Voe"]);
    }

    #[test]
    fn test_select_prefers_uqload() {
        let links: PlayerLinks = [
            ("voe", "https://voe.sx/e/voeid"),
            ("uqload", "https://uqload.cx/embed-uqid.html"),
            ("vidzy", "vidzyid"),
        ]
        .into_iter()
        .collect();

        let selected = select_player_url(&links).unwrap();
        assert_eq!(selected.name, "Uqload");
        assert_eq!(selected.url, "https://uqload.cx/embed-uqid.html");
    }

    #[test]
    fn test_select_falls_back_when_preferred_is_unusable() {
        let links: PlayerLinks = [
            ("uqload", "https://example.com/not-a-player"),
            ("netu", "https://netu.tv/e/netuid"),
            ("voe", "https://voe.sx/e/voeid"),
        ]
        .into_iter()
        .collect();

        let selected = select_player_url(&links).unwrap();
        assert_eq!(selected.name, "Netu");
        assert_eq!(selected.url, "https://netu.tv/e/netuid");
    }

    #[test]
    fn test_select_nothing_usable() {
        let links: PlayerLinks = [("uqload", "  "), ("other", "https://uqload.cx/embed-x.html")]
            .into_iter()
            .collect();

        assert_eq!(select_player_url(&links), None);
    }

    #[test]
    fn test_select_alias_order_is_stable() {
        for _ in 0..16 {
            let links: PlayerLinks = [("hqq", "https://netu.tv/e/hqqid"), ("NETU", "https://netu.tv/e/netuid")]
                .into_iter()
                .collect();

            let selected = select_player_url(&links).unwrap();
            assert_eq!(selected.name, "Netu");
            assert_eq!(selected.url, "https://netu.tv/e/netuid");
        }
    }

    #[test]
    fn test_player_links_drop_non_strings() {
        let links: PlayerLinks =
            serde_json::from_str(r#"{"uqload": null, "vidzy": 42, "voe": "voeid", "netu": ""}"#).unwrap();

        assert_eq!(links, [("voe", "voeid")].into_iter().collect());
    }
}
