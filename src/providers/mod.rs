use std::fmt::Display;

use enum_dispatch::enum_dispatch;
use enum_iterator::Sequence;
use serde::Serialize;
use url::Url;

use self::catalog::Catalog;
use self::frenchstream::FrenchStream;
use crate::error::Result;

pub mod catalog;
pub mod frenchstream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
}

impl Display for TitleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TitleKind::Movie => write!(f, "movie"),
            TitleKind::Series => write!(f, "series"),
        }
    }
}

/// A catalog entry. The id is provider specific and only meant to be handed
/// back to the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub id: String,
    pub name: String,
    pub year: Option<u32>,
    #[serde(rename = "type")]
    pub kind: TitleKind,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub url: String,
    pub language: Option<String>,
}

impl Episode {
    /// Sort key with unknown numbers treated as 0.
    pub fn sort_key(&self) -> (u32, u32) {
        (self.season.unwrap_or(0), self.episode.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleDetails {
    #[serde(flatten)]
    pub title: Title,
    pub episodes: Vec<Episode>,
    pub season_count: Option<u32>,
    pub episode_count: Option<u32>,
}

#[allow(async_fn_in_trait)]
#[enum_dispatch]
pub trait Provider {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Title>>;

    async fn get_details(&self, title_id: &str) -> Result<TitleDetails>;

    async fn get_episodes(&self, title_id: &str) -> Result<Vec<Episode>> {
        Ok(self.get_details(title_id).await?.episodes)
    }
}

#[enum_dispatch(Provider)]
pub enum DispatchProvider {
    Catalog,
    FrenchStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum ProviderKind {
    Catalog,
    FrenchStream,
}

impl ProviderKind {
    pub const DEFAULT: ProviderKind = ProviderKind::Catalog;

    pub fn names(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Catalog => &["catalog"],
            ProviderKind::FrenchStream => &["frenchstream", "fs"],
        }
    }

    pub fn from_name(name: &str) -> Option<ProviderKind> {
        let name = name.trim();
        enum_iterator::all::<ProviderKind>()
            .find(|kind| kind.names().iter().any(|known| name.eq_ignore_ascii_case(known)))
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub catalog_origin: Url,
    pub site_origin: Url,
}

impl ProviderConfig {
    pub const CATALOG_ORIGIN_VAR: &'static str = "STREAMDL_CATALOG_ORIGIN";
    pub const SITE_ORIGIN_VAR: &'static str = "STREAMDL_SITE_ORIGIN";

    pub fn new(catalog_origin: Option<&str>, site_origin: Option<&str>) -> Result<Self> {
        Ok(ProviderConfig {
            catalog_origin: Url::parse(catalog_origin.unwrap_or(catalog::DEFAULT_ORIGIN))?,
            site_origin: Url::parse(site_origin.unwrap_or(frenchstream::DEFAULT_ORIGIN))?,
        })
    }
}

/// Holds one instance of every provider for the lifetime of a command.
pub struct ProviderRegistry {
    catalog: DispatchProvider,
    frenchstream: DispatchProvider,
}

impl ProviderRegistry {
    pub fn new(config: &ProviderConfig) -> Self {
        ProviderRegistry {
            catalog: Catalog::new(config.catalog_origin.clone()).into(),
            frenchstream: FrenchStream::new(config.site_origin.clone()).into(),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> &DispatchProvider {
        match kind {
            ProviderKind::Catalog => &self.catalog,
            ProviderKind::FrenchStream => &self.frenchstream,
        }
    }

    /// Looks a provider up by name, falling back to the default one.
    pub fn find(&self, name: Option<&str>) -> &DispatchProvider {
        let kind = match name {
            None => ProviderKind::DEFAULT,
            Some(name) => ProviderKind::from_name(name).unwrap_or_else(|| {
                let known = enum_iterator::all::<ProviderKind>()
                    .flat_map(|kind| kind.names().iter().copied())
                    .collect::<Vec<_>>()
                    .join(", ");
                log::warn!(
                    "Unknown provider \"{}\" (known: {}), using {}",
                    name,
                    known,
                    ProviderKind::DEFAULT.names()[0]
                );
                ProviderKind::DEFAULT
            }),
        };

        self.get(kind)
    }
}
