use super::PlayerHost;

pub struct Netu;

impl PlayerHost for Netu {
    const DISPLAY_NAME: &'static str = "Netu";
    const NAMES: &'static [&'static str] = &["Netu", "Hqq"];
    const DOMAIN_TOKEN: &'static str = "netu";
    const ORIGIN: &'static str = "https://netu.tv";
    const EMBED_PREFIX: &'static str = "/e/";
}

#[cfg(test)]
mod tests {
    use super::Netu;
    use crate::extractors::{normalize_embed_url, select_player_url, PlayerLinks};

    #[test]
    fn test_netu() {
        assert_eq!(
            normalize_embed_url::<Netu>("e/Rk9PQkFS/"),
            Some("https://netu.tv/e/Rk9PQkFS".to_string())
        );

        let links: PlayerLinks = [("hqq", "Rk9PQkFS")].into_iter().collect();
        assert_eq!(
            select_player_url(&links).map(|player| player.url),
            Some("https://netu.tv/e/Rk9PQkFS".to_string())
        );
    }
}
