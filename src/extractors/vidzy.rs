use super::PlayerHost;

pub struct Vidzy;

impl PlayerHost for Vidzy {
    const DISPLAY_NAME: &'static str = "Vidzy";
    const NAMES: &'static [&'static str] = &["Vidzy"];
    const DOMAIN_TOKEN: &'static str = "vidzy";
    const ORIGIN: &'static str = "https://vidzy.org";
    const EMBED_PREFIX: &'static str = "/embed-";
    const EMBED_SUFFIX: &'static str = ".html";
}

#[cfg(test)]
mod tests {
    use super::Vidzy;
    use crate::extractors::normalize_embed_url;

    #[test]
    fn test_vidzy() {
        assert_eq!(
            normalize_embed_url::<Vidzy>("x1y2z3"),
            Some("https://vidzy.org/embed-x1y2z3.html".to_string())
        );
        assert_eq!(
            normalize_embed_url::<Vidzy>("https://vidzy.live/embed-x1y2z3.html"),
            Some("https://vidzy.org/embed-x1y2z3.html".to_string())
        );
    }
}
