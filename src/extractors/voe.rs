use super::PlayerHost;

pub struct Voe;

impl PlayerHost for Voe {
    const DISPLAY_NAME: &'static str = "Voe";
    const NAMES: &'static [&'static str] = &["Voe"];
    const DOMAIN_TOKEN: &'static str = "voe";
    const ORIGIN: &'static str = "https://voe.sx";
    const EMBED_PREFIX: &'static str = "/e/";
}

#[cfg(test)]
mod tests {
    use super::Voe;
    use crate::extractors::normalize_embed_url;

    #[test]
    fn test_voe() {
        assert_eq!(
            normalize_embed_url::<Voe>("https://voe.sx/e/ytd65pzpecoo"),
            Some("https://voe.sx/e/ytd65pzpecoo".to_string())
        );
        assert_eq!(
            normalize_embed_url::<Voe>("https://voe.sx/e/ytd65pzpecoo?autoplay=1"),
            Some("https://voe.sx/e/ytd65pzpecoo".to_string())
        );
        assert_eq!(normalize_embed_url::<Voe>("https://voe.sx/ytd65pzpecoo"), None);
    }
}
