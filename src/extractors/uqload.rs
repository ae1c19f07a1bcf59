use super::PlayerHost;

pub struct Uqload;

impl PlayerHost for Uqload {
    const DISPLAY_NAME: &'static str = "Uqload";
    const NAMES: &'static [&'static str] = &["Uqload"];
    const DOMAIN_TOKEN: &'static str = "uqload";
    const ORIGIN: &'static str = "https://uqload.cx";
    const EMBED_PREFIX: &'static str = "/embed-";
    const EMBED_SUFFIX: &'static str = ".html";
}

#[cfg(test)]
mod tests {
    use super::Uqload;
    use crate::extractors::{is_embed_url, normalize_embed_url};

    #[test]
    fn test_uqload_bare_id() {
        let url = normalize_embed_url::<Uqload>("abc123").unwrap();
        assert_eq!(url, "https://uqload.cx/embed-abc123.html");

        let parsed = url::Url::parse(&url).unwrap();
        assert!(parsed.host_str().unwrap().contains("uqload"));
        assert!(parsed.path().contains("/embed-"));
        assert!(parsed.path().contains("abc123"));
    }

    #[test]
    fn test_uqload_shapes() {
        let expected = Some("https://uqload.cx/embed-abc123.html".to_string());

        assert_eq!(normalize_embed_url::<Uqload>("abc123"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("embed-abc123"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("embed-abc123.html"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("/embed-abc123.html"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("uqload.cx/embed-abc123.html"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("//uqload.io/embed-abc123.html"), expected);
        assert_eq!(normalize_embed_url::<Uqload>("https://www.uqload.co/embed-abc123.html"), expected);
        assert_eq!(normalize_embed_url::<Uqload>(" https://uqload.cx/embed-abc123.html "), expected);
    }

    #[test]
    fn test_uqload_rejects() {
        assert_eq!(normalize_embed_url::<Uqload>(""), None);
        assert_eq!(normalize_embed_url::<Uqload>("https://voe.sx/e/abc123"), None);
        assert_eq!(normalize_embed_url::<Uqload>("https://uqload.cx/abc123.html"), None);
        assert_eq!(normalize_embed_url::<Uqload>("not a url"), None);
    }

    #[test]
    fn test_uqload_is_embed_url() {
        assert!(is_embed_url::<Uqload>("https://uqload.cx/embed-abc123.html"));
        assert!(is_embed_url::<Uqload>("http://www.uqload.io/embed-abc123.html"));
        assert!(!is_embed_url::<Uqload>("https://uqload.cx/videos/embed-abc123.html"));
        assert!(!is_embed_url::<Uqload>("https://example.com/embed-abc123.html"));
        assert!(!is_embed_url::<Uqload>("embed-abc123.html"));
    }
}
