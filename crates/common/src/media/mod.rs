//! Presentation classification of attached post URLs
//!
//! Every URL string maps to exactly one of image, video, or link. The
//! function is pure: no network access, no dependence on state.

use serde::Serialize;
use url::{ParseError, Url};

/// Image file extensions rendered inline
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg"];

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// How an attached URL is presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaKind {
    Image { url: String },
    Video { url: String, video_id: String, embed_url: String },
    /// `navigable` is false for anything but a parsed http(s) URL; such
    /// links are shown as text only
    Link { url: String, navigable: bool },
}

impl MediaKind {
    /// The normalized URL of the attachment
    pub fn url(&self) -> &str {
        match self {
            MediaKind::Image { url } | MediaKind::Video { url, .. } | MediaKind::Link { url, .. } => url,
        }
    }
}

/// Classify an attached URL
pub fn classify(raw: &str) -> MediaKind {
    let (url, parsed) = normalize(raw.trim());

    let parsed = match parsed {
        Some(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
        _ => return MediaKind::Link { url, navigable: false },
    };

    if is_image_path(parsed.path()) {
        return MediaKind::Image { url };
    }

    let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
    if is_video_host(&host) {
        if let Some(video_id) = youtube_id(&host, &parsed) {
            let embed_url = format!("{}{}", YOUTUBE_EMBED_BASE, video_id);
            return MediaKind::Video { url, video_id, embed_url };
        }
    }

    MediaKind::Link { url, navigable: true }
}

/// Parse the URL, prefixing `https://` when it carries no scheme
fn normalize(raw: &str) -> (String, Option<Url>) {
    match Url::parse(raw) {
        Ok(parsed) => (raw.to_string(), Some(parsed)),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let url = format!("https://{}", raw);
            let parsed = Url::parse(&url).ok();
            (url, parsed)
        }
        Err(_) => (raw.to_string(), None),
    }
}

fn is_image_path(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or("");
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

fn is_video_host(host: &str) -> bool {
    host_matches(host, "youtube.com") || host_matches(host, "youtu.be")
}

fn youtube_id(host: &str, url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if host_matches(host, "youtu.be") {
        segments.next().map(str::to_string)
    } else {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed") | Some("shorts") | Some("live") => segments.next().map(str::to_string),
            _ => None,
        }
    };

    id.filter(|id| is_video_id(id))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(
            classify("https://example.com/photo.jpg"),
            MediaKind::Image { url: "https://example.com/photo.jpg".into() }
        );
        assert!(matches!(classify("https://i.redd.it/abc.PNG"), MediaKind::Image { .. }));
        assert!(matches!(classify("https://cdn.example.com/a/b.svg?w=200"), MediaKind::Image { .. }));
    }

    #[test]
    fn test_image_wins_over_video_host() {
        assert!(matches!(
            classify("https://youtube.com/thumb.jpg"),
            MediaKind::Image { .. }
        ));
    }

    #[test]
    fn test_short_link_video() {
        match classify("https://youtu.be/abc123") {
            MediaKind::Video { video_id, embed_url, .. } => {
                assert_eq!(video_id, "abc123");
                assert_eq!(embed_url, "https://www.youtube.com/embed/abc123");
            }
            other => panic!("expected video, got {:?}", other),
        }
    }

    #[test]
    fn test_short_link_without_id_falls_back_to_link() {
        assert_eq!(
            classify("https://youtu.be/"),
            MediaKind::Link { url: "https://youtu.be/".into(), navigable: true }
        );
    }

    #[test]
    fn test_watch_url_video() {
        match classify("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ") {
            MediaKind::Video { video_id, .. } => assert_eq!(video_id, "dQw4w9WgXcQ"),
            other => panic!("expected video, got {:?}", other),
        }
        assert!(matches!(classify("https://m.youtube.com/shorts/xyz_9"), MediaKind::Video { .. }));
    }

    #[test]
    fn test_watch_without_v_falls_back_to_link() {
        assert!(matches!(classify("https://www.youtube.com/watch?list=PL1"), MediaKind::Link { .. }));
        assert!(matches!(classify("https://www.youtube.com/channel/UC1"), MediaKind::Link { .. }));
    }

    #[test]
    fn test_lookalike_host_is_not_video() {
        assert!(matches!(classify("https://notyoutube.com/watch?v=abc"), MediaKind::Link { .. }));
    }

    #[test]
    fn test_missing_scheme_is_normalized() {
        assert_eq!(
            classify("youtu.be/abc123").url(),
            "https://youtu.be/abc123"
        );
        assert!(matches!(classify("example.com/a.gif"), MediaKind::Image { .. }));
    }

    #[test]
    fn test_generic_and_unparsable_urls_are_links() {
        assert!(matches!(classify("https://www.nytimes.com/2024/11/05/us/politics.html"), MediaKind::Link { .. }));
        assert!(matches!(classify("http://[bad"), MediaKind::Link { .. }));
        assert!(matches!(classify(""), MediaKind::Link { .. }));
        assert!(matches!(classify("https://example.com/.png"), MediaKind::Link { .. }));
    }

    #[test]
    fn test_scheme_detection_ignores_urls_in_query() {
        assert_eq!(
            classify("i.imgur.com/photo.jpg?src=https://example.com"),
            MediaKind::Image { url: "https://i.imgur.com/photo.jpg?src=https://example.com".into() }
        );
    }

    #[test]
    fn test_non_web_schemes_are_not_navigable() {
        for raw in [
            "javascript://%0Aalert(document.cookie)",
            "javascript:alert(1)",
            "data:image/png;base64,AAAA",
            "ftp://example.com/photo.jpg",
            "http://[bad",
        ] {
            match classify(raw) {
                MediaKind::Link { navigable, .. } => assert!(!navigable, "{} is navigable", raw),
                other => panic!("expected link for {}, got {:?}", raw, other),
            }
        }
        assert!(matches!(
            classify("https://www.nytimes.com/a.html"),
            MediaKind::Link { navigable: true, .. }
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        for url in ["https://example.com/photo.jpg", "https://youtu.be/abc123", "https://youtu.be/", "x"] {
            assert_eq!(classify(url), classify(url));
        }
    }
}
