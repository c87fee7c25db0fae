//! Video ID extraction from user-supplied URLs.

use regex::Regex;
use std::sync::OnceLock;

/// Marker that precedes the video ID in a standard watch URL.
const WATCH_MARKER: &str = "watch?v=";

const MAX_VIDEO_ID_LEN: usize = 64;

fn alt_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtu\.be/|youtube\.com/(?:embed|v|shorts)/)
            ([a-zA-Z0-9_-]{11})
            (?:[?&\#/]|$)
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("static regex is valid")
    })
}

/// Extract a video ID from a watch URL, short URL, or bare ID.
///
/// For watch URLs the ID is whatever follows the last `watch?v=` marker,
/// up to the next `&` or `#`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some((_, rest)) = input.rsplit_once(WATCH_MARKER) {
        let id = rest.split(['&', '#']).next().unwrap_or(rest);
        return is_valid_video_id(id).then(|| id.to_string());
    }

    let caps = alt_url_regex().captures(input)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// IDs are used in API calls and file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_marker() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("  youtube.com/watch?v=abc-_123XYZ#comments "),
            Some("abc-_123XYZ".to_string())
        );
    }

    #[test]
    fn test_last_marker_wins() {
        assert_eq!(
            extract_video_id("https://example.com/watch?v=first/watch?v=secondIdxx"),
            Some("secondIdxx".to_string())
        );
    }

    #[test]
    fn test_alternate_formats() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("m.youtube.com/embed/dQw4w9WgXcQ/"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_alternate_formats_need_youtube_host_and_exact_id() {
        assert_eq!(extract_video_id("https://evil.example/youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("notyoutube.com/embed/dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("youtu.be/dQw4w9WgXcQXYZ"), None);
        assert_eq!(extract_video_id("dQw4w9WgXcQX"), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("not a video"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=../../etc"), None);
    }
}
