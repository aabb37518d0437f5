/// Watch-page URL classification for YT Tab Sorter
use crate::config::SorterConfig;
use url::Url;

/// Check whether a tab URL points at a video watch page
///
/// A URL qualifies when:
/// 1. It is present and parses as an absolute URL
/// 2. Its host is one of the configured watch hosts
///    (by default `youtube.com` and `www.youtube.com`)
/// 3. Its path is exactly the watch path (`/watch`)
/// 4. It carries a non-empty video id parameter (`v`)
///
/// Anything else, including garbage that doesn't parse, is not a watch page.
///
/// Examples:
/// - https://www.youtube.com/watch?v=abc123 → true
/// - https://youtube.com/watch?v=abc123 → true
/// - https://www.youtube.com/watch → false
/// - https://www.youtube.com/feed/subscriptions → false
pub fn is_watch_url(url: Option<&str>, config: &SorterConfig) -> bool {
    video_id(url, config).is_some()
}

/// Extract the video id from a watch-page URL
pub fn video_id(url: Option<&str>, config: &SorterConfig) -> Option<String> {
    let parsed = Url::parse(url?.trim()).ok()?;

    let host = parsed.host_str()?;
    if !config.watch_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return None;
    }

    if parsed.path() != config.watch_path {
        return None;
    }

    parsed
        .query_pairs()
        .find(|(key, value)| key == config.video_param.as_str() && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
