/// In-page duration probe
///
/// The probe reaches a page two ways: injected on demand by the sorter
/// (`chrome.scripting.executeScript`), or auto-run by the content script
/// when a watch page loads. Both go through [`probe_duration`]; only the
/// embedded-payload strategy reads a different source per path.
mod dom;

pub use dom::DomPage;

use crate::duration::{find_length_seconds, parse_clock, parse_iso_duration, parse_length_seconds};
use crate::tab_data::UNKNOWN_DURATION;

/// How the probe was delivered into the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePath {
    /// Injected by the sorter; scans `<script>` payloads
    Injected,
    /// Auto-run content script; reads the page's player-response global
    AutoRun,
}

/// Read-only view of the page state the probe looks at.
/// Every read is infallible: a failed DOM read is simply `None`/empty.
pub trait PageSource {
    /// `duration` of the first media element, if one exists
    fn media_duration(&self) -> Option<f64>;

    /// Text of the player's on-screen duration label
    fn duration_label(&self) -> Option<String>;

    /// `content` of the duration meta tag
    fn duration_meta(&self) -> Option<String>;

    /// Text of every inline script, in document order
    fn script_payloads(&self) -> Vec<String>;

    /// `videoDetails.lengthSeconds` off the player-response global
    fn player_length_seconds(&self) -> Option<String>;
}

/// Which strategy produced a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    MediaElement,
    TimeLabel,
    MetaTag,
    PlayerPayload,
}

/// Run the strategies in priority order; first hit wins.
pub fn resolve_duration<P: PageSource + ?Sized>(
    page: &P,
    path: ProbePath,
) -> Option<(f64, DurationSource)> {
    if let Some(seconds) = page
        .media_duration()
        .filter(|d| d.is_finite() && *d > 0.0)
    {
        return Some((seconds, DurationSource::MediaElement));
    }

    if let Some(seconds) = page
        .duration_label()
        .and_then(|text| parse_clock(&text))
        .filter(|s| *s > 0)
    {
        return Some((seconds as f64, DurationSource::TimeLabel));
    }

    if let Some(seconds) = page
        .duration_meta()
        .and_then(|text| parse_iso_duration(&text))
        .filter(|s| *s > 0)
    {
        return Some((seconds as f64, DurationSource::MetaTag));
    }

    let payload = match path {
        ProbePath::Injected => page
            .script_payloads()
            .iter()
            .find_map(|script| find_length_seconds(script)),
        ProbePath::AutoRun => page
            .player_length_seconds()
            .and_then(|value| parse_length_seconds(&value)),
    };

    payload.map(|seconds| (seconds as f64, DurationSource::PlayerPayload))
}

/// Duration in seconds, or `-1` when no strategy succeeds
pub fn probe_duration<P: PageSource + ?Sized>(page: &P, path: ProbePath) -> f64 {
    match resolve_duration(page, path) {
        Some((seconds, source)) => {
            log::debug!("Duration {}s from {:?} ({:?})", seconds, source, path);
            seconds
        }
        None => UNKNOWN_DURATION,
    }
}
