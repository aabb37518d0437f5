/// Data structures for YT Tab Sorter
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Information about a browser tab, as returned by `chrome.tabs.query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
    pub index: i32,
}

impl TabInfo {
    pub fn new(id: i32, url: Option<String>, index: i32) -> TabInfo {
        TabInfo { id, url, index }
    }
}

/// A tab object as the host hands it over. `id` is optional on
/// `chrome.tabs.Tab` (devtools windows, for one), and such tabs can't be moved.
#[derive(Debug, Clone, Deserialize)]
pub struct HostTab {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    pub index: i32,
}

/// Keep the tabs the sorter can address, in window order
pub fn addressable_tabs(raw: Vec<HostTab>) -> Vec<TabInfo> {
    raw.into_iter()
        .filter_map(|tab| match tab.id {
            Some(id) => Some(TabInfo::new(id, tab.url, tab.index)),
            None => {
                log::debug!("Skipping tab at index {} without an id", tab.index);
                None
            }
        })
        .collect()
}

/// Wire value the probe returns when no strategy finds a duration
pub const UNKNOWN_DURATION: f64 = -1.0;

/// Length of a video in seconds, or unknown
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoDuration {
    Known(f64),
    Unknown,
}

impl VideoDuration {
    /// Interpret a raw probe value. Anything that isn't a finite,
    /// non-negative number is unknown (this includes the `-1` sentinel).
    pub fn from_seconds(seconds: f64) -> VideoDuration {
        if seconds.is_finite() && seconds >= 0.0 {
            VideoDuration::Known(seconds)
        } else {
            VideoDuration::Unknown
        }
    }

    pub fn as_seconds(&self) -> f64 {
        match self {
            VideoDuration::Known(seconds) => *seconds,
            VideoDuration::Unknown => UNKNOWN_DURATION,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, VideoDuration::Known(_))
    }

    /// Sort order: known durations ascending, unknown after every known.
    pub fn sort_cmp(&self, other: &VideoDuration) -> Ordering {
        match (self, other) {
            (VideoDuration::Known(a), VideoDuration::Known(b)) => a.total_cmp(b),
            (VideoDuration::Known(_), VideoDuration::Unknown) => Ordering::Less,
            (VideoDuration::Unknown, VideoDuration::Known(_)) => Ordering::Greater,
            (VideoDuration::Unknown, VideoDuration::Unknown) => Ordering::Equal,
        }
    }
}

/// A target tab paired with its resolved duration
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub tab: TabInfo,
    pub duration: VideoDuration,
}

/// A single `chrome.tabs.move` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabMove {
    pub tab_id: i32,
    pub index: i32,
}
