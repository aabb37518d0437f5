/// Parsers for the duration formats found on watch pages
use regex::Regex;
use std::sync::OnceLock;

fn iso_duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("valid ISO duration pattern")
    })
}

fn length_seconds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""lengthSeconds"\s*:\s*"?(\d+)"?"#).expect("valid lengthSeconds pattern")
    })
}

/// Parse a player clock label like "1:23:45" or "12:34" into seconds
///
/// Accepts `H:MM:SS` or `M:SS`. Every part must be digits only (surrounding
/// whitespace is ignored); any other shape is rejected.
pub fn parse_clock(text: &str) -> Option<u64> {
    let parts = text
        .trim()
        .split(':')
        .map(parse_digits)
        .collect::<Option<Vec<u64>>>()?;

    match parts.as_slice() {
        [hours, minutes, seconds] => total_seconds(*hours, *minutes, *seconds),
        [minutes, seconds] => total_seconds(0, *minutes, *seconds),
        _ => None,
    }
}

/// Parse an ISO 8601 duration of the form `PT[nH][nM][nS]` into seconds
pub fn parse_iso_duration(text: &str) -> Option<u64> {
    let caps = iso_duration_regex().captures(text.trim())?;

    let component = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    total_seconds(component(1)?, component(2)?, component(3)?)
}

/// `None` when the page hands us a value too large to add up
fn total_seconds(hours: u64, minutes: u64, seconds: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Find the first `"lengthSeconds"` field in an embedded player payload
pub fn find_length_seconds(script: &str) -> Option<u64> {
    if !script.contains("lengthSeconds") {
        return None;
    }

    length_seconds_regex()
        .captures_iter(script)
        .find_map(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Parse a `lengthSeconds` value read straight off a page object
pub fn parse_length_seconds(value: &str) -> Option<u64> {
    parse_digits(value)
}

fn parse_digits(part: &str) -> Option<u64> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
