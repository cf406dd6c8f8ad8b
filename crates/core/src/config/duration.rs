//! Staleness windows written as `<count><unit>`.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;

fn window_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*([smhdwy])$").expect("static regex"))
}

/// Parse a window such as `30s`, `15m`, `1d` or `9001y`.
///
/// `*` means the entry never goes stale. Returns `None` for anything else.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input == "*" {
        return Some(Duration::MAX);
    }

    let caps = window_regex().captures(input)?;
    let count: u64 = caps[1].parse().ok()?;
    let unit = match &caps[2] {
        "s" => 1,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => WEEK,
        "y" => YEAR,
        _ => return None,
    };

    Some(Duration::from_secs(count.saturating_mul(unit)))
}
