use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use tracing::warn;

const TTL_PATTERN: &str = r"^(\d+)([dhm])$";

static TTL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(TTL_PATTERN).ok());

pub fn default_ttl() -> Duration {
    Duration::days(7)
}

/// Parses `<n>d`, `<n>h` or `<n>m`. Anything else, including zero and
/// values too large to represent, yields seven days.
pub fn parse_ttl(raw: &str) -> Duration {
    match try_parse_ttl(raw) {
        Some(ttl) => ttl,
        None => {
            warn!(value = raw, "unparsable token ttl, falling back to 7d");
            default_ttl()
        }
    }
}

fn try_parse_ttl(raw: &str) -> Option<Duration> {
    let captures = TTL_RE.as_ref()?.captures(raw)?;
    let amount: i64 = captures.get(1)?.as_str().parse().ok()?;
    if amount == 0 {
        return None;
    }

    match captures.get(2)?.as_str() {
        "d" => Duration::try_days(amount),
        "h" => Duration::try_hours(amount),
        "m" => Duration::try_minutes(amount),
        _ => None,
    }
}
