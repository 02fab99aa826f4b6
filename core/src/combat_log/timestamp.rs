use chrono::NaiveDateTime;
use memchr::memchr;

const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Byte offset of the closing bracket in `[Mon Oct 16 12:34:56 2023]`.
const CLOSE_BRACKET: usize = 25;

/// Split `[Mon Oct 16 12:34:56 2023] text` into its timestamp and text.
/// Returns `None` when the prefix is missing or unparsable.
pub fn parse_timestamp(line: &str) -> Option<(NaiveDateTime, &str)> {
    let b = line.as_bytes();
    if b.first() != Some(&b'[') {
        return None;
    }
    let close = memchr(b']', b)?;
    if close != CLOSE_BRACKET {
        return None;
    }

    let ts = NaiveDateTime::parse_from_str(&line[1..close], TIMESTAMP_FORMAT).ok()?;
    let rest = &line[close + 1..];
    let text = rest.strip_prefix(' ').unwrap_or(rest);
    Some((ts, text.trim_end_matches(['\r', '\n'])))
}
