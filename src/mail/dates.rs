use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Shown when a message has no Date header.
pub const UNKNOWN_DATE: &str = "(unknown date)";

/// Japan Standard Time; no daylight saving.
const DISPLAY_OFFSET_SECS: i32 = 9 * 3600;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Zone-less layouts, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
];

/// Formats a Date header as `YYYY-MM-DD HH:MM` in JST.
///
/// Unparseable input is logged and returned verbatim.
pub fn normalize(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return UNKNOWN_DATE.to_string();
    };

    let Some(parsed) = parse_date(raw.trim()) else {
        log::warn!("cannot parse date, showing it as-is: {raw:?}");
        return raw.to_string();
    };

    match FixedOffset::east_opt(DISPLAY_OFFSET_SECS) {
        Some(jst) => parsed.with_timezone(&jst).format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // drop a trailing "(UTC)"-style comment
    let stripped = match s.rfind('(') {
        Some(i) if s.ends_with(')') => s[..i].trim_end(),
        _ => s,
    };
    if stripped != s
        && let Ok(dt) = DateTime::parse_from_rfc2822(stripped)
    {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stripped, fmt).ok())
        .map(|naive| naive.and_utc())
}
