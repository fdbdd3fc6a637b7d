//! Value formatting for feed elements.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::broadcast::BroadcastRecord;

/// Naive layouts accepted for broadcast times, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a broadcast time.
///
/// Accepts RFC 3339, RFC 2822, the naive layouts in [`NAIVE_FORMATS`] and a
/// bare date (midnight UTC). Offset-carrying inputs keep their offset.
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Format a broadcast time as RFC 2822, or `None` when it cannot be parsed.
pub fn format_rfc2822(value: &str) -> Option<String> {
    parse_datetime(value).map(|dt| dt.to_rfc2822())
}

/// Format a duration in milliseconds as `H:MM:SS` or `M:SS`.
///
/// Rounds to the nearest second. Zero, negative and non-finite durations
/// yield `None`.
pub fn format_duration(duration_ms: f64) -> Option<String> {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return None;
    }

    let total_secs = (duration_ms / 1000.0).round() as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        Some(format!("{hours}:{minutes:02}:{seconds:02}"))
    } else {
        Some(format!("{minutes}:{seconds:02}"))
    }
}

/// Guid of an item: the record id, else its urn, else a digest of the
/// rendered title and link.
pub fn item_guid(record: &BroadcastRecord, title: &str, link: &str) -> String {
    record.id().or_else(|| record.urn()).unwrap_or_else(|| {
        let hash = Sha256::digest(format!("{title}{link}").as_bytes());
        format!("{:x}", hash)
    })
}

/// Split text into CDATA section contents.
///
/// A literal `]]>` cannot appear inside one section, so the text is cut
/// between `]]` and `>` and continued in a new section.
pub fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}

/// Drop characters that XML 1.0 does not allow anywhere in a document.
///
/// Escaping cannot represent them, so control characters other than tab,
/// newline and carriage return are removed along with U+FFFE and U+FFFF.
pub fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
