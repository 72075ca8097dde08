use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::cut::{Cut, CutRecord};
use crate::error::FormatError;

/// Range patterns recognized in free text, in priority order:
/// H:MM:SS-H:MM:SS and MM:SS-MM:SS, each with or without whitespace
/// around the separator. Hyphen, en dash and em dash all separate.
const TIMECODE_PATTERNS: [&str; 4] = [
    r"(\d{1,2}:\d{2}:\d{2})[-–—](\d{1,2}:\d{2}:\d{2})",
    r"(\d{1,2}:\d{2})[-–—](\d{1,2}:\d{2})",
    r"(\d{1,2}:\d{2}:\d{2})\s*[-–—]\s*(\d{1,2}:\d{2}:\d{2})",
    r"(\d{1,2}:\d{2})\s*[-–—]\s*(\d{1,2}:\d{2})",
];

fn timecode_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TIMECODE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("timecode pattern compiles"))
            .collect()
    })
}

/// Load cuts from a structured JSON document.
///
/// The document must decode to a non-empty array, and the first element
/// must carry both `start` and `end` keys. Only the first element's
/// shape is checked; later elements are deserialized loosely and may
/// still be missing fields (surfaced by `validate_cuts`).
pub fn load_cuts_from_json(content: &str) -> Result<Vec<CutRecord>, FormatError> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(FormatError::NotACutList),
    };

    let first = &items[0];
    if first.get("start").is_none() || first.get("end").is_none() {
        return Err(FormatError::MissingFields);
    }

    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(FormatError::from))
        .collect()
}

/// Extract cut ranges from free text.
///
/// Every pattern is applied independently, so the same span can match
/// more than once; duplicates collapse to the first occurrence. Ranges
/// where the end does not come after the start are discarded. The
/// result is sorted by start (stable).
pub fn parse_timecodes_from_text(text: &str) -> Vec<Cut> {
    let mut cuts = Vec::new();

    for pattern in timecode_patterns() {
        for caps in pattern.captures_iter(text) {
            let (Ok(start), Ok(end)) = (
                timecode_to_seconds(&caps[1]),
                timecode_to_seconds(&caps[2]),
            ) else {
                continue;
            };
            if start < end {
                cuts.push(Cut::new(start, end));
            }
        }
    }

    let mut seen = HashSet::new();
    cuts.retain(|cut| seen.insert((cut.start.to_bits(), cut.end.to_bits())));
    cuts.sort_by(|a, b| a.start.total_cmp(&b.start));

    cuts
}

/// Convert an `H:MM:SS` or `MM:SS` string to seconds.
pub fn timecode_to_seconds(timecode: &str) -> Result<f64, FormatError> {
    let parts: Vec<&str> = timecode.split(':').collect();

    let invalid = || FormatError::InvalidTimecode(timecode.to_string());
    let field = |s: &str| s.parse::<u32>().map_err(|_| invalid());

    match *parts.as_slice() {
        [hours, minutes, seconds] => {
            let (h, m, s) = (field(hours)?, field(minutes)?, field(seconds)?);
            Ok(f64::from(h * 3600 + m * 60 + s))
        }
        [minutes, seconds] => {
            let (m, s) = (field(minutes)?, field(seconds)?);
            Ok(f64::from(m * 60 + s))
        }
        _ => Err(invalid()),
    }
}

/// Convert seconds to an `MM:SS` display string, truncating toward
/// zero. The minute field is not folded into hours, so values past an
/// hour display as e.g. `61:40`.
pub fn seconds_to_display_timecode(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as i64;
    let secs = (seconds % 60.0) as i64;
    format!("{:02}:{:02}", minutes, secs)
}

/// Check a cut list and return human-readable warnings. Warnings are
/// informational; this never fails and callers decide whether to gate
/// generation on them.
///
/// Overlaps are detected between adjacent pairs after sorting by start,
/// so overlaps spanning more than two cuts may go unreported. Records
/// missing a field are excluded from the overlap scan.
pub fn validate_cuts(cuts: &[CutRecord]) -> Vec<String> {
    let mut warnings = Vec::new();

    if cuts.is_empty() {
        warnings.push("No cuts found".to_string());
        return warnings;
    }

    for (i, record) in cuts.iter().enumerate() {
        let n = i + 1;
        let Some(cut) = record.as_cut() else {
            warnings.push(format!("Cut {}: Missing 'start' or 'end' field", n));
            continue;
        };

        let duration = cut.duration();
        if duration <= 0.0 {
            warnings.push(format!("Cut {}: Invalid duration ({:.1}s)", n, duration));
        }
        if duration > 0.0 && duration < 0.5 {
            warnings.push(format!("Cut {}: Very short duration ({:.1}s)", n, duration));
        }
    }

    let mut sorted: Vec<Cut> = cuts.iter().filter_map(CutRecord::as_cut).collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
    for pair in sorted.windows(2) {
        if pair[0].end > pair[1].start {
            warnings.push(format!(
                "Cuts overlap: {:.1}s > {:.1}s",
                pair[0].end, pair[1].start
            ));
        }
    }

    warnings
}
